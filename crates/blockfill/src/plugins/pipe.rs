//! The pipe plugin: `<key|filter|filter>` threads a looked-up value through
//! named filters.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::{json, Value};

use blockfill_parser::Block;

use crate::plugin::Plugin;
use crate::registry::{read_guard, write_guard};
use crate::value::{format_value, lookup};

const NAME: &str = "pipe";
const FILTERS_ATTR: &str = "pipe.filters";

/// A named filter: a pure function from one value to the next.
pub type FilterFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Splits a block's raw text on `|`; the first segment becomes the lookup
/// key and the rest name filters applied left to right.
///
/// Filters are registered on the plugin instance. `upper`, `lower`, and
/// `trim` ship by default; [`add_filter`](Self::add_filter) and
/// [`with_filter`](Self::with_filter) extend the table. A filter name with
/// no registration is skipped with a logged warning.
///
/// At render time the chain starts from the previous plugin's accumulator
/// when one exists, falling back to a plain lookup of the rewritten key.
pub struct PipePlugin {
    filters: RwLock<HashMap<String, FilterFn>>,
}

impl PipePlugin {
    /// A pipe plugin with the default filter table.
    pub fn new() -> Self {
        let plugin = Self {
            filters: RwLock::new(HashMap::new()),
        };
        plugin.add_filter("upper", |v| json!(format_value(v).to_uppercase()));
        plugin.add_filter("lower", |v| json!(format_value(v).to_lowercase()));
        plugin.add_filter("trim", |v| json!(format_value(v).trim()));
        plugin
    }

    /// Registers a filter, replacing any existing one with the same name.
    pub fn add_filter(
        &self,
        name: impl Into<String>,
        filter: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) {
        write_guard(&self.filters).insert(name.into(), Arc::new(filter));
    }

    /// Builder form of [`add_filter`](Self::add_filter).
    pub fn with_filter(
        self,
        name: impl Into<String>,
        filter: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.add_filter(name, filter);
        self
    }
}

impl Default for PipePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PipePlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn transform_block(&self, block: &mut Block) {
        let mut segments = block.raw().split('|').map(str::trim);
        let key = segments.next().unwrap_or_default().to_string();
        let filters: Vec<String> = segments.map(str::to_string).collect();

        block.name = key;
        if !filters.is_empty() {
            block.set_attr(FILTERS_ATTR, json!(filters));
            block.hits.push(NAME.to_string());
        }
    }

    fn value(&self, values: &Value, block: &Block, prev: Option<Value>) -> Option<Value> {
        let mut acc = prev.or_else(|| lookup(values, &block.name).cloned());

        let Some(filter_names) = block.attr(FILTERS_ATTR).and_then(Value::as_array) else {
            return acc;
        };
        let filters = read_guard(&self.filters);
        for name in filter_names.iter().filter_map(Value::as_str) {
            match filters.get(name) {
                Some(filter) => {
                    if let Some(value) = acc {
                        acc = Some(filter(&value));
                    }
                }
                None => log::warn!("pipe filter {:?} is not registered; skipping", name),
            }
        }
        acc
    }
}
