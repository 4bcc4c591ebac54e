//! The variable-provider plugin: resolves blocks from its own value store,
//! independent of the per-render provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use serde_json::{json, Map, Value};

use blockfill_parser::Block;

use crate::plugin::Plugin;
use crate::registry::{read_guard, write_guard};
use crate::value::lookup;

static PROVIDER_SEQ: AtomicUsize = AtomicUsize::new(0);

/// A plugin carrying its own private value store (mapping or list).
///
/// With a prefix configured (say `$`), only blocks whose raw text starts
/// with it are eligible; the prefix is stripped to form the store key. A
/// block is claimed only when that key actually exists in the store, so
/// unrelated blocks fall through to other plugins or plain lookup.
///
/// At render time a key equal to the block's original raw text found
/// directly in the per-render provider shadows the store: render-time values
/// always win over provider defaults.
///
/// Instances are cheap to share. The store has interior mutability so
/// [`provide`](Self::provide) can keep merging values after the plugin has
/// been registered with compilers.
///
/// # Example
///
/// ```rust
/// use blockfill::plugins::VariableProviderPlugin;
/// use blockfill::{CompileOptions, Compiler, PluginArg};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let provider = Arc::new(
///     VariableProviderPlugin::named("roots")
///         .with_prefix("$")
///         .with_values(json!({"root": "/root"})),
/// );
/// let compiler = Compiler::with_plugins(
///     [PluginArg::Instance(provider.clone())],
///     CompileOptions::new(),
/// );
///
/// provider.provide(json!({"userDir": "/usr"}));
/// let template = compiler.compile("<$root><$userDir>");
///
/// assert_eq!(template.render(&json!({})), "/root/usr");
/// // A render-time `$root` shadows the provider's own value.
/// assert_eq!(template.render(&json!({"$root": "/custom"})), "/custom/usr");
/// ```
pub struct VariableProviderPlugin {
    name: String,
    prefix: Option<String>,
    store: RwLock<Value>,
}

impl VariableProviderPlugin {
    /// An auto-named provider (`var-provider-1`, `var-provider-2`, ...) with
    /// an empty mapping store and no prefix.
    pub fn new() -> Self {
        let seq = PROVIDER_SEQ.fetch_add(1, Ordering::Relaxed) + 1;
        Self::named(format!("var-provider-{seq}"))
    }

    /// A provider registered under an explicit name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            store: RwLock::new(Value::Object(Map::new())),
        }
    }

    /// Requires blocks to carry this literal prefix; it is stripped before
    /// the store lookup.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Seeds the store, replacing its current contents.
    pub fn with_values(self, values: Value) -> Self {
        self.replace(values);
        self
    }

    /// Merges new values into the store.
    ///
    /// Two mappings merge by key union (incoming keys win); two lists merge
    /// by appending. Any shape mismatch silently downgrades to a wholesale
    /// replacement.
    pub fn provide(&self, values: Value) {
        let mut store = write_guard(&self.store);
        merge(&mut store, values);
    }

    /// Replaces the store wholesale.
    pub fn replace(&self, values: Value) {
        *write_guard(&self.store) = values;
    }

    /// A snapshot of the current store.
    pub fn values(&self) -> Value {
        read_guard(&self.store).clone()
    }

    fn key_attr(&self) -> String {
        format!("{}.key", self.name)
    }
}

impl Default for VariableProviderPlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn merge(store: &mut Value, incoming: Value) {
    match (store, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                existing.insert(key, value);
            }
        }
        (Value::Array(existing), Value::Array(incoming)) => {
            existing.extend(incoming);
        }
        (store, incoming) => *store = incoming,
    }
}

impl Plugin for VariableProviderPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform_block(&self, block: &mut Block) {
        let key = match &self.prefix {
            Some(prefix) => match block.raw().strip_prefix(prefix.as_str()) {
                Some(stripped) => stripped.to_string(),
                None => return,
            },
            None => block.raw().to_string(),
        };

        if lookup(&read_guard(&self.store), &key).is_some() {
            block.set_attr(self.key_attr(), json!(key));
            block.hits.push(self.name.clone());
        }
    }

    fn value(&self, values: &Value, block: &Block, _prev: Option<Value>) -> Option<Value> {
        // Render-time values shadow the store, keyed by the block's
        // original raw text (prefix included).
        if let Some(shadow) = lookup(values, block.raw()) {
            return Some(shadow.clone());
        }

        let key = block.attr(&self.key_attr())?.as_str()?.to_string();
        lookup(&read_guard(&self.store), &key).cloned()
    }
}
