//! The plugin capability interface.
//!
//! A plugin participates in the pipeline at two points: at compile time its
//! [`transform_block`](Plugin::transform_block) may rewrite a freshly
//! tokenized block's metadata and claim the block by pushing its own name
//! onto the block's hit list; at render time its [`value`](Plugin::value) is
//! called for every block whose hit list contains the plugin's name, in hit
//! order, threading an accumulator from plugin to plugin.
//!
//! Plugins are shared by reference ([`PluginRef`]): registering the same
//! instance with several compilers and the global registry is the normal
//! arrangement, which is why the trait takes `&self` and stateful plugins
//! guard their interior with locks.
//!
//! # Example
//!
//! ```rust
//! use blockfill::{Block, Plugin};
//! use serde_json::{json, Value};
//!
//! /// Sums `+`-separated operands: `<a+b+c>`.
//! struct SumPlugin;
//!
//! impl Plugin for SumPlugin {
//!     fn name(&self) -> &str {
//!         "sum"
//!     }
//!
//!     fn transform_block(&self, block: &mut Block) {
//!         let operands: Vec<&str> = block.raw().split('+').map(str::trim).collect();
//!         if operands.len() > 1 {
//!             block.set_attr("sum.operands", json!(operands));
//!             block.hits.push(self.name().to_string());
//!         }
//!     }
//!
//!     fn value(&self, values: &Value, block: &Block, _prev: Option<Value>) -> Option<Value> {
//!         let operands = block.attr("sum.operands")?.as_array()?;
//!         let total: i64 = operands
//!             .iter()
//!             .filter_map(Value::as_str)
//!             .filter_map(|key| values.get(key))
//!             .filter_map(Value::as_i64)
//!             .sum();
//!         Some(json!(total))
//!     }
//! }
//! ```

use std::sync::Arc;

use blockfill_parser::Block;
use serde_json::Value;

/// A named compile-time transform and/or render-time value resolver.
pub trait Plugin: Send + Sync {
    /// The registry key. Must be unique within any one registry; a later
    /// registration under the same name replaces the earlier one.
    fn name(&self) -> &str;

    /// Compile-time hook, called once per tokenized block.
    ///
    /// May rewrite `block.name`, attach attributes, and push this plugin's
    /// name onto `block.hits` to claim render-time resolution. The default
    /// does nothing.
    fn transform_block(&self, _block: &mut Block) {}

    /// Render-time hook, called only for blocks whose hit list names this
    /// plugin.
    ///
    /// `prev` is the accumulator produced by earlier hits in the chain
    /// (`None` at the start of the chain). The return value becomes the
    /// accumulator for the next hit, or the block's final value at the end
    /// of the chain. The default passes the accumulator through unchanged.
    fn value(&self, _values: &Value, _block: &Block, prev: Option<Value>) -> Option<Value> {
        prev
    }
}

/// Shared handle to a plugin instance.
pub type PluginRef = Arc<dyn Plugin>;

/// Argument shape accepted by registry add/remove operations: a registered
/// name or a plugin instance.
///
/// A bare name resolves against the global registry; names that resolve to
/// nothing are silently ignored, so referencing an optional plugin that was
/// never registered is not an error.
#[derive(Clone)]
pub enum PluginArg {
    /// A plugin name to resolve against the global registry.
    Name(String),
    /// A plugin instance, used as-is.
    Instance(PluginRef),
}

impl PluginArg {
    /// Wraps a concrete plugin value as an instance argument.
    pub fn plugin<P: Plugin + 'static>(plugin: P) -> Self {
        PluginArg::Instance(Arc::new(plugin))
    }

    /// The name this argument refers to.
    pub fn name(&self) -> &str {
        match self {
            PluginArg::Name(name) => name,
            PluginArg::Instance(plugin) => plugin.name(),
        }
    }
}

impl From<&str> for PluginArg {
    fn from(name: &str) -> Self {
        PluginArg::Name(name.to_string())
    }
}

impl From<String> for PluginArg {
    fn from(name: String) -> Self {
        PluginArg::Name(name)
    }
}

impl From<PluginRef> for PluginArg {
    fn from(plugin: PluginRef) -> Self {
        PluginArg::Instance(plugin)
    }
}

impl From<&PluginRef> for PluginArg {
    fn from(plugin: &PluginRef) -> Self {
        PluginArg::Instance(Arc::clone(plugin))
    }
}
