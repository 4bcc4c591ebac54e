//! Plugin-aware compilation: the [`Compiler`] and its live-registry
//! [`Template`]s.

use std::sync::{Arc, RwLock};

use serde_json::Value;

use blockfill_parser::tokenize;

use crate::compiler::CompiledResult;
use crate::error::RenderError;
use crate::options::CompileOptions;
use crate::plugin::{Plugin, PluginArg};
use crate::registry::{self, global, read_guard, write_guard, PluginRegistry};
use crate::renderer::render_blocks;

/// A compiler bound to its own plugin registry.
///
/// Construction copies plugins *by reference* into a private registry:
/// either every plugin from the global registry ([`Compiler::new`]) or an
/// explicit selection ([`Compiler::with_plugins`]). The private registry
/// mutates independently afterwards: removing a plugin here never affects
/// the global registry or any other compiler.
///
/// Templates compiled by this compiler stay bound to its **live** registry,
/// so removing a plugin after compiling changes the render-time behavior of
/// every template this compiler has produced (absent plugins are skipped
/// during hit chaining).
///
/// Registry mutation is internally lock-guarded, but ordering between a
/// mutating call and a concurrent compile/render is unspecified, so
/// configure plugins before putting a compiler to work.
///
/// # Example
///
/// ```rust
/// use blockfill::plugins::{PipePlugin, SlicePlugin};
/// use blockfill::{CompileOptions, Compiler, DelimiterPair, PluginArg};
/// use serde_json::json;
///
/// let compiler = Compiler::with_plugins(
///     [PluginArg::plugin(PipePlugin::new()), PluginArg::plugin(SlicePlugin)],
///     CompileOptions::new().pairs(DelimiterPair::new("{", "}").unwrap()),
/// );
///
/// let template = compiler.compile("{key|upper}:{hash:3}");
/// let values = json!({"key": "hash", "hash": "1234567"});
/// assert_eq!(template.render(&values), "HASH:123");
/// ```
pub struct Compiler {
    registry: Arc<RwLock<PluginRegistry>>,
    options: CompileOptions,
}

impl Compiler {
    /// A compiler preloaded with every globally registered plugin, using
    /// default options.
    pub fn new() -> Self {
        Self::with_options(CompileOptions::new())
    }

    /// A compiler preloaded with every globally registered plugin.
    pub fn with_options(options: CompileOptions) -> Self {
        Self {
            registry: Arc::new(RwLock::new(global::snapshot())),
            options,
        }
    }

    /// A compiler holding exactly the given plugins, in order.
    ///
    /// Name arguments resolve against the global registry; unresolved names
    /// are silently ignored. An empty iterator yields an empty registry.
    pub fn with_plugins<I>(plugins: I, options: CompileOptions) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PluginArg>,
    {
        let mut registry = PluginRegistry::new();
        for plugin in plugins {
            if let Some(resolved) = registry::resolve(plugin.into()) {
                registry.insert(resolved);
            }
        }
        Self {
            registry: Arc::new(RwLock::new(registry)),
            options,
        }
    }

    /// Compiles a template against the current plugin set.
    ///
    /// Each block runs through the transform chain: the compiler's custom
    /// transforms first, then every registered plugin's `transform_block` in
    /// registration order. Plugins added after construction participate in
    /// templates compiled after the addition.
    pub fn compile(&self, template: impl Into<String>) -> Template {
        let template = template.into();
        let mut blocks = tokenize(&template, &self.options.pairs);
        {
            let registry = read_guard(&self.registry);
            for block in &mut blocks {
                for transform in &self.options.transforms {
                    transform(block);
                }
                for plugin in registry.iter() {
                    plugin.transform_block(block);
                }
            }
        }
        Template {
            result: CompiledResult::new(
                template,
                blocks,
                self.options.pairs.clone(),
                self.options.mode,
            ),
            registry: Arc::clone(&self.registry),
        }
    }

    /// Adds a plugin (by name or instance), replacing any same-named entry.
    /// Unresolved names are silently ignored.
    pub fn add(&self, plugin: impl Into<PluginArg>) {
        if let Some(resolved) = registry::resolve(plugin.into()) {
            write_guard(&self.registry).insert(resolved);
        }
    }

    /// Adds several plugins in order.
    pub fn add_all<I>(&self, plugins: I)
    where
        I: IntoIterator,
        I::Item: Into<PluginArg>,
    {
        for plugin in plugins {
            self.add(plugin);
        }
    }

    /// Removes a plugin by name or instance. Absent names are a no-op.
    pub fn remove(&self, plugin: impl Into<PluginArg>) {
        let arg = plugin.into();
        write_guard(&self.registry).remove(arg.name());
    }

    /// Removes several plugins.
    pub fn remove_all<I>(&self, plugins: I)
    where
        I: IntoIterator,
        I::Item: Into<PluginArg>,
    {
        for plugin in plugins {
            self.remove(plugin);
        }
    }

    /// The currently registered plugin names, in registration order.
    pub fn plugin_names(&self) -> Vec<String> {
        read_guard(&self.registry).names()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// A compiled template bound to its compiler's live plugin registry.
///
/// Rendering reads the registry at call time, so plugin removals on the
/// owning [`Compiler`] take effect for renders that happen afterwards,
/// including renders of templates compiled before the removal.
pub struct Template {
    result: CompiledResult,
    registry: Arc<RwLock<PluginRegistry>>,
}

impl Template {
    /// Renders against a value provider, chaining plugin hits.
    ///
    /// Best-effort: missing values render as the literal text `undefined`
    /// and absent plugins are skipped.
    pub fn render(&self, values: &Value) -> String {
        let registry = read_guard(&self.registry);
        render_blocks(&self.result, values, Some(&registry)).text
    }

    /// Strict variant of [`render`](Self::render): fails on the first
    /// unresolved value or absent plugin.
    pub fn try_render(&self, values: &Value) -> Result<String, RenderError> {
        let registry = read_guard(&self.registry);
        let rendered = render_blocks(&self.result, values, Some(&registry));
        match rendered.issues.into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(rendered.text),
        }
    }

    /// The underlying compiled result.
    pub fn result(&self) -> &CompiledResult {
        &self.result
    }
}
