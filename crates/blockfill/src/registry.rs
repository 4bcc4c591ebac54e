//! Plugin registries: per-compiler collections and the process-wide one.
//!
//! A registry is insertion-ordered. Order matters: the compile-time transform
//! chain runs plugins in registration order, which in turn fixes the order in
//! which plugins claim blocks and therefore the render-time chaining order.
//! Re-registering an existing name replaces the instance but keeps its
//! original position.
//!
//! The [`global`] module holds the process-wide registry. It starts empty and
//! is only ever populated by explicit [`global::add`] calls. Mutation is
//! internally lock-guarded, but a reader racing a writer still observes an
//! unspecified ordering; configure plugins fully before compiling or
//! rendering.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::plugin::{Plugin, PluginArg, PluginRef};

/// Acquires a read guard, recovering from a poisoned lock.
pub(crate) fn read_guard<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Acquires a write guard, recovering from a poisoned lock.
pub(crate) fn write_guard<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// An insertion-ordered collection of plugins keyed by name.
///
/// Lookup is a linear scan; plugin sets are small and the scan preserves the
/// ordering guarantees the transform chain depends on.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    entries: Vec<PluginRef>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin under its own name.
    ///
    /// An existing entry with the same name is replaced in place, keeping
    /// its registration position. Last add wins, silently.
    pub fn insert(&mut self, plugin: PluginRef) {
        match self
            .entries
            .iter()
            .position(|entry| entry.name() == plugin.name())
        {
            Some(index) => self.entries[index] = plugin,
            None => self.entries.push(plugin),
        }
    }

    /// Removes the plugin registered under `name`. Removing an absent name
    /// is a no-op.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|entry| entry.name() != name);
    }

    /// Looks up a plugin by name.
    pub fn get(&self, name: &str) -> Option<&PluginRef> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    /// Iterates plugins in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PluginRef> {
        self.entries.iter()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.name().to_string())
            .collect()
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The process-wide plugin registry.
///
/// Plugins referenced by bare name (in [`Compiler::with_plugins`],
/// [`Compiler::add`], and friends) resolve against this registry. It is
/// never populated implicitly.
///
/// [`Compiler::with_plugins`]: crate::Compiler::with_plugins
/// [`Compiler::add`]: crate::Compiler::add
pub mod global {
    use once_cell::sync::Lazy;
    use std::sync::RwLock;

    use super::{read_guard, write_guard, PluginRegistry};
    use crate::plugin::{PluginArg, PluginRef};

    static REGISTRY: Lazy<RwLock<PluginRegistry>> =
        Lazy::new(|| RwLock::new(PluginRegistry::new()));

    /// Registers a plugin globally, replacing any same-named entry.
    pub fn add(plugin: PluginRef) {
        write_guard(&REGISTRY).insert(plugin);
    }

    /// Registers several plugins in order.
    pub fn add_all(plugins: impl IntoIterator<Item = PluginRef>) {
        let mut registry = write_guard(&REGISTRY);
        for plugin in plugins {
            registry.insert(plugin);
        }
    }

    /// Removes a plugin by name or instance. Absent names are a no-op.
    pub fn remove(plugin: impl Into<PluginArg>) {
        let arg = plugin.into();
        write_guard(&REGISTRY).remove(arg.name());
    }

    /// Removes several plugins.
    pub fn remove_all<I>(plugins: I)
    where
        I: IntoIterator,
        I::Item: Into<PluginArg>,
    {
        let mut registry = write_guard(&REGISTRY);
        for plugin in plugins {
            registry.remove(plugin.into().name());
        }
    }

    /// Looks up a globally registered plugin by name.
    pub fn get(name: &str) -> Option<PluginRef> {
        read_guard(&REGISTRY).get(name).cloned()
    }

    /// A copy of the current global registry; the plugins themselves are
    /// shared by reference.
    pub fn snapshot() -> PluginRegistry {
        read_guard(&REGISTRY).clone()
    }

    /// Empties the global registry. Intended for tests.
    pub fn clear() {
        write_guard(&REGISTRY).entries.clear();
    }
}

/// Resolves an add/remove argument to a plugin instance.
///
/// Instances pass through; names are looked up globally. `None` means an
/// unresolved name, which callers ignore silently per the optional-dependency
/// contract.
pub(crate) fn resolve(arg: PluginArg) -> Option<PluginRef> {
    match arg {
        PluginArg::Instance(plugin) => Some(plugin),
        PluginArg::Name(name) => global::get(&name),
    }
}
