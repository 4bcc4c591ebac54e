//! Built-in plugins.
//!
//! Each plugin is an ordinary [`Plugin`](crate::Plugin) implementation with
//! no privileged access to the pipeline: the transform claims blocks by
//! pushing its name onto the hit list and stashes what it learned under
//! namespaced block attributes, and the value hook reads those attributes
//! back at render time.
//!
//! | Plugin | Syntax | Resolves to |
//! |--------|--------|-------------|
//! | [`PipePlugin`] | `<key\|upper\|trim>` | lookup of `key` threaded through named filters |
//! | [`SlicePlugin`] | `<hash:3>` | lookup of `hash` truncated to 3 characters |
//! | [`DotPathPlugin`] | `<user.name>` | nested lookup walking each segment |
//! | [`VariableProviderPlugin`] | `<$root>` | the plugin's own store, shadowed by render values |
//!
//! None of these are registered anywhere by default; add the ones you want
//! to the global registry or directly to a [`Compiler`](crate::Compiler).

mod dot_path;
mod pipe;
mod provider;
mod slice;

pub use dot_path::DotPathPlugin;
pub use pipe::{FilterFn, PipePlugin};
pub use provider::VariableProviderPlugin;
pub use slice::SlicePlugin;
