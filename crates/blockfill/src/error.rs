//! Error types for strict rendering.
//!
//! The default render path never fails: missing values render as the literal
//! text `undefined` and absent plugins are skipped. [`RenderError`] exists
//! only for the opt-in strict path ([`Template::try_render`] and
//! [`CompiledResult::try_render`]), which surfaces the first best-effort
//! fallback as an error instead.
//!
//! [`Template::try_render`]: crate::Template::try_render
//! [`CompiledResult::try_render`]: crate::CompiledResult::try_render

use thiserror::Error;

/// A condition the default renderer papers over silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// No value could be resolved for a block; the silent path would have
    /// emitted the literal text `undefined` here.
    #[error("no value resolved for block {name:?} at bytes {start}..={end}")]
    MissingValue {
        /// The block's lookup key at render time.
        name: String,
        /// Byte offset where the block's delimited span starts.
        start: usize,
        /// Byte offset where the span ends (inclusive).
        end: usize,
    },

    /// A block's hit list names a plugin that is absent from the render-time
    /// registry; the silent path passes the accumulator through unchanged.
    #[error("plugin {name:?} claimed a block but is not registered at render time")]
    MissingPlugin {
        /// The missing plugin's registry name.
        name: String,
    },
}
