//! Compile-time configuration.

use serde::Serialize;

use blockfill_parser::{Block, DelimiterPair};

/// A compiler-supplied block transform, run after tokenization and before
/// any plugin transforms.
pub type BlockTransform = Box<dyn Fn(&mut Block) + Send + Sync>;

/// Controls render-time diagnostics.
///
/// Rendering behaves identically in both modes; the only difference is that
/// [`Production`](ExecutionMode::Production) suppresses the warning logged
/// when a block resolves to no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ExecutionMode {
    /// Unresolved blocks log a diagnostic naming the span, the attempted
    /// plugin chain, and the provider snapshot.
    #[default]
    Debug,
    /// Diagnostics are suppressed.
    Production,
}

/// Options for one compilation.
///
/// Delimiter validity (non-empty, distinct markers) is enforced by the
/// [`DelimiterPair`] constructor, so compiling itself never fails.
///
/// # Example
///
/// ```rust
/// use blockfill::{compile, CompileOptions, DelimiterPair};
/// use serde_json::json;
///
/// let options = CompileOptions::new()
///     .pairs(DelimiterPair::new("{{", "}}").unwrap())
///     .transform(|block| block.name = block.name.to_lowercase());
///
/// let result = compile("hello {{ NAME }}", options);
/// assert_eq!(result.render(&json!({"name": "world"})), "hello world");
/// ```
#[derive(Default)]
pub struct CompileOptions {
    pub(crate) pairs: DelimiterPair,
    pub(crate) transforms: Vec<BlockTransform>,
    pub(crate) mode: ExecutionMode,
}

impl CompileOptions {
    /// Default options: `<` / `>` delimiters, no transforms, debug mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delimiter pair.
    pub fn pairs(mut self, pairs: DelimiterPair) -> Self {
        self.pairs = pairs;
        self
    }

    /// Appends a custom block transform. Transforms run in the order they
    /// were added, once per block.
    pub fn transform(mut self, transform: impl Fn(&mut Block) + Send + Sync + 'static) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Sets the execution mode.
    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for [`mode(ExecutionMode::Production)`](Self::mode).
    pub fn production(self) -> Self {
        self.mode(ExecutionMode::Production)
    }
}
