//! Compilation: tokenize once, transform each block, reuse forever.

use serde::Serialize;
use serde_json::Value;

use blockfill_parser::{tokenize, Block, DelimiterPair};

use crate::error::RenderError;
use crate::options::{CompileOptions, ExecutionMode};
use crate::registry::PluginRegistry;
use crate::renderer::render_blocks;

/// The reusable product of compiling one template.
///
/// Holds the untouched template text, the ordered block list, and the
/// options that still matter after compilation. A `CompiledResult` is
/// immutable: rendering takes `&self`, never mutates blocks or text, and may
/// be repeated from any number of call sites.
///
/// Serializes to a plain snapshot (template, blocks, options), which is
/// handy for golden tests and debugging dumps.
#[derive(Debug, Serialize)]
pub struct CompiledResult {
    template: String,
    blocks: Vec<Block>,
    pairs: DelimiterPair,
    mode: ExecutionMode,
}

impl CompiledResult {
    pub(crate) fn new(
        template: String,
        blocks: Vec<Block>,
        pairs: DelimiterPair,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            template,
            blocks,
            pairs,
            mode,
        }
    }

    /// The original template text.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The recognized blocks in ascending source order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The delimiter pair this result was compiled with.
    pub fn pairs(&self) -> &DelimiterPair {
        &self.pairs
    }

    /// The execution mode this result was compiled with.
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Renders with plain name lookup only (no plugins).
    ///
    /// Missing values render as the literal text `undefined`.
    pub fn render(&self, values: &Value) -> String {
        render_blocks(self, values, None).text
    }

    /// Strict variant of [`render`](Self::render): fails on the first block
    /// that resolves to no value instead of splicing `undefined`.
    pub fn try_render(&self, values: &Value) -> Result<String, RenderError> {
        let rendered = render_blocks(self, values, None);
        match rendered.issues.into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(rendered.text),
        }
    }

    /// Renders against an explicit plugin registry, chaining block hits.
    pub fn render_with(&self, values: &Value, registry: &PluginRegistry) -> String {
        render_blocks(self, values, Some(registry)).text
    }

    /// Strict variant of [`render_with`](Self::render_with).
    pub fn try_render_with(
        &self,
        values: &Value,
        registry: &PluginRegistry,
    ) -> Result<String, RenderError> {
        let rendered = render_blocks(self, values, Some(registry));
        match rendered.issues.into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(rendered.text),
        }
    }
}

/// Compiles a template: one tokenizer pass, then the custom transform chain
/// over each block in order.
///
/// The result is reusable across any number of renders. Plugins do not
/// participate here; for plugin-aware compilation use a
/// [`Compiler`](crate::Compiler).
pub fn compile(template: impl Into<String>, options: CompileOptions) -> CompiledResult {
    let template = template.into();
    let mut blocks = tokenize(&template, &options.pairs);
    for block in &mut blocks {
        for transform in &options.transforms {
            transform(block);
        }
    }
    CompiledResult::new(template, blocks, options.pairs, options.mode)
}

/// Compiles and hands the result to a caller-supplied consumer, returning
/// whatever the consumer produces.
///
/// This is the escape hatch for callers that want their own view of the
/// tokenization instead of the built-in renderer.
///
/// # Example
///
/// ```rust
/// use blockfill::{compile_with, CompileOptions};
///
/// let names = compile_with("<foo><bar>", CompileOptions::new(), |result| {
///     result
///         .blocks()
///         .iter()
///         .map(|b| b.name.clone())
///         .collect::<Vec<_>>()
///         .join(",")
/// });
/// assert_eq!(names, "foo,bar");
/// ```
pub fn compile_with<R>(
    template: impl Into<String>,
    options: CompileOptions,
    consumer: impl FnOnce(&CompiledResult) -> R,
) -> R {
    let result = compile(template, options);
    consumer(&result)
}

/// One-shot compile and render with default options and plain name lookup.
///
/// The convenience path for simple substitutions, bypassing the plugin
/// system entirely. For repeated rendering of the same template, compile
/// once and call [`CompiledResult::render`].
///
/// # Example
///
/// ```rust
/// use blockfill::parse;
/// use serde_json::json;
///
/// assert_eq!(
///     parse("<rootDir>/path/to", &json!({"rootDir": "/foo"})),
///     "/foo/path/to"
/// );
/// assert_eq!(parse("hi <0>", &json!(["jim"])), "hi jim");
/// ```
pub fn parse(template: &str, values: &Value) -> String {
    compile(template, CompileOptions::new()).render(values)
}
