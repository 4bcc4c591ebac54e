//! # Blockfill - Placeholder Templates with a Plugin Pipeline
//!
//! `blockfill` compiles a template string containing delimited placeholder
//! blocks (default `<name>`) into a reusable compiled form, and lets
//! independently-authored plugins intercept both how a block's metadata is
//! derived at compile time and how its value is computed at render time.
//!
//! ## Core Concepts
//!
//! - [`compile`] / [`parse`]: the plain pipeline; tokenize once, render many
//!   times by name lookup
//! - [`Compiler`]: a compiler bound to its own plugin registry, producing
//!   [`Template`]s whose rendering follows the registry live
//! - [`Plugin`]: the capability interface, a compile-time block transform
//!   plus a render-time value resolver
//! - [`global`]: the process-wide plugin registry that bare-name references
//!   resolve against
//! - [`plugins`]: the built-ins (pipe filters, slicing, dotted paths,
//!   variable providers)
//!
//! ## Quick Start
//!
//! ```rust
//! use blockfill::parse;
//! use serde_json::json;
//!
//! assert_eq!(
//!     parse("hello, <name>!", &json!({"name": "world"})),
//!     "hello, world!"
//! );
//! assert_eq!(parse("hi <0>, i'm <1>", &json!(["jim", "jack"])), "hi jim, i'm jack");
//! ```
//!
//! ## Compile Once, Render Many
//!
//! ```rust
//! use blockfill::{compile, CompileOptions, DelimiterPair};
//! use serde_json::json;
//!
//! let options = CompileOptions::new().pairs(DelimiterPair::new("{{", "}}").unwrap());
//! let result = compile("hello {{name}}", options);
//!
//! assert_eq!(result.render(&json!({"name": "world"})), "hello world");
//! assert_eq!(result.render(&json!({"name": "again"})), "hello again");
//! ```
//!
//! ## Plugins
//!
//! A plugin claims blocks at compile time by pushing its name onto the
//! block's hit list; at render time the hits resolve in claim order, each
//! plugin receiving the previous plugin's output:
//!
//! ```rust
//! use blockfill::plugins::{PipePlugin, SlicePlugin};
//! use blockfill::{CompileOptions, Compiler, DelimiterPair, PluginArg};
//! use serde_json::json;
//!
//! let compiler = Compiler::with_plugins(
//!     [PluginArg::plugin(PipePlugin::new()), PluginArg::plugin(SlicePlugin)],
//!     CompileOptions::new().pairs(DelimiterPair::new("{", "}").unwrap()),
//! );
//!
//! let template = compiler.compile("{key|upper}:{hash:3}");
//! let values = json!({"key": "hash", "hash": "1234567"});
//! assert_eq!(template.render(&values), "HASH:123");
//! ```
//!
//! ## Error Philosophy
//!
//! The default paths are best-effort and silent: an unmatched opener stays
//! literal text, an empty placeholder is dropped, a missing value renders as
//! the literal text `undefined` (with a logged diagnostic outside
//! [`ExecutionMode::Production`]), and a plugin that is referenced but not
//! registered is skipped. The only construction-time failure is an invalid
//! delimiter pair, rejected by [`DelimiterPair::new`]. Callers who want
//! failures instead of fallbacks use [`Template::try_render`] /
//! [`CompiledResult::try_render`].
//!
//! ## Escapes
//!
//! A backslash makes the next character literal, which is how delimiter
//! characters appear in output:
//!
//! ```rust
//! use blockfill::parse;
//! use serde_json::json;
//!
//! assert_eq!(parse(r"\<name>", &json!({"name": "x"})), "<name>");
//! ```

mod compiler;
mod enhance;
mod error;
mod options;
mod plugin;
pub mod plugins;
mod registry;
mod renderer;
mod value;

pub use blockfill_parser::{
    match_delimiter, tokenize, unescape_into, Block, DelimiterError, DelimiterMatch,
    DelimiterPair, Loc, Tokenizer, ESCAPE_CHAR,
};

pub use compiler::{compile, compile_with, parse, CompiledResult};
pub use enhance::{Compiler, Template};
pub use error::RenderError;
pub use options::{BlockTransform, CompileOptions, ExecutionMode};
pub use plugin::{Plugin, PluginArg, PluginRef};
pub use registry::{global, PluginRegistry};
pub use value::{format_value, lookup};
