//! Output assembly: splicing literal spans with resolved block values.
//!
//! A render is one left-to-right pass over the compiled block list. Literal
//! spans between blocks are copied with escape characters consumed; each
//! block contributes its resolved value coerced to text. Blocks with an
//! empty hit list resolve by plain provider lookup; blocks with hits thread
//! an accumulator through each hit's plugin in order, skipping plugins that
//! are absent from the render-time registry.
//!
//! Nothing here fails. A block that resolves to no value renders as the
//! literal text `undefined`, and (outside production mode) logs a warning
//! with the block's span, the plugin chain that was attempted, and the full
//! provider snapshot. The collected issues also feed the strict
//! `try_render` path, which reports the first of them as an error instead.

use serde_json::Value;

use blockfill_parser::unescape_into;

use crate::compiler::CompiledResult;
use crate::error::RenderError;
use crate::options::ExecutionMode;
use crate::plugin::Plugin;
use crate::registry::PluginRegistry;
use crate::value::{format_value, lookup, MISSING_TEXT};

/// A finished render plus every best-effort fallback it took.
pub(crate) struct Rendered {
    pub(crate) text: String,
    pub(crate) issues: Vec<RenderError>,
}

/// Renders a compiled result against a value provider.
///
/// `registry` is the render-time plugin registry; `None` means plain lookup
/// only (hit chains find no plugins and fall through).
pub(crate) fn render_blocks(
    result: &CompiledResult,
    values: &Value,
    registry: Option<&PluginRegistry>,
) -> Rendered {
    let template = result.template();
    let mut text = String::with_capacity(template.len());
    let mut issues = Vec::new();

    let mut cursor = 0;
    for block in result.blocks() {
        unescape_into(&mut text, &template[cursor..block.loc.s]);

        match resolve_block(block, values, registry, &mut issues) {
            Some(value) => text.push_str(&format_value(&value)),
            None => {
                if result.mode() != ExecutionMode::Production {
                    log::warn!(
                        "no value for block {:?} at bytes {}..={} (plugin chain {:?}); values: {}",
                        block.name,
                        block.loc.s,
                        block.loc.e,
                        block.hits,
                        values
                    );
                }
                issues.push(RenderError::MissingValue {
                    name: block.name.clone(),
                    start: block.loc.s,
                    end: block.loc.e,
                });
                text.push_str(MISSING_TEXT);
            }
        }

        cursor = block.loc.e + 1;
    }
    unescape_into(&mut text, &template[cursor..]);

    Rendered { text, issues }
}

fn resolve_block(
    block: &blockfill_parser::Block,
    values: &Value,
    registry: Option<&PluginRegistry>,
    issues: &mut Vec<RenderError>,
) -> Option<Value> {
    if block.hits.is_empty() {
        return lookup(values, &block.name).cloned();
    }

    let mut acc = None;
    for hit in &block.hits {
        match registry.and_then(|r| r.get(hit)) {
            Some(plugin) => acc = plugin.value(values, block, acc),
            None => {
                // Absent plugin: the accumulator passes through unchanged.
                issues.push(RenderError::MissingPlugin { name: hit.clone() });
            }
        }
    }
    acc
}
