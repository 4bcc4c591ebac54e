//! The slice plugin: `<hash:3>` truncates a looked-up value, for template
//! spots like `foo.<hash:7>.js`.

use serde_json::{json, Value};

use blockfill_parser::Block;

use crate::plugin::Plugin;
use crate::value::{format_value, lookup};

const NAME: &str = "slice";
const KEY_ATTR: &str = "slice.name";
const LEN_ATTR: &str = "slice.len";

/// Splits a block's raw text at the first `:`; when the suffix parses as a
/// length, claims the block and truncates the looked-up value to that many
/// characters at render time. A missing value truncates to empty text.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlicePlugin;

impl Plugin for SlicePlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn transform_block(&self, block: &mut Block) {
        let Some((key, len)) = block.raw().split_once(':') else {
            return;
        };
        let Ok(len) = len.trim().parse::<u64>() else {
            return;
        };
        block.set_attr(KEY_ATTR, json!(key.trim()));
        block.set_attr(LEN_ATTR, json!(len));
        block.hits.push(NAME.to_string());
    }

    fn value(&self, values: &Value, block: &Block, _prev: Option<Value>) -> Option<Value> {
        let key = block.attr(KEY_ATTR)?.as_str()?;
        let len = block.attr(LEN_ATTR)?.as_u64()? as usize;

        let text = lookup(values, key).map(format_value).unwrap_or_default();
        Some(json!(text.chars().take(len).collect::<String>()))
    }
}
