//! Value-provider lookup and text coercion.
//!
//! A value provider is a `serde_json::Value`: an object acts as a keyed
//! mapping, an array as an ordered list addressed by numeric keys. Any other
//! shape resolves nothing.

use serde_json::Value;

/// Literal text spliced into the output when a block resolves to no value.
pub(crate) const MISSING_TEXT: &str = "undefined";

/// Looks up `key` in a provider.
///
/// Objects resolve by key; arrays resolve keys that parse as indices.
pub fn lookup<'a>(provider: &'a Value, key: &str) -> Option<&'a Value> {
    match provider {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Coerces a resolved value to output text.
///
/// Strings render bare (no quotes), numbers and booleans via their display
/// form, `null` as empty text. Arrays and objects fall back to their compact
/// JSON representation.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
