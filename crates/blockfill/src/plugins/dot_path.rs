//! The dot-path plugin: `<user.name>` walks nested providers.

use serde_json::{json, Value};

use blockfill_parser::Block;

use crate::plugin::Plugin;
use crate::value::lookup;

const NAME: &str = "dot-prop";
const PATH_ATTR: &str = "dot-prop.path";

/// Splits a block's raw text on `.`; more than one segment claims the block
/// and render-time resolution walks the provider segment by segment.
///
/// The walk short-circuits to not-found as soon as an intermediate value is
/// neither an object nor an array, so `<a.b.c>` against `{"a": 1}` resolves
/// nothing rather than failing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DotPathPlugin;

impl Plugin for DotPathPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn transform_block(&self, block: &mut Block) {
        let segments: Vec<&str> = block.raw().split('.').collect();
        if segments.len() > 1 {
            block.set_attr(PATH_ATTR, json!(segments));
            block.hits.push(NAME.to_string());
        }
    }

    fn value(&self, values: &Value, block: &Block, _prev: Option<Value>) -> Option<Value> {
        let path = block.attr(PATH_ATTR)?.as_array()?;

        let mut current = values;
        for segment in path.iter().filter_map(Value::as_str) {
            current = lookup(current, segment)?;
        }
        Some(current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfill_parser::{tokenize, DelimiterPair};
    use serde_json::json;

    fn block(raw: &str) -> Block {
        let template = format!("<{}>", raw);
        tokenize(&template, &DelimiterPair::default()).remove(0)
    }

    #[test]
    fn single_segment_claims_nothing() {
        let mut b = block("plain");
        DotPathPlugin.transform_block(&mut b);
        assert!(b.hits.is_empty());
    }

    #[test]
    fn dotted_name_claims_and_stores_path() {
        let mut b = block("user.profile.email");
        DotPathPlugin.transform_block(&mut b);

        assert_eq!(b.hits, ["dot-prop"]);
        assert_eq!(
            b.attr(PATH_ATTR),
            Some(&json!(["user", "profile", "email"]))
        );
    }

    #[test]
    fn value_walks_nested_objects() {
        let mut b = block("user.profile.email");
        DotPathPlugin.transform_block(&mut b);

        let values = json!({"user": {"profile": {"email": "a@b.c"}}});
        assert_eq!(
            DotPathPlugin.value(&values, &b, None),
            Some(json!("a@b.c"))
        );
    }

    #[test]
    fn value_walks_array_indices() {
        let mut b = block("users.1.name");
        DotPathPlugin.transform_block(&mut b);

        let values = json!({"users": [{"name": "alice"}, {"name": "bob"}]});
        assert_eq!(DotPathPlugin.value(&values, &b, None), Some(json!("bob")));
    }

    #[test]
    fn non_indexable_intermediate_short_circuits() {
        let mut b = block("a.b.c");
        DotPathPlugin.transform_block(&mut b);

        assert_eq!(DotPathPlugin.value(&json!({"a": 1}), &b, None), None);
        assert_eq!(DotPathPlugin.value(&json!({}), &b, None), None);
    }
}
