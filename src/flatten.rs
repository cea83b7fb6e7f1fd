//! Dot-notation transform for nested translation payloads.

use std::fmt;
use std::sync::Arc;

use crate::node::{
    Node,
    ObjectMap,
};

/// Separator joining path segments.
pub const KEY_SEPARATOR: char = '.';

/// How arrays are handled while flattening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayMode {
    /// Recurse into arrays by index (`list.0.name`).
    #[default]
    Expand,
    /// Keep arrays, flattening each element on its own.
    Preserve,
    /// No transform at all.
    Off,
}

/// Flattens `input` into a map from dotted path to leaf.
///
/// Objects (and arrays in [`ArrayMode::Expand`]) yield [`Node::Object`] of
/// dotted keys, prefixed with `prefix` when it is not empty. A container
/// that produces no keys collapses to the `null` marker so that "present but
/// empty" stays distinguishable from absent. Leaves are returned as they are.
///
/// # Examples
/// ```
/// use routed_i18n::flatten::{flatten, ArrayMode};
/// use routed_i18n::node::Node;
/// use serde_json::json;
///
/// let flat = flatten(&Node::from(json!({ "a": { "b": ["x"] } })), ArrayMode::Expand, "");
/// assert_eq!(flat.get("a.b.0").and_then(Node::as_str), Some("x"));
/// ```
#[must_use]
pub fn flatten(input: &Node, mode: ArrayMode, prefix: &str) -> Node {
    let prefix = (!prefix.is_empty()).then_some(prefix);

    match (input, mode) {
        (_, ArrayMode::Off) => input.clone(),
        (Node::Object(map), _) => {
            let mut output = ObjectMap::new();
            for (key, value) in map {
                flatten_into(&mut output, prefix, key, value, mode);
            }
            collapse(output)
        }
        (Node::Array(items), ArrayMode::Expand) => {
            let mut output = ObjectMap::new();
            for (index, value) in items.iter().enumerate() {
                flatten_into(&mut output, prefix, &index.to_string(), value, mode);
            }
            collapse(output)
        }
        (Node::Array(items), ArrayMode::Preserve) => {
            Node::Array(items.iter().map(|item| flatten(item, mode, "")).collect())
        }
        (Node::Leaf(_), _) => input.clone(),
    }
}

/// Flattens an object map, returning an empty map for the empty marker.
#[must_use]
pub fn to_dot_notation(input: &ObjectMap, mode: ArrayMode) -> ObjectMap {
    if mode == ArrayMode::Off {
        return input.clone();
    }

    match flatten(&Node::Object(input.clone()), mode, "") {
        Node::Object(map) => map,
        _ => ObjectMap::new(),
    }
}

/// Writes the entries of `value` under `prefix.key` into `output`.
fn flatten_into(
    output: &mut ObjectMap,
    prefix: Option<&str>,
    key: &str,
    value: &Node,
    mode: ArrayMode,
) {
    let full_key = prefix.map_or_else(|| key.to_string(), |p| format!("{p}{KEY_SEPARATOR}{key}"));

    match (value, mode) {
        (Node::Object(map), _) => {
            for (child_key, child) in map {
                flatten_into(output, Some(&full_key), child_key, child, mode);
            }
        }
        (Node::Array(items), ArrayMode::Expand) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(output, Some(&full_key), &index.to_string(), child, mode);
            }
        }
        (Node::Array(items), _) => {
            let items = items.iter().map(|item| flatten(item, mode, "")).collect();
            output.insert(full_key, Node::Array(items));
        }
        (Node::Leaf(_), _) => {
            output.insert(full_key, value.clone());
        }
    }
}

/// Empty marker for maps without entries.
fn collapse(output: ObjectMap) -> Node {
    if output.is_empty() { Node::null() } else { Node::Object(output) }
}

/// Custom preprocessing function.
pub type TransformFn = Arc<dyn Fn(&ObjectMap) -> ObjectMap + Send + Sync>;

/// Preprocessing applied to every locale's data before it reaches the
/// flattened table.
#[derive(Clone, Default)]
pub enum Preprocess {
    /// Dot notation, recursing into arrays.
    #[default]
    Full,
    /// Dot notation, keeping arrays.
    PreserveArrays,
    /// Keep nested data as it is.
    None,
    /// Caller-supplied transform.
    Custom(TransformFn),
}

impl Preprocess {
    /// Wraps a custom transform.
    pub fn custom<F>(transform: F) -> Self
    where
        F: Fn(&ObjectMap) -> ObjectMap + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(transform))
    }

    #[must_use]
    pub fn apply(&self, input: &ObjectMap) -> ObjectMap {
        match self {
            Self::Full => to_dot_notation(input, ArrayMode::Expand),
            Self::PreserveArrays => to_dot_notation(input, ArrayMode::Preserve),
            Self::None => to_dot_notation(input, ArrayMode::Off),
            Self::Custom(transform) => transform(input),
        }
    }
}

impl fmt::Debug for Preprocess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("Full"),
            Self::PreserveArrays => f.write_str("PreserveArrays"),
            Self::None => f.write_str("None"),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::*;
    use serde_json::{
        Value,
        json,
    };

    use super::*;

    fn node(value: Value) -> Node {
        Node::from(value)
    }

    #[rstest]
    fn expand_nested_objects() {
        let flat = flatten(
            &node(json!({ "common": { "hello": "Hello", "errors": { "notFound": "Not found" } } })),
            ArrayMode::Expand,
            "",
        );

        assert_eq!(
            flat,
            node(json!({ "common.hello": "Hello", "common.errors.notFound": "Not found" }))
        );
    }

    #[rstest]
    fn expand_recurses_into_arrays_by_index() {
        let flat = flatten(&node(json!({ "list": [{ "a": 1 }, { "a": 2 }] })), ArrayMode::Expand, "");

        assert_eq!(flat, node(json!({ "list.0.a": 1, "list.1.a": 2 })));
    }

    #[rstest]
    fn preserve_keeps_arrays_with_flattened_elements() {
        let flat =
            flatten(&node(json!({ "list": [{ "a": 1 }, { "a": 2 }] })), ArrayMode::Preserve, "");

        assert_eq!(flat, node(json!({ "list": [{ "a": 1 }, { "a": 2 }] })));
    }

    #[rstest]
    fn preserve_flattens_objects_inside_arrays() {
        let input = json!({
            "preprocess": [{ "test": { "array": "passed" } }, "string", null, 0, 1, -1, true, false]
        });

        let flat = flatten(&node(input), ArrayMode::Preserve, "");

        assert_eq!(
            flat,
            node(json!({
                "preprocess": [{ "test.array": "passed" }, "string", null, 0, 1, -1, true, false]
            }))
        );
    }

    #[rstest]
    fn preserve_collapses_empty_array_elements_to_null() {
        let flat = flatten(&node(json!({ "list": [{}, { "a": {} }] })), ArrayMode::Preserve, "");

        assert_eq!(flat, node(json!({ "list": [null, null] })));
    }

    #[rstest]
    #[case(ArrayMode::Expand)]
    #[case(ArrayMode::Preserve)]
    fn empty_object_collapses_to_null_marker(#[case] mode: ArrayMode) {
        assert_that!(flatten(&node(json!({})), mode, ""), eq(&Node::null()));
        assert_that!(flatten(&node(json!({ "a": {} })), mode, ""), eq(&Node::null()));
    }

    #[rstest]
    fn off_returns_input_unchanged() {
        let input = node(json!({ "a": { "b": [1, { "c": "d" }] } }));

        assert_eq!(flatten(&input, ArrayMode::Off, ""), input);
    }

    #[rstest]
    fn prefix_is_prepended_to_keys() {
        let flat = flatten(&node(json!({ "hello": "Hello" })), ArrayMode::Expand, "common");

        assert_eq!(flat, node(json!({ "common.hello": "Hello" })));
    }

    #[rstest]
    #[case(json!("text"))]
    #[case(json!(null))]
    #[case(json!(42))]
    fn leaves_are_returned_as_is(#[case] leaf: Value) {
        assert_that!(flatten(&node(leaf.clone()), ArrayMode::Expand, ""), eq(&node(leaf)));
    }

    #[rstest]
    fn to_dot_notation_maps_null_marker_to_empty_map() {
        let input = node(json!({ "a": {} })).as_object().cloned().unwrap();

        assert_that!(to_dot_notation(&input, ArrayMode::Expand).is_empty(), eq(true));
    }

    #[rstest]
    fn preprocess_custom_runs_transform() {
        let preprocess = Preprocess::custom(|input| {
            input.iter().map(|(key, value)| (key.to_uppercase(), value.clone())).collect()
        });
        let input = node(json!({ "hello": "Hello" })).as_object().cloned().unwrap();

        let output = preprocess.apply(&input);

        assert_that!(output.get("HELLO").and_then(Node::as_str), some(eq("Hello")));
    }

    fn nested_without_arrays() -> impl Strategy<Value = Node> {
        let leaf = prop_oneof![
            any::<bool>().prop_map(|b| Node::Leaf(json!(b))),
            any::<i32>().prop_map(|n| Node::Leaf(json!(n))),
            "[a-z ]{0,8}".prop_map(Node::from),
        ];
        leaf.prop_recursive(4, 32, 5, |inner| {
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..5).prop_map(Node::Object)
        })
    }

    fn count_leaves(node: &Node) -> usize {
        match node {
            Node::Leaf(_) => 1,
            Node::Object(map) => map.values().map(count_leaves).sum(),
            Node::Array(items) => items.iter().map(count_leaves).sum(),
        }
    }

    proptest! {
        #[test]
        fn off_round_trips(input in nested_without_arrays()) {
            prop_assert_eq!(flatten(&input, ArrayMode::Off, ""), input);
        }

        #[test]
        fn expand_covers_every_leaf(map in prop::collection::btree_map("[a-z]{1,6}", nested_without_arrays(), 1..5)) {
            let input = Node::Object(map);
            let expected = count_leaves(&input);

            match flatten(&input, ArrayMode::Expand, "") {
                Node::Object(flat) => {
                    prop_assert_eq!(flat.len(), expected);
                    prop_assert!(flat.values().all(|value| matches!(value, Node::Leaf(_))));
                }
                other => {
                    prop_assert_eq!(expected, 0);
                    prop_assert_eq!(other, Node::null());
                }
            }
        }
    }
}
