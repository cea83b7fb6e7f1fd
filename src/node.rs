//! Tagged value model for translation payloads.
//!
//! Payloads arrive as untyped JSON at the boundary and are converted into
//! [`Node`] so that every transform has an exhaustive `Leaf` / `Object` /
//! `Array` match.

use std::collections::{
    BTreeMap,
    BTreeSet,
    HashMap,
};

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

use crate::locale::LocaleTag;
use crate::logger;

/// Ordered string-keyed map of nodes.
pub type ObjectMap = BTreeMap<String, Node>;

/// Per-locale translation data (`locale -> namespace/key -> node`).
pub type Translations = HashMap<LocaleTag, ObjectMap>;

/// Per-locale set of namespace keys already merged into the store.
pub type LoadedKeys = HashMap<LocaleTag, BTreeSet<String>>;

/// A translation payload node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Node {
    /// Scalar value: null, boolean, number or string.
    Leaf(Value),
    Object(ObjectMap),
    Array(Vec<Self>),
}

impl Node {
    /// The `null` leaf, also used as the "present but empty" marker.
    #[must_use]
    pub const fn null() -> Self {
        Self::Leaf(Value::Null)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Leaf(Value::Null))
    }

    /// Returns the string content of a string leaf.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Leaf(Value::String(text)) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a direct child of an object node.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Converts the node back into untyped JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::from(self.clone())
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::null()
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(key, value)| (key, Self::from(value))).collect())
            }
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            leaf => Self::Leaf(leaf),
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::Leaf(leaf) => leaf,
            Node::Object(map) => {
                Self::Object(map.into_iter().map(|(key, node)| (key, Self::from(node))).collect())
            }
            Node::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
        }
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Leaf(Value::String(text.to_string()))
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Leaf(Value::String(text))
    }
}

/// Builds a [`Translations`] map from loosely keyed data.
///
/// Locale keys are normalized; entries that are not objects are skipped with a
/// warning.
pub fn normalize_translations<I, L>(entries: I) -> Translations
where
    I: IntoIterator<Item = (L, Node)>,
    L: AsRef<str>,
{
    let mut translations = Translations::new();

    for (locale, node) in entries {
        let Some(tag) = LocaleTag::parse(locale.as_ref()) else {
            continue;
        };

        match node {
            Node::Object(map) => translations.entry(tag).or_default().extend(map),
            _ => logger::current()
                .warn(format!("Translations for '{tag}' must be an object. Skipping.")),
        }
    }

    translations
}

/// Builds a [`Translations`] map from a JSON object keyed by locale.
#[must_use]
pub fn translations_from_json(value: Value) -> Translations {
    match Node::from(value) {
        Node::Object(map) => normalize_translations(map),
        _ => {
            logger::current().warn("Translations must be an object keyed by locale.");
            Translations::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn from_json_builds_tagged_tree() {
        let node = Node::from(json!({ "a": { "b": ["x", 1, null] } }));

        let array = node.get("a").and_then(|a| a.get("b")).unwrap();
        assert_that!(
            array,
            eq(&Node::Array(vec![
                Node::from("x"),
                Node::Leaf(json!(1)),
                Node::null(),
            ]))
        );
    }

    #[rstest]
    fn to_json_restores_original_shape() {
        let value = json!({ "list": [{ "a": 1 }, "two", true], "nested": { "k": "v" } });

        assert_that!(Node::from(value.clone()).to_json(), eq(&value));
    }

    #[rstest]
    fn serde_uses_plain_json_representation() {
        let node: Node = serde_json::from_str(r#"{"greeting":"hi"}"#).unwrap();

        assert_that!(node.get("greeting").and_then(Node::as_str), some(eq("hi")));
        assert_that!(serde_json::to_string(&node).unwrap(), eq(r#"{"greeting":"hi"}"#));
    }

    #[rstest]
    fn translations_from_json_normalizes_locales_and_skips_non_objects() {
        let translations = translations_from_json(json!({
            "EN": { "common": { "hello": "Hello" } },
            "zh-Hans": { "common": { "hello": "你好" } },
            "de": "not an object",
        }));

        let mut locales: Vec<_> = translations.keys().map(LocaleTag::as_str).collect();
        locales.sort_unstable();
        assert_eq!(locales, vec!["en", "zh-hans"]);
    }
}
