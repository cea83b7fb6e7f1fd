//! Message parsers.
//!
//! Interpolation syntax is not built into the resolver; it hands the resolved
//! text to a [`Parser`]. [`BasicParser`] covers `{0}` positional and `{name}`
//! named placeholders.

use std::fmt;
use std::sync::LazyLock;

use regex::{
    Captures,
    Regex,
};
use serde_json::Value;

use crate::locale::LocaleTag;
use crate::node::Node;

/// Turns resolved translation text into output.
pub trait Parser: Send + Sync + fmt::Debug {
    /// `text` is `None` when no locale has the key.
    fn parse(&self, text: Option<&Node>, params: &[Value], locale: &LocaleTag, key: &str) -> String;
}

/// `{0}` / `{name}` placeholder.
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\s*([A-Za-z0-9_]+)\s*\}").expect("placeholder regex should compile")
});

/// Placeholder parser.
///
/// Digits index the positional parameters; names are looked up in the first
/// object parameter. Unknown placeholders are left untouched. Missing text
/// echoes the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicParser;

impl Parser for BasicParser {
    fn parse(&self, text: Option<&Node>, params: &[Value], _locale: &LocaleTag, key: &str) -> String {
        let template = match text {
            Some(Node::Leaf(Value::String(text))) => text.as_str(),
            Some(Node::Leaf(Value::Null)) | None => return key.to_string(),
            Some(other) => return other.to_json().to_string(),
        };

        let named = params.iter().find_map(Value::as_object);

        PLACEHOLDER
            .replace_all(template, |captures: &Captures<'_>| {
                let whole = captures.get(0).map_or("", |m| m.as_str());
                let name = captures.get(1).map_or("", |m| m.as_str());
                let value = name.parse::<usize>().map_or_else(
                    |_| named.and_then(|object| object.get(name)),
                    |index| params.get(index),
                );
                value.map_or_else(|| whole.to_string(), render)
            })
            .into_owned()
    }
}

/// Renders a parameter; strings are inserted without quotes.
fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
