//! Helpers over the JSON value model shared by bodies and contexts.

use serde_json::{Map, Value};

/// Tags that are rendered without a closing tag.
const SHORT_TAGS: [&str; 15] = [
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "wbr",
];

/// Truthiness of a value: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Returns true for a mapping that is not an array.
pub fn is_obj(value: &Value) -> bool {
    value.is_object()
}

/// A value is simple when it is a primitive, or a plain (non BEM) object whose
/// `html` field is itself simple.
pub fn is_simple(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => true,
        Value::Array(_) => false,
        Value::Object(map) => {
            let is_bem_node = ["block", "elem", "tag", "cls", "attrs"]
                .iter()
                .any(|key| map.get(*key).is_some_and(is_truthy));
            !is_bem_node && map.get("html").is_some_and(is_simple)
        }
    }
}

/// Shallow merge of two values.
///
/// When both sides are objects the result holds the keys of `left` overridden
/// by those of `right`. Otherwise the first truthy side wins.
pub fn extend(left: Option<&Value>, right: Option<&Value>) -> Value {
    match (left, right) {
        (Some(Value::Object(l)), Some(Value::Object(r))) => {
            let mut merged = l.clone();
            merged.extend(r.iter().map(|(k, v)| (k.clone(), v.clone())));
            Value::Object(merged)
        }
        (Some(l), _) if is_truthy(l) => l.clone(),
        (_, Some(r)) => r.clone(),
        (Some(l), None) => l.clone(),
        (None, None) => Value::Null,
    }
}

/// Copies the keys of `value` into a fresh map, or returns an empty map for
/// anything that is not an object.
pub(crate) fn shallow_copy(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
            Map::new()
        }
    }
}

pub fn is_short_tag(tag: &str) -> bool {
    SHORT_TAGS.contains(&tag)
}

/// Attribute values made only of `[:\w.-]` can be written without quotes.
pub fn is_unquoted_attr(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '.' | '-'))
}
