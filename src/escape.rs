//! HTML escaping.
//!
//! Each escaper returns the input borrowed when it contains nothing to escape,
//! and only allocates otherwise.

use std::borrow::Cow;

use serde_json::Value;

/// Escapes `&`, `<` and `>` for text content.
pub fn xml_escape(input: &str) -> Cow<'_, str> {
    escape_with(input, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

/// Escapes `"`, `&`, `<` and `>` for double quoted attribute values.
pub fn attr_escape(input: &str) -> Cow<'_, str> {
    escape_with(input, |c| match c {
        '"' => Some("&quot;"),
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

/// Escapes `'` and `&` for single quoted attributes holding JSON.
pub fn js_attr_escape(input: &str) -> Cow<'_, str> {
    escape_with(input, |c| match c {
        '&' => Some("&amp;"),
        '\'' => Some("&#39;"),
        _ => None,
    })
}

fn escape_with<F>(input: &str, replacement: F) -> Cow<'_, str>
where
    F: Fn(char) -> Option<&'static str>,
{
    let Some(first) = input.find(|c| replacement(c).is_some()) else {
        return Cow::Borrowed(input);
    };

    let (head, tail) = input.split_at(first);
    let mut output = String::with_capacity(input.len().saturating_add(8));
    output.push_str(head);
    for c in tail.chars() {
        match replacement(c) {
            Some(entity) => output.push_str(entity),
            None => output.push(c),
        }
    }
    Cow::Owned(output)
}

/// String form of a value as the escapers see it.
///
/// `null` becomes the empty string, strings are taken verbatim, arrays are
/// joined with commas and objects collapse to `[object Object]`.
pub fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| stringify(item).into_owned())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Borrowed("[object Object]"),
    }
}
