use std::rc::Rc;

use serde_json::{Map, Value};

use crate::context::Context;
use crate::escape::stringify;
use crate::template::CompiledBody;
use crate::value::is_truthy;

/// A caller supplied test over the rendering context.
pub type CustomFn = Rc<dyn Fn(&Context) -> bool>;

/// Where a [`Predicate::PropertyEquals`] looks in the context.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPath {
    /// A top level field such as `block`, `elem` or `_mode`.
    Field(String),
    /// A field nested one level down, such as `mods.size`.
    Path(String, String),
}

impl KeyPath {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn path(outer: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Path(outer.into(), name.into())
    }

    pub fn mods(name: impl Into<String>) -> Self {
        Self::path("mods", name)
    }

    pub fn elem_mods(name: impl Into<String>) -> Self {
        Self::path("elemMods", name)
    }

    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            Self::Path(..) => None,
        }
    }

    /// True for `mods.*` and `elemMods.*` paths.
    pub fn is_mods_path(&self) -> bool {
        matches!(self, Self::Path(outer, _) if outer == "mods" || outer == "elemMods")
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{}", name),
            Self::Path(outer, name) => write!(f, "{}.{}", outer, name),
        }
    }
}

/// The right hand side of a property match.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchValue {
    /// Matches any truthy value.
    Present,
    /// Matches a value whose string form is exactly this.
    Exact(String),
}

impl MatchValue {
    /// Builds an exact match from a dynamic argument, using the value's string
    /// form. `null` matches the text `null`; only a missing argument means
    /// presence.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Exact("null".to_owned()),
            Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)
            | Value::Array(_)
            | Value::Object(_) => Self::Exact(stringify(value).into_owned()),
        }
    }

    pub fn matches(&self, found: Option<&Value>) -> bool {
        match self {
            Self::Present => found.is_some_and(is_truthy),
            Self::Exact(expected) => found.is_some_and(|v| stringify(v) == expected.as_str()),
        }
    }
}

impl From<&str> for MatchValue {
    fn from(value: &str) -> Self {
        Self::Exact(value.to_owned())
    }
}

impl From<String> for MatchValue {
    fn from(value: String) -> Self {
        Self::Exact(value)
    }
}

impl From<bool> for MatchValue {
    fn from(value: bool) -> Self {
        Self::Exact(value.to_string())
    }
}

impl From<i64> for MatchValue {
    fn from(value: i64) -> Self {
        Self::Exact(value.to_string())
    }
}

impl<T: Into<MatchValue>> From<Option<T>> for MatchValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Present, Into::into)
    }
}

/// Additive aspects: they merge a body into what another mode produced.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddMode {
    AppendContent,
    PrependContent,
    Attrs,
    Js,
    Mix,
    Mods,
    ElemMods,
}

impl AddMode {
    /// The mode this aspect is registered under and extends.
    pub fn base_mode(self) -> &'static str {
        match self {
            Self::AppendContent | Self::PrependContent => "content",
            Self::Attrs => "attrs",
            Self::Js => "js",
            Self::Mix => "mix",
            Self::Mods => "mods",
            Self::ElemMods => "elemMods",
        }
    }
}

/// A condition guarding a template, or an aspect decorating its body.
#[derive(Clone)]
pub enum Predicate {
    PropertyEquals { key: KeyPath, value: MatchValue },
    Custom(CustomFn),
    /// Inline compile time configuration. Never matches.
    CompilerOptions(Map<String, Value>),
    Wrap,
    Replace,
    Extend,
    Add(AddMode),
}

impl Predicate {
    pub fn property(key: KeyPath, value: impl Into<MatchValue>) -> Self {
        Self::PropertyEquals {
            key,
            value: value.into(),
        }
    }

    pub fn block(name: impl Into<String>) -> Self {
        Self::property(KeyPath::field("block"), MatchValue::Exact(name.into()))
    }

    pub fn elem(name: impl Into<String>) -> Self {
        Self::property(KeyPath::field("elem"), MatchValue::Exact(name.into()))
    }

    pub fn mode(name: impl Into<String>) -> Self {
        Self::property(KeyPath::field("_mode"), MatchValue::Exact(name.into()))
    }

    pub fn r#mod(name: impl Into<String>, value: impl Into<MatchValue>) -> Self {
        Self::property(KeyPath::mods(name), value)
    }

    pub fn elem_mod(name: impl Into<String>, value: impl Into<MatchValue>) -> Self {
        Self::property(KeyPath::elem_mods(name), value)
    }

    pub fn custom<F>(test: F) -> Self
    where
        F: Fn(&Context) -> bool + 'static,
    {
        Self::Custom(Rc::new(test))
    }

    /// Aspects transform the body they decorate instead of filtering.
    pub fn is_aspect(&self) -> bool {
        matches!(self, Self::Wrap | Self::Replace | Self::Extend | Self::Add(_))
    }

    /// Mode name for `_mode` matches.
    pub fn mode_name(&self) -> Option<&str> {
        match self {
            Self::PropertyEquals {
                key,
                value: MatchValue::Exact(mode),
            } if key.as_field() == Some("_mode") => Some(mode),
            Self::PropertyEquals { .. }
            | Self::Custom(_)
            | Self::CompilerOptions(_)
            | Self::Wrap
            | Self::Replace
            | Self::Extend
            | Self::Add(_) => None,
        }
    }

    /// Whether mapping bodies under this predicate may expand into per-mode
    /// templates.
    ///
    /// Custom predicates always pass, whatever they test.
    pub(crate) fn allows_shortcut(&self) -> bool {
        match self {
            Self::PropertyEquals { key, .. } => {
                matches!(key.as_field(), Some("block" | "elem")) || key.is_mods_path()
            }
            Self::Custom(_) => true,
            Self::CompilerOptions(_)
            | Self::Wrap
            | Self::Replace
            | Self::Extend
            | Self::Add(_) => false,
        }
    }

    /// Evaluates the predicate against a live context.
    pub fn matches(&self, context: &Context) -> bool {
        match self {
            Self::PropertyEquals { key, value } => value.matches(context.property(key).as_ref()),
            Self::Custom(test) => test(context),
            Self::CompilerOptions(_) => false,
            Self::Wrap | Self::Replace | Self::Extend | Self::Add(_) => true,
        }
    }

    /// Decorates `body` when this is an aspect, returns it untouched otherwise.
    pub(crate) fn wrap_body(&self, body: CompiledBody) -> CompiledBody {
        match self {
            Self::Wrap => CompiledBody::Wrap(Box::new(body)),
            Self::Replace => CompiledBody::Replace(Box::new(body)),
            Self::Extend => CompiledBody::Extend(Box::new(body)),
            Self::Add(mode) => CompiledBody::Add {
                mode: *mode,
                inner: Box::new(body),
            },
            Self::PropertyEquals { .. } | Self::Custom(_) | Self::CompilerOptions(_) => body,
        }
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PropertyEquals { key, value } => match value {
                MatchValue::Present => write!(f, "{}", key),
                MatchValue::Exact(v) => write!(f, "{} == {:?}", key, v),
            },
            Self::Custom(test) => write!(f, "Custom({:p})", Rc::as_ptr(test)),
            Self::CompilerOptions(options) => f.debug_tuple("CompilerOptions").field(options).finish(),
            Self::Wrap => write!(f, "Wrap"),
            Self::Replace => write!(f, "Replace"),
            Self::Extend => write!(f, "Extend"),
            Self::Add(mode) => f.debug_tuple("Add").field(mode).finish(),
        }
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::PropertyEquals { key, value },
                Self::PropertyEquals {
                    key: other_key,
                    value: other_value,
                },
            ) => key == other_key && value == other_value,
            (Self::Custom(a), Self::Custom(b)) => Rc::ptr_eq(a, b),
            (Self::CompilerOptions(a), Self::CompilerOptions(b)) => a == b,
            (Self::Add(a), Self::Add(b)) => a == b,
            (Self::Wrap, Self::Wrap) | (Self::Replace, Self::Replace) | (Self::Extend, Self::Extend) => {
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn button_context() -> Context {
        let mut context = Context::default();
        context.block = "button".to_string();
        context.mode = "tag".to_string();
        context.mods.insert("size".to_string(), json!("m"));
        context.mods.insert("disabled".to_string(), json!(true));
        context.mods.insert("hidden".to_string(), json!(""));
        context
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_property_matches() {
        let context = button_context();
        assert!(Predicate::block("button").matches(&context));
        assert!(!Predicate::block("link").matches(&context));
        assert!(!Predicate::elem("icon").matches(&context));
        assert!(Predicate::mode("tag").matches(&context));
        assert!(Predicate::r#mod("size", "m").matches(&context));
        assert!(!Predicate::r#mod("size", "l").matches(&context));
        assert!(Predicate::r#mod("disabled", true).matches(&context));
        assert!(Predicate::r#mod("disabled", MatchValue::Present).matches(&context));
        assert!(!Predicate::r#mod("hidden", MatchValue::Present).matches(&context));
        assert!(!Predicate::r#mod("theme", None::<&str>).matches(&context));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_non_filtering_predicates() {
        let context = button_context();
        assert!(!Predicate::CompilerOptions(Map::new()).matches(&context));
        assert!(Predicate::Wrap.matches(&context));
        assert!(Predicate::Add(AddMode::Mix).matches(&context));
        assert!(Predicate::custom(|ctx| ctx.block == "button").matches(&context));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_shortcut_eligibility() {
        assert!(Predicate::block("b").allows_shortcut());
        assert!(Predicate::elem("e").allows_shortcut());
        assert!(Predicate::r#mod("m", "v").allows_shortcut());
        assert!(Predicate::elem_mod("m", "v").allows_shortcut());
        assert!(Predicate::custom(|_| false).allows_shortcut());
        assert!(!Predicate::mode("tag").allows_shortcut());
        assert!(!Predicate::property(KeyPath::path("attrs", "x"), "y").allows_shortcut());
        assert!(!Predicate::Wrap.allows_shortcut());
        assert!(!Predicate::CompilerOptions(Map::new()).allows_shortcut());
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_match_value_from_dynamic() {
        assert_eq!(
            MatchValue::from_value(&json!(null)),
            MatchValue::Exact("null".to_string())
        );
        assert_eq!(
            MatchValue::from_value(&json!(true)),
            MatchValue::Exact("true".to_string())
        );
        assert_eq!(MatchValue::from_value(&json!(3)), MatchValue::Exact("3".to_string()));
        assert_eq!(MatchValue::from_value(&json!("x")), MatchValue::Exact("x".to_string()));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_custom_equality_is_identity() {
        let a = Predicate::custom(|_| true);
        let b = Predicate::custom(|_| true);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(Predicate::mode("tag").mode_name(), Some("tag"));
        assert_eq!(Predicate::block("b").mode_name(), None);
    }
}
