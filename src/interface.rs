use std::rc::Rc;

use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::{MinibemError, MinibemResult};
use crate::predicate::{CustomFn, Predicate};

/// A body callable. It receives the context it renders and the runtime hooks,
/// so it can apply other modes itself.
pub type BodyFn = Rc<dyn Fn(&mut Context, &mut dyn RuntimeHooks) -> Value>;

/// Callback recorded with `oninit`, handed to the runtime untouched.
pub type Initializer = Rc<dyn Fn(&mut dyn RuntimeHooks)>;

/// The two re-entry points a runtime exposes to compiled bodies.
///
/// Aspects never capture these: the runtime passes itself in whenever it
/// invokes a [`crate::CompiledBody`].
pub trait RuntimeHooks {
    /// Applies `mode` to the entity `context` describes and returns the result.
    fn apply(&mut self, context: &mut Context, mode: &str) -> Value;

    /// Renders `value` in place of the current entity, with `overrides` merged
    /// over the context first.
    fn apply_ctx(
        &mut self,
        context: &mut Context,
        value: Value,
        overrides: Option<Map<String, Value>>,
    ) -> Value;

    /// Re-entry used by wrapping templates. Runtimes that guard against a
    /// wrapper matching its own output override this.
    fn apply_ctx_wrapped(&mut self, context: &mut Context, value: Value) -> Value {
        self.apply_ctx(context, value, None)
    }
}

/// What a template produces: a literal, a callable, or a mapping of either.
///
/// A mapping registered under a block/elem/mods scope is shortcut sugar: each
/// key becomes its own mode template.
#[derive(Clone)]
pub enum Body {
    Value(Value),
    Func(BodyFn),
    Map(Vec<(String, Body)>),
}

impl Body {
    pub fn func<F>(body: F) -> Self
    where
        F: Fn(&mut Context, &mut dyn RuntimeHooks) -> Value + 'static,
    {
        Self::Func(Rc::new(body))
    }

    pub fn map<K, B, I>(entries: I) -> Self
    where
        K: Into<String>,
        B: Into<Body>,
        I: IntoIterator<Item = (K, B)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, body)| (key.into(), body.into()))
                .collect(),
        )
    }

    /// Splits a mapping body into its entries, in key order. Anything else,
    /// arrays included, is handed back unchanged.
    pub(crate) fn into_entries(self) -> Result<Vec<(String, Body)>, Self> {
        match self {
            Self::Map(entries) => Ok(entries),
            Self::Value(Value::Object(map)) => Ok(map
                .into_iter()
                .map(|(key, value)| (key, Self::Value(value)))
                .collect()),
            Self::Value(value) => Err(Self::Value(value)),
            Self::Func(body) => Err(Self::Func(body)),
        }
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{}", value),
            Self::Func(body) => write!(f, "Func({:p})", Rc::as_ptr(body)),
            Self::Map(entries) => f.debug_map().entries(entries.iter().map(|(k, v)| (k, v))).finish(),
        }
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_owned()))
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<bool> for Body {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

impl From<i64> for Body {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<BodyFn> for Body {
    fn from(body: BodyFn) -> Self {
        Self::Func(body)
    }
}

/// A dynamic builder argument, as taken by `match` and by method dispatch.
#[derive(Clone)]
pub enum Arg {
    Predicate(Predicate),
    Custom(CustomFn),
    Value(Value),
}

impl Arg {
    pub fn custom<F>(test: F) -> Self
    where
        F: Fn(&Context) -> bool + 'static,
    {
        Self::Custom(Rc::new(test))
    }

    /// Coerces a `match` argument: callables become custom predicates, plain
    /// values are rejected.
    pub(crate) fn into_predicate(self) -> MinibemResult<Predicate> {
        match self {
            Self::Predicate(predicate) => Ok(predicate),
            Self::Custom(test) => Ok(Predicate::Custom(test)),
            Self::Value(value) => Err(MinibemError::InvalidPredicate {
                argument: value.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Predicate(predicate) => write!(f, "{:?}", predicate),
            Self::Custom(test) => write!(f, "Custom({:p})", Rc::as_ptr(test)),
            Self::Value(value) => write!(f, "{}", value),
        }
    }
}

impl From<Predicate> for Arg {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }
}

impl From<CustomFn> for Arg {
    fn from(test: CustomFn) -> Self {
        Self::Custom(test)
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_owned()))
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}
