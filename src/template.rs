use std::rc::Rc;

use serde_json::{Map, Value, json};

use crate::context::Context;
use crate::interface::{Body, BodyFn, Initializer, RuntimeHooks};
use crate::options::Options;
use crate::predicate::{AddMode, Predicate};
use crate::value;

/// A body after aspect composition.
///
/// Literal and callable bodies come straight from registration, the other
/// variants are produced when a template folds its aspect predicates over the
/// body. Nothing here captures the runtime: [`CompiledBody::invoke`] receives
/// it every time.
#[derive(Clone)]
pub enum CompiledBody {
    Literal(Value),
    Call(BodyFn),
    /// A mapping literal that did not expand; each entry is evaluated.
    Object(Vec<(String, CompiledBody)>),
    /// Hands the inner result to [`RuntimeHooks::apply_ctx_wrapped`].
    Wrap(Box<CompiledBody>),
    /// Renders the inner result one position back in the parent list.
    Replace(Box<CompiledBody>),
    /// Re-renders the current node with the inner result merged over the
    /// context.
    Extend(Box<CompiledBody>),
    /// Merges the inner result into what the base mode produced.
    Add {
        mode: AddMode,
        inner: Box<CompiledBody>,
    },
}

impl From<Body> for CompiledBody {
    fn from(body: Body) -> Self {
        match body {
            Body::Value(value) => Self::Literal(value),
            Body::Func(body) => Self::Call(body),
            Body::Map(entries) => Self::Object(
                entries
                    .into_iter()
                    .map(|(key, body)| (key, Self::from(body)))
                    .collect(),
            ),
        }
    }
}

impl CompiledBody {
    /// The literal value, when the body is an undecorated literal.
    pub fn literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Call(_)
            | Self::Object(_)
            | Self::Wrap(_)
            | Self::Replace(_)
            | Self::Extend(_)
            | Self::Add { .. } => None,
        }
    }

    /// Whether at least one aspect decorated this body.
    pub fn is_decorated(&self) -> bool {
        matches!(
            self,
            Self::Wrap(_) | Self::Replace(_) | Self::Extend(_) | Self::Add { .. }
        )
    }

    pub fn invoke(&self, context: &mut Context, hooks: &mut dyn RuntimeHooks) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Call(body) => body(context, hooks),
            Self::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, body)| (key.clone(), body.invoke(context, hooks)))
                    .collect(),
            ),
            Self::Wrap(inner) => {
                let value = inner.invoke(context, hooks);
                hooks.apply_ctx_wrapped(context, value)
            }
            Self::Replace(inner) => {
                let value = inner.invoke(context, hooks);
                let position = i64::try_from(context.position)
                    .unwrap_or(i64::MAX)
                    .saturating_sub(1);
                let overrides = Map::from_iter([("position".to_string(), json!(position))]);
                hooks.apply_ctx(context, value, Some(overrides))
            }
            Self::Extend(inner) => {
                let changes = value::shallow_copy(&inner.invoke(context, hooks));
                let node = context.ctx.clone();
                hooks.apply_ctx(context, node, Some(changes))
            }
            Self::Add { mode, inner } => invoke_add(*mode, inner, context, hooks),
        }
    }
}

fn invoke_add(
    mode: AddMode,
    inner: &CompiledBody,
    context: &mut Context,
    hooks: &mut dyn RuntimeHooks,
) -> Value {
    match mode {
        AddMode::AppendContent => {
            let content = hooks.apply(context, "content");
            let added = inner.invoke(context, hooks);
            Value::Array(vec![content, added])
        }
        AddMode::PrependContent => {
            let added = inner.invoke(context, hooks);
            let content = hooks.apply(context, "content");
            Value::Array(vec![added, content])
        }
        AddMode::Mix => {
            let mut mix = match hooks.apply(context, "mix") {
                Value::Array(items) => items,
                Value::Null => Vec::new(),
                other @ (Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Object(_)) => {
                    vec![other]
                }
            };
            match inner.invoke(context, hooks) {
                Value::Array(items) => mix.extend(items),
                other @ (Value::Null
                | Value::Bool(_)
                | Value::Number(_)
                | Value::String(_)
                | Value::Object(_)) => mix.push(other),
            }
            Value::Array(mix)
        }
        AddMode::Attrs | AddMode::Js | AddMode::Mods | AddMode::ElemMods => {
            let field = mode.base_mode();
            let base = hooks.apply(context, field);
            let base = if value::is_truthy(&base) {
                base
            } else {
                Value::Object(Map::new())
            };
            let added = inner.invoke(context, hooks);
            let merged = value::extend(Some(&base), Some(&added));
            context.set_field(field, merged.clone());
            merged
        }
    }
}

impl std::fmt::Debug for CompiledBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{}", value),
            Self::Call(body) => write!(f, "Call({:p})", Rc::as_ptr(body)),
            Self::Object(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
            Self::Wrap(inner) => f.debug_tuple("Wrap").field(inner).finish(),
            Self::Replace(inner) => f.debug_tuple("Replace").field(inner).finish(),
            Self::Extend(inner) => f.debug_tuple("Extend").field(inner).finish(),
            Self::Add { mode, inner } => f.debug_tuple("Add").field(mode).field(inner).finish(),
        }
    }
}

/// One compiled rule: the predicates guarding it and the body it produces.
#[derive(Debug, Clone)]
pub struct Template {
    predicates: Vec<Predicate>,
    body: CompiledBody,
}

impl Template {
    /// Folds every aspect in `predicates` over `body`, in order, then keeps
    /// only the predicates that still have something to say at dispatch time.
    pub(crate) fn new(mut predicates: Vec<Predicate>, body: Body) -> Self {
        let body = predicates
            .iter()
            .fold(CompiledBody::from(body), |body, predicate| {
                predicate.wrap_body(body)
            });
        predicates.retain(|predicate| !predicate.is_aspect());

        Self { predicates, body }
    }

    /// Filtering predicates and compiler option markers, root to leaf.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn body(&self) -> &CompiledBody {
        &self.body
    }

    /// The mode this template answers, if it narrows one.
    pub fn mode(&self) -> Option<&str> {
        self.predicates.iter().rev().find_map(Predicate::mode_name)
    }

    /// True when every predicate holds for `context`.
    pub fn matches(&self, context: &Context) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(context))
    }

    pub fn compiler_options(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.predicates.iter().filter_map(|predicate| match predicate {
            Predicate::CompilerOptions(options) => Some(options),
            Predicate::PropertyEquals { .. }
            | Predicate::Custom(_)
            | Predicate::Wrap
            | Predicate::Replace
            | Predicate::Extend
            | Predicate::Add(_) => None,
        })
    }
}

/// The result of a build: templates by priority plus the initializers.
#[derive(Clone, Default)]
pub struct Compiled {
    /// Latest registration first.
    pub templates: Vec<Template>,
    pub initializers: Vec<Initializer>,
}

impl Compiled {
    /// First template whose predicates all hold, i.e. the one registered last.
    pub fn first_match(&self, context: &Context) -> Option<&Template> {
        self.templates.iter().find(|template| template.matches(context))
    }

    /// Every compiler option marker merged in registration order, later keys
    /// overriding earlier ones.
    pub fn compiler_options(&self) -> Map<String, Value> {
        let mut merged = Map::new();
        for options in self.templates.iter().rev().flat_map(Template::compiler_options) {
            merged.extend(options.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    /// `base` with the inline compiler options applied.
    pub fn options(&self, base: &Options) -> Options {
        let mut options = base.clone();
        options.apply_overrides(&self.compiler_options());
        options
    }
}

impl std::fmt::Debug for Compiled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiled")
            .field("templates", &self.templates)
            .field("initializers", &self.initializers.len())
            .finish()
    }
}
