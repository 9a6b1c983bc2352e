use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::escape;
use crate::naming::ClassBuilder;
use crate::options::Options;
use crate::predicate::KeyPath;
use crate::uniq;
use crate::value;

/// The per-entity state a runtime keeps while rendering, and the receiver of
/// every body.
///
/// Predicates only ever look at it through [`Context::property`].
#[derive(Debug, Clone)]
pub struct Context {
    /// The BEM node currently being rendered.
    pub ctx: Value,
    pub block: String,
    /// Block of the closest enclosing entity, kept until the next one starts.
    pub curr_block: String,
    pub elem: Option<String>,
    pub mods: Map<String, Value>,
    pub elem_mods: Map<String, Value>,
    /// Mode being applied, e.g. `tag` or `content`.
    pub mode: String,
    /// 1-based position of the node in its parent's list.
    pub position: usize,
    pub list_length: usize,
    pub not_new_list: bool,
    pub escape_content: bool,
    fields: Map<String, Value>,
    class_builder: ClassBuilder,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(&Options::default())
    }
}

impl Context {
    pub fn new(options: &Options) -> Self {
        Self {
            ctx: Value::Null,
            block: String::new(),
            curr_block: String::new(),
            elem: None,
            mods: Map::new(),
            elem_mods: Map::new(),
            mode: String::new(),
            position: 0,
            list_length: 0,
            not_new_list: false,
            escape_content: options.escape_content,
            fields: Map::new(),
            class_builder: ClassBuilder::new(&options.naming),
        }
    }

    /// Value found at `key`, if any.
    ///
    /// `block`, `elem`, `_mode` and `position` read the dedicated fields,
    /// `mods`/`elemMods` paths read the modifier maps. Anything else is looked
    /// up among the fields stored with [`Context::set_field`].
    pub fn property(&self, key: &KeyPath) -> Option<Value> {
        match key {
            KeyPath::Field(name) => match name.as_str() {
                "block" => Some(Value::String(self.block.clone())),
                "elem" => self.elem.clone().map(Value::String),
                "_mode" => Some(Value::String(self.mode.clone())),
                "position" => Some(Value::from(self.position)),
                "mods" => Some(Value::Object(self.mods.clone())),
                "elemMods" => Some(Value::Object(self.elem_mods.clone())),
                other => self.fields.get(other).cloned(),
            },
            KeyPath::Path(outer, name) => match outer.as_str() {
                "mods" => self.mods.get(name).cloned(),
                "elemMods" => self.elem_mods.get(name).cloned(),
                other => self.fields.get(other).and_then(|v| v.get(name)).cloned(),
            },
        }
    }

    /// Stores a computed mode result on the context.
    ///
    /// `mods` and `elemMods` replace the modifier maps (non-objects clear
    /// them). Other names go to the free-form field store.
    pub fn set_field(&mut self, name: &str, value: Value) {
        match name {
            "mods" => self.mods = value::shallow_copy(&value),
            "elemMods" => self.elem_mods = value::shallow_copy(&value),
            _ => {
                self.fields.insert(name.to_owned(), value);
            }
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn is_first(&self) -> bool {
        self.position == 1
    }

    pub fn is_last(&self) -> bool {
        self.position == self.list_length
    }

    /// Identifier of the current node, assigned on first use.
    pub fn generate_id(&mut self) -> Option<String> {
        uniq::identify(&mut self.ctx, false)
    }

    pub fn identify(&self, value: &mut Value, only_get: bool) -> Option<String> {
        uniq::identify(value, only_get)
    }

    pub fn is_simple(&self, value: &Value) -> bool {
        value::is_simple(value)
    }

    pub fn is_short_tag(&self, tag: &str) -> bool {
        value::is_short_tag(tag)
    }

    pub fn extend(&self, left: Option<&Value>, right: Option<&Value>) -> Value {
        value::extend(left, right)
    }

    pub fn xml_escape<'v>(&self, value: &'v Value) -> Cow<'v, str> {
        escape_value(value, escape::xml_escape)
    }

    pub fn attr_escape<'v>(&self, value: &'v Value) -> Cow<'v, str> {
        escape_value(value, escape::attr_escape)
    }

    pub fn js_attr_escape<'v>(&self, value: &'v Value) -> Cow<'v, str> {
        escape_value(value, escape::js_attr_escape)
    }

    pub fn class_builder(&self) -> &ClassBuilder {
        &self.class_builder
    }

    /// Reports a failure raised while rendering the current entity.
    pub fn on_error(&self, error: &dyn std::error::Error) {
        tracing::error!(
            block = ?self.ctx.get("block"),
            elem = ?self.ctx.get("elem"),
            mods = ?self.ctx.get("mods"),
            elem_mods = ?self.ctx.get("elemMods"),
            %error,
            "rendering error"
        );
    }
}

fn escape_value<'v>(value: &'v Value, escaper: fn(&str) -> Cow<'_, str>) -> Cow<'v, str> {
    match escape::stringify(value) {
        Cow::Borrowed(s) => escaper(s),
        Cow::Owned(s) => Cow::Owned(escaper(&s).into_owned()),
    }
}
