use serde_json::{Map, Value};

/// Delimiters used to build BEM class names.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Naming {
    /// Separator between block and element, `__` by default.
    pub elem: String,
    /// Separator before a modifier name, `_` by default.
    pub mod_name: String,
    /// Separator between a modifier name and its value, `_` by default.
    pub mod_val: String,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            elem: "__".to_string(),
            mod_name: "_".to_string(),
            mod_val: "_".to_string(),
        }
    }
}

/// Configuration shared by the compiler output and the rendering context.
///
/// Template sources may override it inline through compiler option markers,
/// see [`crate::Compiled::options`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Options {
    /// Whether content is escaped by default when rendered.
    pub escape_content: bool,
    pub naming: Naming,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            escape_content: true,
            naming: Naming::default(),
        }
    }
}

impl Options {
    /// Applies the keys a compiler option marker understands.
    ///
    /// `escapeContent` takes a boolean. `elem` takes a string. `mod` takes
    /// either a string used for both modifier delimiters or an object with
    /// `name` and `val`. Unknown keys are left for the runtime.
    pub fn apply_overrides(&mut self, overrides: &Map<String, Value>) {
        if let Some(escape) = overrides.get("escapeContent").and_then(Value::as_bool) {
            self.escape_content = escape;
        }

        let Some(naming) = overrides.get("naming").and_then(Value::as_object) else {
            return;
        };
        if let Some(elem) = naming.get("elem").and_then(Value::as_str) {
            self.naming.elem = elem.to_owned();
        }
        match naming.get("mod") {
            Some(Value::String(delim)) => {
                self.naming.mod_name = delim.clone();
                self.naming.mod_val = delim.clone();
            }
            Some(Value::Object(delims)) => {
                if let Some(name) = delims.get("name").and_then(Value::as_str) {
                    self.naming.mod_name = name.to_owned();
                }
                if let Some(val) = delims.get("val").and_then(Value::as_str) {
                    self.naming.mod_val = val.to_owned();
                }
            }
            Some(Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_)) | None => {}
        }
    }
}
