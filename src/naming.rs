//! BEM class name formatting.

/// Builds BEM class names from block, element and modifier parts.
///
/// ```
/// use minibem::{ClassBuilder, Naming};
///
/// let builder = ClassBuilder::new(&Naming::default());
/// assert_eq!(builder.build("button", Some("icon")), "button__icon");
/// assert_eq!(builder.block_class("button", Some(("size", "m".into()))), "button_size_m");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassBuilder {
    elem_delim: String,
    mod_name_delim: String,
    mod_val_delim: String,
}

/// A modifier value: a plain flag, a named value, or a modifier switched off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModValue {
    Flag,
    Value(String),
    Off,
}

impl ModValue {
    /// False for `Off` and for an empty value.
    pub fn is_set(&self) -> bool {
        match self {
            Self::Flag => true,
            Self::Value(v) => !v.is_empty(),
            Self::Off => false,
        }
    }
}

impl From<&str> for ModValue {
    fn from(value: &str) -> Self {
        Self::Value(value.to_owned())
    }
}

impl From<bool> for ModValue {
    fn from(value: bool) -> Self {
        if value { Self::Flag } else { Self::Off }
    }
}

impl ClassBuilder {
    pub fn new(naming: &crate::Naming) -> Self {
        Self {
            elem_delim: naming.elem.clone(),
            mod_name_delim: naming.mod_name.clone(),
            mod_val_delim: naming.mod_val.clone(),
        }
    }

    pub fn build(&self, block: &str, elem: Option<&str>) -> String {
        match elem {
            Some(elem) if !elem.is_empty() => format!("{}{}{}", block, self.elem_delim, elem),
            Some(_) | None => block.to_owned(),
        }
    }

    /// Class of a block, with a modifier postfix only when the value is set.
    pub fn block_class(&self, block: &str, modifier: Option<(&str, ModValue)>) -> String {
        match modifier {
            Some((name, value)) if value.is_set() => {
                format!("{}{}", block, self.mod_postfix(name, &value))
            }
            Some(_) | None => block.to_owned(),
        }
    }

    pub fn elem_class(&self, block: &str, elem: &str, name: &str, value: &ModValue) -> String {
        format!(
            "{}{}{}{}",
            block,
            self.elem_delim,
            elem,
            self.mod_postfix(name, value)
        )
    }

    /// Splits `block__elem` into at most two parts.
    pub fn split<'a>(&self, key: &'a str) -> Vec<&'a str> {
        key.splitn(2, self.elem_delim.as_str()).collect()
    }

    fn mod_postfix(&self, name: &str, value: &ModValue) -> String {
        match value {
            ModValue::Flag => format!("{}{}", self.mod_name_delim, name),
            ModValue::Value(v) => {
                format!("{}{}{}{}", self.mod_name_delim, name, self.mod_val_delim, v)
            }
            ModValue::Off => {
                format!("{}{}{}false", self.mod_name_delim, name, self.mod_val_delim)
            }
        }
    }
}
