//! The table of builder methods.
//!
//! Every builder call, typed or dispatched by name, resolves to a [`Method`]
//! and the predicates it contributes to its scope.

use std::str::FromStr;

use serde_json::Value;

use crate::error::{MinibemError, MinibemResult};
use crate::interface::Arg;
use crate::predicate::{AddMode, MatchValue, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Match,
    Block,
    Elem,
    Mod,
    ElemMod,
    XjstOptions,
    Wrap,
    Replace,
    Extend,
    Mode,
    Def,
    Content,
    AppendContent,
    PrependContent,
    Attrs,
    AddAttrs,
    Js,
    AddJs,
    Mix,
    AddMix,
    Mods,
    AddMods,
    ElemMods,
    AddElemMods,
    Tag,
    Cls,
    Bem,
}

impl Method {
    pub const ALL: [Method; 27] = [
        Self::Match,
        Self::Block,
        Self::Elem,
        Self::Mod,
        Self::ElemMod,
        Self::XjstOptions,
        Self::Wrap,
        Self::Replace,
        Self::Extend,
        Self::Mode,
        Self::Def,
        Self::Content,
        Self::AppendContent,
        Self::PrependContent,
        Self::Attrs,
        Self::AddAttrs,
        Self::Js,
        Self::AddJs,
        Self::Mix,
        Self::AddMix,
        Self::Mods,
        Self::AddMods,
        Self::ElemMods,
        Self::AddElemMods,
        Self::Tag,
        Self::Cls,
        Self::Bem,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Block => "block",
            Self::Elem => "elem",
            Self::Mod => "mod",
            Self::ElemMod => "elemMod",
            Self::XjstOptions => "xjstOptions",
            Self::Wrap => "wrap",
            Self::Replace => "replace",
            Self::Extend => "extend",
            Self::Mode => "mode",
            Self::Def => "def",
            Self::Content => "content",
            Self::AppendContent => "appendContent",
            Self::PrependContent => "prependContent",
            Self::Attrs => "attrs",
            Self::AddAttrs => "addAttrs",
            Self::Js => "js",
            Self::AddJs => "addJs",
            Self::Mix => "mix",
            Self::AddMix => "addMix",
            Self::Mods => "mods",
            Self::AddMods => "addMods",
            Self::ElemMods => "elemMods",
            Self::AddElemMods => "addElemMods",
            Self::Tag => "tag",
            Self::Cls => "cls",
            Self::Bem => "bem",
        }
    }

    /// The additive aspect a method attaches, if any.
    pub const fn add_mode(self) -> Option<AddMode> {
        match self {
            Self::AppendContent => Some(AddMode::AppendContent),
            Self::PrependContent => Some(AddMode::PrependContent),
            Self::AddAttrs => Some(AddMode::Attrs),
            Self::AddJs => Some(AddMode::Js),
            Self::AddMix => Some(AddMode::Mix),
            Self::AddMods => Some(AddMode::Mods),
            Self::AddElemMods => Some(AddMode::ElemMods),
            Self::Match
            | Self::Block
            | Self::Elem
            | Self::Mod
            | Self::ElemMod
            | Self::XjstOptions
            | Self::Wrap
            | Self::Replace
            | Self::Extend
            | Self::Mode
            | Self::Def
            | Self::Content
            | Self::Attrs
            | Self::Js
            | Self::Mix
            | Self::Mods
            | Self::ElemMods
            | Self::Tag
            | Self::Cls
            | Self::Bem => None,
        }
    }

    /// Predicates of the methods that take no arguments, `None` for the others.
    pub fn fixed_conditions(self) -> Option<Vec<Predicate>> {
        let conditions = match self {
            Self::Wrap => vec![Predicate::mode("default"), Predicate::Wrap],
            Self::Replace => vec![Predicate::mode("default"), Predicate::Replace],
            Self::Extend => vec![Predicate::mode("default"), Predicate::Extend],
            Self::Def => vec![Predicate::mode("default")],
            Self::Content
            | Self::Attrs
            | Self::Js
            | Self::Mix
            | Self::Mods
            | Self::ElemMods
            | Self::Tag
            | Self::Cls
            | Self::Bem => vec![Predicate::mode(self.name())],
            Self::AppendContent
            | Self::PrependContent
            | Self::AddAttrs
            | Self::AddJs
            | Self::AddMix
            | Self::AddMods
            | Self::AddElemMods => {
                let add = self.add_mode()?;
                vec![Predicate::mode(add.base_mode()), Predicate::Add(add)]
            }
            Self::Match
            | Self::Block
            | Self::Elem
            | Self::Mod
            | Self::ElemMod
            | Self::XjstOptions
            | Self::Mode => return None,
        };
        Some(conditions)
    }

    /// Validates `args` and returns the predicates the call contributes.
    ///
    /// `match` stores its predicates last argument first.
    pub fn conditions(self, args: Vec<Arg>) -> MinibemResult<Vec<Predicate>> {
        match self {
            Self::Match => {
                if args.is_empty() {
                    return Err(MinibemError::MissingPredicate);
                }
                args.into_iter().rev().map(Arg::into_predicate).collect()
            }
            Self::Block => Ok(vec![Predicate::block(self.name_arg(args)?)]),
            Self::Elem => Ok(vec![Predicate::elem(self.name_arg(args)?)]),
            Self::Mode => Ok(vec![Predicate::mode(self.name_arg(args)?)]),
            Self::Mod => {
                let (name, value) = self.mod_args(args)?;
                Ok(vec![Predicate::r#mod(name, value)])
            }
            Self::ElemMod => {
                let (name, value) = self.mod_args(args)?;
                Ok(vec![Predicate::elem_mod(name, value)])
            }
            Self::XjstOptions => match self.exact_args::<1>(args)? {
                [Arg::Value(Value::Object(options))] => Ok(vec![Predicate::CompilerOptions(options)]),
                [other] => Err(MinibemError::invalid_argument(
                    self.name(),
                    format!("expected an options object, got {:?}", other),
                )),
            },
            Self::Wrap
            | Self::Replace
            | Self::Extend
            | Self::Def
            | Self::Content
            | Self::AppendContent
            | Self::PrependContent
            | Self::Attrs
            | Self::AddAttrs
            | Self::Js
            | Self::AddJs
            | Self::Mix
            | Self::AddMix
            | Self::Mods
            | Self::AddMods
            | Self::ElemMods
            | Self::AddElemMods
            | Self::Tag
            | Self::Cls
            | Self::Bem => {
                if !args.is_empty() {
                    return Err(MinibemError::UnexpectedArguments {
                        method: self.name().to_string(),
                        arguments: describe(&args),
                    });
                }
                Ok(self.fixed_conditions().unwrap_or_default())
            }
        }
    }

    fn exact_args<const N: usize>(self, args: Vec<Arg>) -> MinibemResult<[Arg; N]> {
        let found = args.len();
        args.try_into().map_err(|_| {
            MinibemError::invalid_argument(
                self.name(),
                format!("expected {} argument(s), got {}", N, found),
            )
        })
    }

    fn name_arg(self, args: Vec<Arg>) -> MinibemResult<String> {
        let [name] = self.exact_args::<1>(args)?;
        self.string_arg(name)
    }

    /// A modifier name plus an optional value. A missing value matches any
    /// truthy modifier; a `null` one matches the text `null`.
    fn mod_args(self, args: Vec<Arg>) -> MinibemResult<(String, MatchValue)> {
        let mut args = args.into_iter();
        let (Some(name), value, None) = (args.next(), args.next(), args.next()) else {
            return Err(MinibemError::invalid_argument(
                self.name(),
                "expected a name and an optional value",
            ));
        };
        let name = self.string_arg(name)?;
        let value = match value {
            None => MatchValue::Present,
            Some(Arg::Value(value)) => MatchValue::from_value(&value),
            Some(other @ (Arg::Predicate(_) | Arg::Custom(_))) => {
                return Err(MinibemError::invalid_argument(
                    self.name(),
                    format!("modifier value must be a plain value, got {:?}", other),
                ));
            }
        };
        Ok((name, value))
    }

    fn string_arg(self, arg: Arg) -> MinibemResult<String> {
        match arg {
            Arg::Value(Value::String(s)) => Ok(s),
            other @ (Arg::Value(_) | Arg::Predicate(_) | Arg::Custom(_)) => {
                Err(MinibemError::invalid_argument(
                    self.name(),
                    format!("expected a string, got {:?}", other),
                ))
            }
        }
    }

    /// Predicates synthesized for one key of an expanded shortcut mapping.
    ///
    /// Aspect keys get the bare aspect, additive keys their base mode plus the
    /// aspect, `def` the default mode, and any other key the mode of that name.
    pub(crate) fn shortcut_conditions(key: &str) -> Vec<Predicate> {
        let Ok(method) = key.parse::<Self>() else {
            return vec![Predicate::mode(key)];
        };
        match method {
            Self::Wrap => vec![Predicate::Wrap],
            Self::Replace => vec![Predicate::Replace],
            Self::Extend => vec![Predicate::Extend],
            Self::Def => vec![Predicate::mode("default")],
            Self::AppendContent
            | Self::PrependContent
            | Self::AddAttrs
            | Self::AddJs
            | Self::AddMix
            | Self::AddMods
            | Self::AddElemMods => method.fixed_conditions().unwrap_or_default(),
            Self::Match
            | Self::Block
            | Self::Elem
            | Self::Mod
            | Self::ElemMod
            | Self::XjstOptions
            | Self::Mode
            | Self::Content
            | Self::Attrs
            | Self::Js
            | Self::Mix
            | Self::Mods
            | Self::ElemMods
            | Self::Tag
            | Self::Cls
            | Self::Bem => vec![Predicate::mode(key)],
        }
    }
}

fn describe(args: &[Arg]) -> String {
    let parts: Vec<String> = args.iter().map(|arg| format!("{:?}", arg)).collect();
    format!("[{}]", parts.join(","))
}

impl FromStr for Method {
    type Err = MinibemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.name() == s)
            .ok_or_else(|| MinibemError::UnknownMethod { name: s.to_owned() })
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
