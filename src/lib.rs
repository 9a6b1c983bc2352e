//! A registration compiler for BEM templates.
//!
//! Templates are declared through chained builder calls on a [`Tree`]. Each
//! chain accumulates predicates and ends with a body; nested scopes inherit
//! the predicates of their parents. [`Tree::finish`] yields a [`Compiled`]
//! list ordered so that the template registered last is tried first.

mod ast;
mod context;
mod error;
mod escape;
mod interface;
mod method;
mod naming;
mod options;
mod predicate;
mod template;
mod tree;
mod uniq;
mod value;

// Public exports.
pub use context::Context;
pub use error::{MinibemError, MinibemResult};
pub use escape::{attr_escape, js_attr_escape, stringify, xml_escape};
pub use interface::{Arg, Body, BodyFn, Initializer, RuntimeHooks};
pub use method::Method;
pub use naming::{ClassBuilder, ModValue};
pub use options::{Naming, Options};
pub use predicate::{AddMode, CustomFn, KeyPath, MatchValue, Predicate};
pub use template::{Compiled, CompiledBody, Template};
pub use tree::{Chain, Tree};
pub use uniq::{Uniq, get_uniq, identify};
pub use value::{extend, is_obj, is_short_tag, is_simple, is_truthy, is_unquoted_attr};

/// Compiles the templates `definitions` registers on a fresh [`Tree`].
///
/// ```
/// use minibem::compile;
///
/// let compiled = compile(|t| {
///     t.block("page").tag().body("body")?;
///     t.block("page").elem("title").tag().body("h1")
/// })
/// .unwrap();
/// assert_eq!(compiled.templates[0].mode(), Some("tag"));
/// ```
pub fn compile<F>(definitions: F) -> MinibemResult<Compiled>
where
    F: FnOnce(&mut Tree) -> MinibemResult<()>,
{
    Tree::new().build(definitions)
}
