use serde_json::{Map, Value};

use crate::ast::{Child, Item};
use crate::error::{MinibemError, MinibemResult};
use crate::interface::{Arg, Body, Initializer, RuntimeHooks};
use crate::method::Method;
use crate::predicate::{MatchValue, Predicate};
use crate::template::{Compiled, Template};

/// Builder methods shared by [`Tree`] (which opens a new scope per call) and
/// [`Chain`] (which narrows the scope it already holds).
macro_rules! scope_methods {
    ($out:ty) => {
        /// Dispatches a builder method by name, validating its arguments.
        pub fn call(&mut self, name: &str, args: Vec<Arg>) -> MinibemResult<$out> {
            let method: Method = name.parse()?;
            self.invoke(method, args)
        }

        pub fn invoke(&mut self, method: Method, args: Vec<Arg>) -> MinibemResult<$out> {
            let conditions = method.conditions(args)?;
            Ok(self.scope(conditions))
        }

        /// Matches on arbitrary predicates. Callables become custom predicates.
        ///
        /// # Errors
        ///
        /// - `MissingPredicate` when `args` is empty.
        /// - `InvalidPredicate` when an argument is a plain value.
        pub fn r#match<I, A>(&mut self, args: I) -> MinibemResult<$out>
        where
            I: IntoIterator<Item = A>,
            A: Into<Arg>,
        {
            let args = args.into_iter().map(Into::into).collect();
            self.invoke(Method::Match, args)
        }

        pub fn block(&mut self, name: impl Into<String>) -> $out {
            self.scope(vec![Predicate::block(name)])
        }

        pub fn elem(&mut self, name: impl Into<String>) -> $out {
            self.scope(vec![Predicate::elem(name)])
        }

        /// Matches a block modifier. Pass [`MatchValue::Present`] to accept any
        /// truthy value.
        pub fn r#mod(&mut self, name: impl Into<String>, value: impl Into<MatchValue>) -> $out {
            self.scope(vec![Predicate::r#mod(name, value)])
        }

        pub fn elem_mod(&mut self, name: impl Into<String>, value: impl Into<MatchValue>) -> $out {
            self.scope(vec![Predicate::elem_mod(name, value)])
        }

        pub fn mode(&mut self, name: impl Into<String>) -> $out {
            self.scope(vec![Predicate::mode(name)])
        }

        /// Inline compiler options, kept in place among the predicates.
        pub fn xjst_options(&mut self, options: Map<String, Value>) -> $out {
            self.scope(vec![Predicate::CompilerOptions(options)])
        }

        pub fn def(&mut self) -> $out {
            self.fixed(Method::Def)
        }

        pub fn content(&mut self) -> $out {
            self.fixed(Method::Content)
        }

        pub fn attrs(&mut self) -> $out {
            self.fixed(Method::Attrs)
        }

        pub fn js(&mut self) -> $out {
            self.fixed(Method::Js)
        }

        pub fn mix(&mut self) -> $out {
            self.fixed(Method::Mix)
        }

        pub fn mods(&mut self) -> $out {
            self.fixed(Method::Mods)
        }

        pub fn elem_mods(&mut self) -> $out {
            self.fixed(Method::ElemMods)
        }

        pub fn tag(&mut self) -> $out {
            self.fixed(Method::Tag)
        }

        pub fn cls(&mut self) -> $out {
            self.fixed(Method::Cls)
        }

        pub fn bem(&mut self) -> $out {
            self.fixed(Method::Bem)
        }

        /// Default mode whose result is rendered again through the runtime.
        pub fn wrap(&mut self) -> $out {
            self.fixed(Method::Wrap)
        }

        /// Default mode whose result takes the place of the current entity.
        pub fn replace(&mut self) -> $out {
            self.fixed(Method::Replace)
        }

        /// Default mode whose result is merged over the current context.
        pub fn extend(&mut self) -> $out {
            self.fixed(Method::Extend)
        }

        pub fn append_content(&mut self) -> $out {
            self.fixed(Method::AppendContent)
        }

        pub fn prepend_content(&mut self) -> $out {
            self.fixed(Method::PrependContent)
        }

        pub fn add_attrs(&mut self) -> $out {
            self.fixed(Method::AddAttrs)
        }

        pub fn add_js(&mut self) -> $out {
            self.fixed(Method::AddJs)
        }

        pub fn add_mix(&mut self) -> $out {
            self.fixed(Method::AddMix)
        }

        pub fn add_mods(&mut self) -> $out {
            self.fixed(Method::AddMods)
        }

        pub fn add_elem_mods(&mut self) -> $out {
            self.fixed(Method::AddElemMods)
        }

        fn fixed(&mut self, method: Method) -> $out {
            self.scope(method.fixed_conditions().unwrap_or_default())
        }
    };
}

/// The template registration compiler.
///
/// Every scope-opening call pushes a node onto an explicit stack and returns a
/// [`Chain`] over it. Once the chain at depth one receives its body, the node
/// is popped and flattened into templates.
///
/// # Example
///
/// ```
/// use minibem::{Tree, Predicate};
///
/// let mut tree = Tree::new();
/// tree.block("button").def().body("plain").unwrap();
/// tree.block("button").r#mod("size", "m").def().body("medium").unwrap();
///
/// let compiled = tree.finish();
/// assert_eq!(compiled.templates.len(), 2);
/// assert_eq!(
///     compiled.templates[0].predicates(),
///     &[
///         Predicate::block("button"),
///         Predicate::r#mod("size", "m"),
///         Predicate::mode("default"),
///     ]
/// );
/// ```
#[derive(Default)]
pub struct Tree {
    queue: Vec<Item>,
    templates: Vec<Template>,
    initializers: Vec<Initializer>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    scope_methods!(Chain<'_>);

    /// Runs `definitions` against this tree and returns the compiled output.
    pub fn build<F>(mut self, definitions: F) -> MinibemResult<Compiled>
    where
        F: FnOnce(&mut Tree) -> MinibemResult<()>,
    {
        definitions(&mut self)?;
        Ok(self.finish())
    }

    /// Ends registration: the templates are reversed so the latest one comes
    /// first.
    pub fn finish(self) -> Compiled {
        let Self {
            mut templates,
            initializers,
            ..
        } = self;

        templates.reverse();
        tracing::debug!(
            templates = templates.len(),
            initializers = initializers.len(),
            "compiled templates"
        );

        Compiled {
            templates,
            initializers,
        }
    }

    /// Records a callback the runtime runs once before rendering.
    pub fn oninit<F>(&mut self, init: F)
    where
        F: Fn(&mut dyn RuntimeHooks) + 'static,
    {
        self.initializers.push(std::rc::Rc::new(init));
    }

    /// Templates flattened so far, in registration order.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Number of scopes currently open.
    pub fn depth(&self) -> usize {
        self.queue.len()
    }

    fn scope(&mut self, conditions: Vec<Predicate>) -> Chain<'_> {
        self.queue.push(Item::new(conditions));
        let depth = self.queue.len();
        tracing::trace!(depth, "scope opened");

        Chain {
            tree: self,
            depth,
            closed: false,
        }
    }

    fn flush(&mut self, conditions: &[Predicate], item: Item) {
        let mut scope = conditions.to_vec();
        scope.extend(item.conditions);

        for child in item.children {
            match child {
                Child::Item(nested) => self.flush(&scope, nested),
                Child::Body(body) => self.add_body(&scope, body),
            }
        }
    }

    fn add_body(&mut self, scope: &[Predicate], body: Body) {
        let body = if scope.iter().all(Predicate::allows_shortcut) {
            match body.into_entries() {
                Ok(entries) => {
                    for (key, entry) in entries {
                        let mut predicates = scope.to_vec();
                        predicates.extend(Method::shortcut_conditions(&key));
                        self.add_template(predicates, entry);
                    }
                    return;
                }
                Err(body) => body,
            }
        } else {
            body
        };

        self.add_template(scope.to_vec(), body);
    }

    fn add_template(&mut self, predicates: Vec<Predicate>, body: Body) {
        let template = Template::new(predicates, body);
        tracing::trace!(predicates = ?template.predicates(), "template added");
        self.templates.push(template);
    }
}

/// A scope on the compiler stack, narrowed by chained calls and closed by
/// one of [`Chain::body`], [`Chain::bodies`] or [`Chain::nest`].
///
/// Dropping a chain that never received a body discards its scope.
pub struct Chain<'t> {
    tree: &'t mut Tree,
    depth: usize,
    closed: bool,
}

impl<'t> Chain<'t> {
    scope_methods!(&mut Self);

    /// Closes the scope with a single body.
    pub fn body(&mut self, body: impl Into<Body>) -> MinibemResult<()> {
        self.attach(Item::with_children(vec![Child::Body(body.into())]))
    }

    /// Closes the scope with several bodies, each becoming its own template.
    pub fn bodies<I, B>(&mut self, bodies: I) -> MinibemResult<()>
    where
        I: IntoIterator<Item = B>,
        B: Into<Body>,
    {
        let children = bodies.into_iter().map(|b| Child::Body(b.into())).collect();
        self.attach(Item::with_children(children))
    }

    /// Closes the scope with the scopes `nested` registers, which inherit this
    /// scope's predicates.
    ///
    /// ```
    /// use minibem::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.block("link")
    ///     .nest(|t| {
    ///         t.tag().body("a")?;
    ///         t.elem("icon").tag().body("i")
    ///     })
    ///     .unwrap();
    /// assert_eq!(tree.finish().templates.len(), 2);
    /// ```
    pub fn nest<F>(&mut self, nested: F) -> MinibemResult<()>
    where
        F: FnOnce(&mut Tree) -> MinibemResult<()>,
    {
        if self.closed {
            return Err(MinibemError::ClosedScope);
        }

        nested(&mut *self.tree)?;
        let children = self
            .tree
            .queue
            .split_off(self.depth)
            .into_iter()
            .map(Child::Item)
            .collect();
        self.attach(Item::with_children(children))
    }

    fn scope(&mut self, conditions: Vec<Predicate>) -> &mut Self {
        if self.closed {
            tracing::warn!(?conditions, "predicates added to a closed scope are ignored");
            return self;
        }

        let index = self.depth.saturating_sub(1);
        if let Some(item) = self.tree.queue.get_mut(index) {
            item.conditions.extend(conditions);
        }
        self
    }

    fn attach(&mut self, child: Item) -> MinibemResult<()> {
        if self.closed {
            return Err(MinibemError::ClosedScope);
        }
        let tree = &mut *self.tree;
        let index = self.depth.saturating_sub(1);
        let Some(item) = tree.queue.get_mut(index) else {
            return Err(MinibemError::ClosedScope);
        };
        item.children.push(Child::Item(child));
        self.closed = true;

        if self.depth == 1 {
            if let Some(root) = tree.queue.pop() {
                let before = tree.templates.len();
                tree.flush(&[], root);
                tracing::debug!(
                    templates = tree.templates.len().saturating_sub(before),
                    "scope flattened"
                );
            }
        }
        Ok(())
    }
}

impl Drop for Chain<'_> {
    fn drop(&mut self) {
        if !self.closed {
            tracing::trace!(depth = self.depth, "scope dropped without a body");
            self.tree.queue.truncate(self.depth.saturating_sub(1));
        }
    }
}
