use crate::interface::Body;
use crate::predicate::Predicate;

/// A scope opened by one builder chain, as it sits on the compiler stack.
///
/// Nested scopes and bodies both land in `children`, in registration order.
#[derive(Debug, Default)]
pub(crate) struct Item {
    pub(crate) conditions: Vec<Predicate>,
    pub(crate) children: Vec<Child>,
}

#[derive(Debug)]
pub(crate) enum Child {
    /// A nested scope.
    Item(Item),
    /// A body, possibly a shortcut mapping.
    Body(Body),
}

impl Item {
    pub(crate) fn new(conditions: Vec<Predicate>) -> Self {
        Self {
            conditions,
            children: Vec::new(),
        }
    }

    /// Node holding the children supplied by one terminating call.
    pub(crate) fn with_children(children: Vec<Child>) -> Self {
        Self {
            conditions: Vec::new(),
            children,
        }
    }
}
