//! # Editing policy
//!
//! Everything an embedder can decide about the tree is passed in explicitly
//! through an [`EditingPolicy`]:
//!
//! - the [`Schema`] answering block / self-closing / editable,
//! - which nodes may be emptied but never detached (*unremovable*),
//! - which subtrees may never be merged across (*unbreakable*),
//! - `before delete` hooks that may take a deletion over entirely.
//!
//! There is no global registry; two policies can drive two trees side by side.

use std::cmp::Reverse;
use std::fmt;

use indextree::NodeId;

use crate::position::{Position, Range};
use crate::tree::Tree;
use crate::tree::schema::{self, HtmlSchema, Schema};

/// Answer from a [`BeforeDelete`] hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Run the next hook, then the default algorithm.
    No,
    /// The hook performed the deletion. It may name the new cursor.
    Yes(Option<Position>),
}

/// Intercepts a deletion before the default algorithm runs.
pub trait BeforeDelete {
    fn before_delete(&self, tree: &mut Tree, range: &Range) -> Handled;
}

impl<F> BeforeDelete for F
where
    F: Fn(&mut Tree, &Range) -> Handled,
{
    fn before_delete(&self, tree: &mut Tree, range: &Range) -> Handled {
        self(tree, range)
    }
}

type NodePredicate = Box<dyn Fn(&Tree, NodeId) -> bool>;

pub struct EditingPolicy {
    schema: Box<dyn Schema>,
    unremovable: Vec<NodePredicate>,
    unbreakable: Vec<NodePredicate>,
    hooks: Vec<(i32, Box<dyn BeforeDelete>)>,
}

impl Default for EditingPolicy {
    fn default() -> Self {
        Self::new(HtmlSchema)
    }
}

impl fmt::Debug for EditingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditingPolicy")
            .field("unremovable", &self.unremovable.len())
            .field("unbreakable", &self.unbreakable.len())
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

impl EditingPolicy {
    pub fn new(schema: impl Schema + 'static) -> Self {
        Self {
            schema: Box::new(schema),
            unremovable: Vec::new(),
            unbreakable: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Nodes matching `predicate` are cleared instead of detached.
    pub fn unremovable(mut self, predicate: impl Fn(&Tree, NodeId) -> bool + 'static) -> Self {
        self.unremovable.push(Box::new(predicate));
        self
    }

    /// Nodes matching `predicate` bound a scope no merge may cross.
    pub fn unbreakable(mut self, predicate: impl Fn(&Tree, NodeId) -> bool + 'static) -> Self {
        self.unbreakable.push(Box::new(predicate));
        self
    }

    /// Register a hook. Higher priorities run first; equal priorities run in
    /// registration order.
    pub fn before_delete(mut self, priority: i32, hook: impl BeforeDelete + 'static) -> Self {
        self.hooks.push((priority, Box::new(hook)));
        self.hooks.sort_by_key(|(priority, _)| Reverse(*priority));
        self
    }

    pub fn schema(&self) -> &dyn Schema {
        self.schema.as_ref()
    }

    pub fn is_block(&self, tree: &Tree, id: NodeId) -> bool {
        schema::is_block(tree, self.schema(), id)
    }

    pub fn is_self_closing(&self, tree: &Tree, id: NodeId) -> bool {
        schema::is_self_closing(tree, self.schema(), id)
    }

    pub fn is_editable(&self, tree: &Tree, id: NodeId) -> bool {
        schema::is_editable(tree, self.schema(), id)
    }

    pub fn is_atomic(&self, tree: &Tree, id: NodeId) -> bool {
        schema::is_atomic(tree, self.schema(), id)
    }

    pub fn nearest_block(&self, tree: &Tree, id: NodeId) -> NodeId {
        schema::nearest_block(tree, self.schema(), id)
    }

    /// The root is always unremovable.
    pub fn is_unremovable(&self, tree: &Tree, id: NodeId) -> bool {
        id == tree.root() || self.unremovable.iter().any(|p| p(tree, id))
    }

    pub fn is_unbreakable(&self, tree: &Tree, id: NodeId) -> bool {
        id == tree.root() || self.unbreakable.iter().any(|p| p(tree, id))
    }

    /// Nearest unbreakable ancestor-or-self of `id`.
    pub fn unbreakable_scope(&self, tree: &Tree, id: NodeId) -> NodeId {
        tree.ancestors(id)
            .find(|&a| self.is_unbreakable(tree, a))
            .unwrap_or(tree.root())
    }

    /// Offer `range` to each hook in priority order.
    pub(crate) fn run_hooks(&self, tree: &mut Tree, range: &Range) -> Handled {
        for (priority, hook) in &self.hooks {
            if let Handled::Yes(cursor) = hook.before_delete(tree, range) {
                log::debug!("delete handled by hook (priority {priority})");
                return Handled::Yes(cursor);
            }
        }
        Handled::No
    }
}
