//! # Leaf-first traversal
//!
//! [`Walker`] walks the tree in document order (or its mirror) starting from
//! a position, yielding leaves as it meets them and, unless `leaf_only` is
//! set, each element once all of its children have been passed.
//!
//! Two predicates shape the walk:
//!
//! - `stop`: meeting a matching node (entering it, or leaving it from the
//!   inside) ends the walk with [`StopReason::BlockHit`]. Usually "is block".
//! - `stop_traverse`: a matching node is yielded as if it were a leaf and
//!   never descended into. Usually "is non-editable or self-closing".
//!
//! When the walk ends, [`Walker::reason`] says why. The classifier relies on
//! telling a block edge apart from the end of the document.

use indextree::NodeId;

use crate::position::{Direction, Position};
use crate::tree::Tree;

/// Why a [`Walker`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Ran off the edge of the root.
    Exhausted,
    /// Met a node matching `stop`.
    BlockHit,
    /// Left the scope node, which does not match `stop`.
    OutOfScope,
    /// Left the scope node, which matches `stop`.
    BlockOut,
}

type Predicate<'t> = Box<dyn Fn(&Tree, NodeId) -> bool + 't>;

#[derive(Debug, Clone, Copy)]
enum Step {
    /// About to visit a node from outside.
    Enter(NodeId),
    /// Done with a node; move to its sibling or parent.
    After(NodeId),
    /// Every child of a node has been passed.
    Exit(NodeId),
    Done,
}

pub struct Walker<'t> {
    tree: &'t Tree,
    dir: Direction,
    leaf_only: bool,
    scope: Option<NodeId>,
    stop: Predicate<'t>,
    stop_traverse: Predicate<'t>,
    step: Step,
    reason: Option<StopReason>,
}

impl<'t> Walker<'t> {
    /// Walk from `from` towards `dir`.
    ///
    /// Starting inside a text node skips the rest of that node: characters
    /// are the caller's business.
    pub fn new(tree: &'t Tree, from: Position, dir: Direction) -> Self {
        let step = if tree.is_text(from.container) || tree.get(from.container).is_none() {
            Step::After(from.container)
        } else {
            let child = match dir {
                Direction::Right => tree.child(from.container, from.offset),
                Direction::Left => from
                    .offset
                    .checked_sub(1)
                    .and_then(|i| tree.child(from.container, i)),
            };
            match child {
                Some(child) => Step::Enter(child),
                None => Step::Exit(from.container),
            }
        };

        Self {
            tree,
            dir,
            leaf_only: false,
            scope: None,
            stop: Box::new(|_, _| false),
            stop_traverse: Box::new(|_, _| false),
            step,
            reason: None,
        }
    }

    /// Walk past `node` itself, as if starting from its far edge.
    pub fn after(tree: &'t Tree, node: NodeId, dir: Direction) -> Self {
        let mut walker = Self::new(tree, Position::new(node, 0), dir);
        walker.step = Step::After(node);
        walker
    }

    pub fn leaf_only(mut self) -> Self {
        self.leaf_only = true;
        self
    }

    pub fn scope(mut self, scope: NodeId) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn stop(mut self, stop: impl Fn(&Tree, NodeId) -> bool + 't) -> Self {
        self.stop = Box::new(stop);
        self
    }

    pub fn stop_traverse(mut self, stop_traverse: impl Fn(&Tree, NodeId) -> bool + 't) -> Self {
        self.stop_traverse = Box::new(stop_traverse);
        self
    }

    /// Why the walk ended, once it has.
    pub fn reason(&self) -> Option<StopReason> {
        self.reason
    }

    fn halt(&mut self, reason: StopReason) {
        self.reason = Some(reason);
        self.step = Step::Done;
    }

    fn leave_scope(&mut self, node: NodeId) {
        let reason = if (self.stop)(self.tree, node) {
            StopReason::BlockOut
        } else {
            StopReason::OutOfScope
        };
        self.halt(reason);
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        match self.dir {
            Direction::Right => self.tree.first_child(node),
            Direction::Left => self.tree.last_child(node),
        }
    }

    fn sibling(&self, node: NodeId) -> Option<NodeId> {
        match self.dir {
            Direction::Right => self.tree.next_sibling(node),
            Direction::Left => self.tree.previous_sibling(node),
        }
    }
}

impl Iterator for Walker<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            match self.step {
                Step::Done => return None,
                Step::Enter(node) => {
                    if (self.stop)(self.tree, node) {
                        self.halt(StopReason::BlockHit);
                        return None;
                    }
                    match self.first_child(node) {
                        Some(child) if !(self.stop_traverse)(self.tree, node) => {
                            self.step = Step::Enter(child);
                        }
                        _ => {
                            self.step = Step::After(node);
                            return Some(node);
                        }
                    }
                }
                Step::After(node) => {
                    if Some(node) == self.scope {
                        self.leave_scope(node);
                        return None;
                    }
                    if node == self.tree.root() {
                        self.halt(StopReason::Exhausted);
                        return None;
                    }
                    if let Some(next) = self.sibling(node) {
                        self.step = Step::Enter(next);
                    } else if let Some(parent) = self.tree.parent(node) {
                        self.step = Step::Exit(parent);
                    } else {
                        // Detached subtree: nothing left to walk.
                        self.halt(StopReason::Exhausted);
                        return None;
                    }
                }
                Step::Exit(node) => {
                    if Some(node) == self.scope {
                        self.leave_scope(node);
                        return None;
                    }
                    if node == self.tree.root() {
                        self.halt(StopReason::Exhausted);
                        return None;
                    }
                    if (self.stop)(self.tree, node) {
                        self.halt(StopReason::BlockHit);
                        return None;
                    }
                    self.step = Step::After(node);
                    if !self.leaf_only {
                        return Some(node);
                    }
                }
            }
        }
    }
}
