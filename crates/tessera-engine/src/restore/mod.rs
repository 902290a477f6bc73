//! # Whitespace and line-break restoration
//!
//! Edits change what whitespace collapses to. Rather than patching spaces
//! inside every operation, an edit is bracketed:
//!
//! 1. [`prepare_update`] classifies each edit point looking left and right
//!    and remembers, for each direction, an [`Anchor`] on the *far* side of
//!    the point (the side the edit will not touch).
//! 2. The caller mutates the tree.
//! 3. [`Restorer::restore`] re-classifies from each anchor, looks the
//!    `(direction, old, new)` change up in the [rule table](rules), and
//!    rewrites the edge space or `<br>` accordingly.
//!
//! Snapshots are restored right to left. An anchor whose node was detached
//! by the edit is stale: that snapshot is skipped and counted.
//!
//! A per-root guard lets nested edits skip restoration so only the
//! outermost operation restores (see [`Reentrancy`]).

pub mod enforce;
pub mod rules;

use indextree::NodeId;

use crate::content_type::{Classification, Classifier, ContentType, classify};
use crate::position::{Direction, Position};
use crate::policy::EditingPolicy;
use crate::tree::{GuardSet, Tree};

pub use rules::{BrCondition, Decision, decide};

/// A place to re-classify from after the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The slot right after this node.
    After(NodeId),
    /// The slot right before this node.
    Before(NodeId),
    StartOf(NodeId),
    EndOf(NodeId),
    /// A text position counted from the start of the node.
    TextHead(NodeId, usize),
    /// A text position counted back from the end of the node.
    TextTail(NodeId, usize),
}

impl Anchor {
    /// Anchor on the far side of `point` from a classification looking
    /// `dir`: left of the point when looking right, and vice versa.
    ///
    /// At the end of an element the slot after its last child is used, so
    /// content later appended to the element lands beyond the anchor.
    pub(crate) fn for_point(tree: &Tree, point: Position, dir: Direction) -> Anchor {
        let c = point.container;
        if tree.is_text(c) {
            return match dir {
                Direction::Right => Anchor::TextHead(c, point.offset),
                Direction::Left => {
                    Anchor::TextTail(c, tree.node_size(c).saturating_sub(point.offset))
                }
            };
        }
        match dir {
            Direction::Right => match point.offset.checked_sub(1).and_then(|i| tree.child(c, i)) {
                Some(prev) => Anchor::After(prev),
                None => Anchor::StartOf(c),
            },
            Direction::Left => match tree.child(c, point.offset) {
                Some(next) => Anchor::Before(next),
                None => match point.offset.checked_sub(1).and_then(|i| tree.child(c, i)) {
                    Some(prev) => Anchor::After(prev),
                    None => Anchor::EndOf(c),
                },
            },
        }
    }

    pub fn node(&self) -> NodeId {
        match *self {
            Anchor::After(n)
            | Anchor::Before(n)
            | Anchor::StartOf(n)
            | Anchor::EndOf(n)
            | Anchor::TextHead(n, _)
            | Anchor::TextTail(n, _) => n,
        }
    }

    /// Where the anchor is now, or `None` if its node was detached.
    pub fn position(&self, tree: &Tree) -> Option<Position> {
        if !tree.is_attached(self.node()) {
            return None;
        }
        match *self {
            Anchor::After(n) => tree.right_pos(n),
            Anchor::Before(n) => tree.left_pos(n),
            Anchor::StartOf(n) => Some(tree.start_of(n)),
            Anchor::EndOf(n) => Some(tree.end_of(n)),
            Anchor::TextHead(n, offset) => Some(Position::new(n, offset.min(tree.node_size(n)))),
            Anchor::TextTail(n, from_end) => {
                Some(Position::new(n, tree.node_size(n).saturating_sub(from_end)))
            }
        }
    }
}

/// Classification of one edit point in one direction, taken before the
/// edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub anchor: Anchor,
    pub dir: Direction,
    pub old: ContentType,
}

/// Counts from one [`Restorer::restore`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Snapshots whose decision changed the tree.
    pub applied: usize,
    /// Snapshots whose anchor node had been detached.
    pub skipped_stale: usize,
    /// Snapshots that needed no change.
    pub unchanged: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reentrancy {
    /// Always prepare; take no guard.
    Allow,
    /// Prepare only if no other exclusive preparation holds this root.
    Exclusive,
}

/// Releases its root when dropped.
#[derive(Debug)]
struct Guard {
    set: GuardSet,
    key: NodeId,
}

impl Drop for Guard {
    fn drop(&mut self) {
        self.set.borrow_mut().remove(&self.key);
    }
}

/// The edit-scoped root a guard is keyed by: the nearest
/// `contenteditable="true"` ancestor, or the tree root.
fn guard_key(tree: &Tree, point: Option<&Position>) -> NodeId {
    point
        .and_then(|p| {
            tree.ancestors(p.container).find(|&a| {
                tree.element(a)
                    .is_some_and(|el| el.attr("contenteditable") == Some("true"))
            })
        })
        .unwrap_or(tree.root())
}

/// Pending restoration for one edit.
#[derive(Debug)]
#[must_use = "call restore() after the edit, or discard()"]
pub struct Restorer {
    snapshots: Vec<Snapshot>,
    _guard: Option<Guard>,
}

/// Snapshot `points` (in tree order) before an edit.
///
/// In [`Reentrancy::Exclusive`] mode, returns `None` if another exclusive
/// preparation is active on the same root; the caller should then edit
/// without restoring.
pub fn prepare_update(
    tree: &Tree,
    policy: &EditingPolicy,
    points: &[Position],
    mode: Reentrancy,
) -> Option<Restorer> {
    let guard = match mode {
        Reentrancy::Allow => None,
        Reentrancy::Exclusive => {
            let key = guard_key(tree, points.first());
            let set = tree.guards().clone();
            if !set.borrow_mut().insert(key) {
                log::debug!("prepare_update: {key:?} already guarded, skipping");
                return None;
            }
            Some(Guard { set, key })
        }
    };

    let mut classifier = Classifier::new(tree, policy.schema());
    let mut snapshots = Vec::with_capacity(points.len() * 2);
    for &point in points {
        if let Err(err) = tree.check_position(point) {
            debug_assert!(false, "prepare_update on invalid point: {err}");
            log::warn!("prepare_update: skipping point: {err}");
            continue;
        }
        for dir in [Direction::Left, Direction::Right] {
            let Classification {
                content_type,
                boundary,
            } = classifier.classify_with_boundary(point, dir);
            snapshots.push(Snapshot {
                anchor: boundary,
                dir,
                old: content_type,
            });
        }
    }

    Some(Restorer {
        snapshots,
        _guard: guard,
    })
}

impl Restorer {
    /// Snapshots in tree order, left before right per point.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Re-classify every snapshot and enforce the rule table, right to left.
    ///
    /// `tracked` positions are remapped across any `<br>` inserted or
    /// removed.
    pub fn restore(
        self,
        tree: &mut Tree,
        policy: &EditingPolicy,
        tracked: &mut [Position],
    ) -> RestoreReport {
        let mut report = RestoreReport::default();

        for snapshot in self.snapshots.iter().rev() {
            let Some(anchor) = snapshot.anchor.position(tree) else {
                log::debug!("restore: stale anchor {:?}", snapshot.anchor);
                report.skipped_stale += 1;
                continue;
            };

            let new = classify(tree, policy.schema(), anchor, snapshot.dir);
            if new == snapshot.old {
                report.unchanged += 1;
                continue;
            }

            let decision = decide(snapshot.dir, snapshot.old, new);
            log::trace!(
                "restore: {:?} {} -> {}: {decision:?}",
                snapshot.dir,
                snapshot.old,
                new
            );
            if !decision.is_empty()
                && enforce::enforce(
                    tree,
                    policy,
                    anchor,
                    snapshot.dir,
                    snapshot.old,
                    decision,
                    tracked,
                )
            {
                report.applied += 1;
            } else {
                report.unchanged += 1;
            }
        }

        report
    }

    /// Drop the snapshots and release the guard without restoring.
    pub fn discard(self) {}
}
