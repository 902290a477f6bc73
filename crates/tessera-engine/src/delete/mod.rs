//! # Delete and merge
//!
//! [`delete_range`] removes everything between two positions:
//!
//! 1. Before-delete hooks get the first chance; a hook may own the
//!    deletion outright.
//! 2. Text boundaries are split so both ends index element children.
//! 3. Both boundaries are snapshotted for [restoration](crate::restore).
//! 4. Nodes are removed bottom-up along the start and end chains, then the
//!    whole children between them under their common ancestor.
//!    Unremovable nodes are cleared and given a placeholder instead.
//! 5. The fragments on either side are joined when allowed.
//! 6. The caret is placed, empty leftovers are tidied, and whitespace and
//!    line breaks are restored around both boundaries.
//!
//! [`delete_backward`] and [`delete_forward`] resolve one visible step with
//! [`step_range`] and delegate.

mod cleanup;
mod join;
mod step;

use indextree::NodeId;

use crate::error::EditError;
use crate::normalize::{NormalizeMode, normalize};
use crate::policy::{EditingPolicy, Handled};
use crate::position::{Direction, Position, Range};
use crate::restore::{Reentrancy, RestoreReport, prepare_update};
use crate::tree::Tree;

pub use step::step_range;

/// What a delete did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Normalized caret after the delete.
    pub cursor: Position,
    /// The fragments on either side were joined.
    pub merged: bool,
    /// Unremovable nodes that were cleared to a placeholder.
    pub emptied_unremovable: Vec<NodeId>,
    /// A before-delete hook handled the deletion.
    pub intercepted: bool,
    /// `None` when nothing was restored: a hook handled the delete, the
    /// range was collapsed, or an outer edit holds the restoration guard.
    pub restore: Option<RestoreReport>,
}

impl DeleteOutcome {
    fn untouched(cursor: Position) -> Self {
        Self {
            cursor,
            merged: false,
            emptied_unremovable: Vec::new(),
            intercepted: false,
            restore: None,
        }
    }
}

/// Remove the content of `range` and return where the caret goes.
pub fn delete_range(
    tree: &mut Tree,
    policy: &EditingPolicy,
    range: Range,
) -> Result<DeleteOutcome, EditError> {
    tree.check_position(range.start())?;
    tree.check_position(range.end())?;

    if let Handled::Yes(cursor) = policy.run_hooks(tree, &range) {
        return Ok(DeleteOutcome {
            intercepted: true,
            ..DeleteOutcome::untouched(cursor.unwrap_or(range.start()))
        });
    }
    if range.is_collapsed() {
        return Ok(DeleteOutcome::untouched(range.start()));
    }

    // End first, so splitting the start cannot move it
    let (mut end, _) = tree.split_at(range.end())?;
    let (start, inserted) = tree.split_at(range.start())?;
    if inserted.is_some() && end.container == start.container && end.offset >= start.offset {
        end.offset += 1;
    }

    let ca = tree
        .common_ancestor(start.container, end.container)
        .ok_or(EditError::DetachedNode(end.container))?;
    let restorer = prepare_update(tree, policy, &[start, end], Reentrancy::Exclusive);
    log::debug!(
        "delete_range {} .. {} under {ca:?}",
        tree.path_string(start),
        tree.path_string(end)
    );

    let mut emptied = Vec::new();

    let mut left = start;
    while left.container != ca {
        let doomed: Vec<NodeId> = tree.children(left.container).skip(left.offset).collect();
        for node in doomed {
            cleanup::remove_or_clear(tree, policy, node, &mut emptied);
        }
        let node = left.container;
        let parent = tree.parent(node).ok_or(EditError::DetachedNode(node))?;
        left = Position::new(parent, tree.child_index(node) + 1);
    }

    let mut right = end;
    while right.container != ca {
        let doomed: Vec<NodeId> = tree.children(right.container).take(right.offset).collect();
        for node in doomed {
            cleanup::remove_or_clear(tree, policy, node, &mut emptied);
        }
        let node = right.container;
        let parent = tree.parent(node).ok_or(EditError::DetachedNode(node))?;
        right = Position::new(parent, tree.child_index(node));
    }

    let between: Vec<NodeId> = tree
        .children(ca)
        .skip(left.offset)
        .take(right.offset.saturating_sub(left.offset))
        .collect();
    for node in between {
        cleanup::remove_or_clear(tree, policy, node, &mut emptied);
    }
    let gap = left.offset;

    let joined = join::join(tree, policy, ca, start.container, end.container, gap);

    let mut cursor = joined
        .cursor
        .or_else(|| tree.is_attached(start.container).then_some(start))
        .unwrap_or(if end.container == ca {
            Position::new(ca, gap)
        } else {
            Position::new(end.container, 0)
        });

    cleanup::tidy(tree, policy, ca, &mut cursor);

    let restore = restorer.map(|restorer| {
        let mut tracked = [cursor];
        let report = restorer.restore(tree, policy, &mut tracked);
        cursor = tracked[0];
        report
    });
    if let Err(err) = tree.check_position(cursor) {
        debug_assert!(false, "delete left the cursor invalid: {err}");
        log::warn!("delete: cursor invalid after delete: {err}");
        cursor = Position::new(ca, tree.node_size(ca).min(gap));
    }
    let cursor = normalize(tree, policy, cursor, NormalizeMode::Full);

    Ok(DeleteOutcome {
        cursor,
        merged: joined.merged,
        emptied_unremovable: emptied,
        intercepted: false,
        restore,
    })
}

fn delete_step(
    tree: &mut Tree,
    policy: &EditingPolicy,
    pos: Position,
    dir: Direction,
) -> Result<Option<DeleteOutcome>, EditError> {
    tree.check_position(pos)?;
    match step_range(tree, policy, pos, dir) {
        Some(range) => delete_range(tree, policy, range).map(Some),
        None => {
            log::debug!("delete {dir:?}: nothing to delete");
            Ok(None)
        }
    }
}

/// Backspace at `pos`. `Ok(None)` at the start of the document.
pub fn delete_backward(
    tree: &mut Tree,
    policy: &EditingPolicy,
    pos: Position,
) -> Result<Option<DeleteOutcome>, EditError> {
    delete_step(tree, policy, pos, Direction::Left)
}

/// Forward delete at `pos`. `Ok(None)` at the end of the document.
pub fn delete_forward(
    tree: &mut Tree,
    policy: &EditingPolicy,
    pos: Position,
) -> Result<Option<DeleteOutcome>, EditError> {
    delete_step(tree, policy, pos, Direction::Right)
}
