//! Joining the two fragments left on either side of a deletion.

use indextree::NodeId;

use crate::error::EditError;
use crate::policy::EditingPolicy;
use crate::position::Position;
use crate::tree::Tree;

use super::cleanup::{has_rendered_content, remove_empty_shells};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Block(NodeId),
    /// An inline directly under the common ancestor.
    Inline(NodeId),
}

impl Side {
    fn node(self) -> NodeId {
        match self {
            Side::Block(n) | Side::Inline(n) => n,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Joined {
    pub merged: bool,
    /// Where the caret belongs when the join decides it.
    pub cursor: Option<Position>,
}

/// Joinable fragment on one side of the gap at `ca`.
///
/// `gap_neighbour` is the child of `ca` next to the gap on this side; it is
/// only used when the boundary sits directly in `ca`.
fn joinable(
    tree: &Tree,
    policy: &EditingPolicy,
    container: NodeId,
    ca: NodeId,
    gap_neighbour: Option<NodeId>,
) -> Option<Side> {
    if container == ca {
        return gap_neighbour
            .filter(|&n| !policy.is_block(tree, n))
            .map(Side::Inline);
    }
    let below: Vec<NodeId> = tree.ancestors(container).take_while(|&a| a != ca).collect();
    below
        .iter()
        .find(|&&a| policy.is_block(tree, a))
        .map(|&b| Side::Block(b))
        .or_else(|| below.last().map(|&top| Side::Inline(top)))
}

/// Inline siblings of `from` (inclusive) in one direction, stopping at a
/// block. Returned in document order.
fn inline_run(tree: &Tree, policy: &EditingPolicy, from: NodeId, forward: bool) -> Vec<NodeId> {
    let mut run = Vec::new();
    let mut current = Some(from);
    while let Some(node) = current.filter(|&n| !policy.is_block(tree, n)) {
        run.push(node);
        current = if forward {
            tree.next_sibling(node)
        } else {
            tree.previous_sibling(node)
        };
    }
    if !forward {
        run.reverse();
    }
    run
}

fn remove_with_shells(tree: &mut Tree, policy: &EditingPolicy, node: NodeId, ca: NodeId) {
    let parent = tree.parent(node);
    if let Err(err) = tree.remove(node) {
        log::warn!("join: could not remove {node:?}: {err}");
        return;
    }
    if let Some(parent) = parent {
        remove_empty_shells(tree, policy, parent, ca);
    }
}

/// Move `nodes` in order under `parent`, inserting from child index `at` or
/// appending when `at` is `None`. Stops at the first node that cannot move.
fn move_nodes(
    tree: &mut Tree,
    parent: NodeId,
    at: Option<usize>,
    nodes: &[NodeId],
) -> Result<(), EditError> {
    for (i, &node) in nodes.iter().enumerate() {
        match at {
            Some(at) => tree.insert_child(parent, at + i, node)?,
            None => tree.append(parent, node)?,
        }
    }
    Ok(())
}

/// Try to join across the gap left at index `gap` of `ca`.
pub(crate) fn join(
    tree: &mut Tree,
    policy: &EditingPolicy,
    ca: NodeId,
    start: NodeId,
    end: NodeId,
    gap: usize,
) -> Joined {
    if start == ca && end == ca {
        return Joined::default();
    }
    let left_neighbour = gap.checked_sub(1).and_then(|i| tree.child(ca, i));
    let right_neighbour = tree.child(ca, gap);
    let (Some(left), Some(right)) = (
        joinable(tree, policy, start, ca, left_neighbour),
        joinable(tree, policy, end, ca, right_neighbour),
    ) else {
        log::debug!("join: nothing joinable");
        return Joined::default();
    };

    if policy.unbreakable_scope(tree, left.node()) != policy.unbreakable_scope(tree, right.node()) {
        log::debug!("join: unbreakable boundary between {left:?} and {right:?}");
        return Joined::default();
    }

    match (left, right) {
        (Side::Block(l), Side::Block(r)) => join_blocks(tree, policy, ca, l, r),
        (Side::Block(l), Side::Inline(r)) => {
            let old_len = tree.node_size(l);
            let run = inline_run(tree, policy, r, true);
            if let Err(err) = move_nodes(tree, l, None, &run) {
                log::warn!("join: could not pull inline run into {l:?}: {err}");
                return Joined::default();
            }
            log::debug!("join: pulled inline run into {l:?}");
            Joined {
                merged: true,
                cursor: Some(Position::new(l, old_len)),
            }
        }
        (Side::Inline(l), Side::Block(r)) => {
            let run = inline_run(tree, policy, l, false);
            if let Err(err) = move_nodes(tree, r, Some(0), &run) {
                log::warn!("join: could not push inline run into {r:?}: {err}");
                return Joined::default();
            }
            log::debug!("join: pushed inline run into {r:?}");
            Joined {
                merged: true,
                cursor: Some(Position::new(r, run.len())),
            }
        }
        (Side::Inline(_), Side::Inline(_)) => Joined::default(),
    }
}

fn join_blocks(tree: &mut Tree, policy: &EditingPolicy, ca: NodeId, l: NodeId, r: NodeId) -> Joined {
    if !has_rendered_content(tree, policy, l) && !policy.is_unremovable(tree, l) {
        log::debug!("join: dropping empty left block {l:?}");
        remove_with_shells(tree, policy, l, ca);
    } else if !has_rendered_content(tree, policy, r) && !policy.is_unremovable(tree, r) {
        log::debug!("join: dropping empty right block {r:?}");
        remove_with_shells(tree, policy, r, ca);
    } else if !policy.is_unremovable(tree, r) {
        let children: Vec<NodeId> = tree.children(r).collect();
        if let Err(err) = move_nodes(tree, l, None, &children) {
            log::warn!("join: could not merge {r:?} into {l:?}: {err}");
            return Joined::default();
        }
        log::debug!("join: merged {r:?} into {l:?}");
        remove_with_shells(tree, policy, r, ca);
    } else {
        log::debug!("join: right block {r:?} is unremovable");
        return Joined::default();
    }
    Joined {
        merged: true,
        cursor: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tag::Tag;
    use pretty_assertions::assert_eq;

    fn join_at(markup: &str, start: &[usize], end: &[usize], gap: usize) -> (String, Joined) {
        let mut tree = Tree::from_markup(markup);
        let policy = EditingPolicy::default();
        let start = tree.node_at_path(start).unwrap();
        let end = tree.node_at_path(end).unwrap();
        let root = tree.root();
        let joined = join(&mut tree, &policy, root, start, end, gap);
        (tree.to_markup(), joined)
    }

    #[test]
    fn failed_move_stops_before_later_nodes() {
        let mut tree = Tree::from_markup("<div><i>x</i>y</div><p>z</p>");
        let i = tree.node_at_path(&[0, 0]).unwrap();
        let nodes = [
            tree.node_at_path(&[0, 1]).unwrap(),
            tree.node_at_path(&[0]).unwrap(),
            tree.node_at_path(&[1]).unwrap(),
        ];

        assert!(move_nodes(&mut tree, i, None, &nodes).is_err());
        assert_eq!(tree.to_markup(), "<div><i>xy</i></div><p>z</p>");
    }

    #[test]
    fn inline_run_is_pushed_to_the_front() {
        let mut tree = Tree::from_markup("<p>a</p><i>b</i>c<p>d</p>");
        let nodes = [tree.node_at_path(&[1]).unwrap(), tree.node_at_path(&[2]).unwrap()];
        let target = tree.node_at_path(&[3]).unwrap();

        move_nodes(&mut tree, target, Some(0), &nodes).unwrap();
        assert_eq!(tree.to_markup(), "<p>a</p><p><i>b</i>cd</p>");
    }

    #[test]
    fn blocks_merge_left() {
        let (markup, joined) = join_at("<p>foo</p><p>bar</p>", &[0], &[1], 1);
        assert_eq!(markup, "<p>foobar</p>");
        assert!(joined.merged);
        assert_eq!(joined.cursor, None);
    }

    #[test]
    fn empty_left_block_is_dropped() {
        let (markup, joined) = join_at("<p><br></p><p>bar</p>", &[0], &[1], 1);
        assert_eq!(markup, "<p>bar</p>");
        assert!(joined.merged);
    }

    #[test]
    fn nested_shells_go_with_the_right_block() {
        let (markup, _) = join_at(
            "<p>foo</p><blockquote><p>bar</p></blockquote>",
            &[0],
            &[1, 0],
            1,
        );
        assert_eq!(markup, "<p>foobar</p>");
    }

    #[test]
    fn block_pulls_following_inline_run() {
        let (markup, joined) = join_at("<p>foo</p>bar<b>baz</b><p>next</p>", &[0], &[], 1);
        assert_eq!(markup, "<p>foobar<b>baz</b></p><p>next</p>");
        let cursor = joined.cursor.unwrap();
        assert_eq!(cursor.offset, 1);
    }

    #[test]
    fn inline_run_is_pushed_into_block() {
        let (markup, joined) = join_at("<p>x</p>a<i>b</i><p>c</p>", &[], &[3], 3);
        assert_eq!(markup, "<p>x</p><p>a<i>b</i>c</p>");
        assert_eq!(joined.cursor.map(|c| c.offset), Some(2));
    }

    #[test]
    fn unbreakable_scope_prevents_join() {
        let mut tree = Tree::from_markup("<p>foo</p><p>bar</p>");
        let policy = EditingPolicy::default()
            .unbreakable(|tree: &Tree, node: NodeId| {
                tree.tag(node) == Some(&Tag::P) && tree.child_index(node) == 1
            });
        let p1 = tree.child(tree.root(), 0).unwrap();
        let p2 = tree.child(tree.root(), 1).unwrap();
        let root = tree.root();
        let joined = join(&mut tree, &policy, root, p1, p2, 1);
        assert!(!joined.merged);
        assert_eq!(tree.to_markup(), "<p>foo</p><p>bar</p>");
    }

    #[test]
    fn boundaries_in_the_common_ancestor_do_not_join() {
        let (markup, joined) = join_at("<p>a</p><p>b</p><p>c</p>", &[], &[], 1);
        assert!(!joined.merged);
        assert_eq!(markup, "<p>a</p><p>b</p><p>c</p>");
    }
}
