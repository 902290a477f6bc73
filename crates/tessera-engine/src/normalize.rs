//! Caret normalization.
//!
//! A caret may not sit inside a self-closing or non-editable node, nor
//! logically after a fake `<br>`. [`NormalizeMode::Full`] additionally slides
//! the caret into the deepest inline run it touches, preferring the left.

use indextree::NodeId;

use crate::content_type::is_fake_br;
use crate::policy::EditingPolicy;
use crate::position::Position;
use crate::tree::Tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeMode {
    #[default]
    Basic,
    Full,
}

pub fn normalize(tree: &Tree, policy: &EditingPolicy, pos: Position, mode: NormalizeMode) -> Position {
    let mut pos = escape_opaque(tree, policy, pos);

    if let Some(prev) = before(tree, pos)
        && tree.is_br(prev)
        && is_fake_br(tree, policy.schema(), prev)
    {
        pos.offset -= 1;
    }

    if mode == NormalizeMode::Full {
        pos = slide_inward(tree, policy, pos);
    }
    pos
}

/// Move out of self-closing and non-editable ancestors, innermost first.
fn escape_opaque(tree: &Tree, policy: &EditingPolicy, mut pos: Position) -> Position {
    loop {
        let opaque = tree.ancestors(pos.container).find(|&n| {
            tree.element(n).is_some()
                && (policy.is_self_closing(tree, n) || !policy.is_editable(tree, n))
        });
        let Some(node) = opaque else {
            return pos;
        };
        let slot = if pos.offset == 0 && tree.node_size(node) > 0 {
            tree.left_pos(node)
        } else {
            tree.right_pos(node)
        };
        match slot {
            Some(slot) => pos = slot,
            // The root itself is never opaque in a sane schema.
            None => return pos,
        }
    }
}

fn before(tree: &Tree, pos: Position) -> Option<NodeId> {
    if tree.is_text(pos.container) {
        return None;
    }
    pos.offset
        .checked_sub(1)
        .and_then(|i| tree.child(pos.container, i))
}

/// An inline the caret may enter.
fn is_enterable(tree: &Tree, policy: &EditingPolicy, id: NodeId) -> bool {
    tree.element(id).is_some()
        && !policy.is_block(tree, id)
        && !policy.is_self_closing(tree, id)
        && policy.is_editable(tree, id)
}

fn slide_inward(tree: &Tree, policy: &EditingPolicy, mut pos: Position) -> Position {
    while !tree.is_text(pos.container) {
        if let Some(left) = before(tree, pos) {
            if tree.is_text(left) {
                return tree.end_of(left);
            }
            if is_enterable(tree, policy, left) {
                pos = tree.end_of(left);
                continue;
            }
        }
        match tree.child(pos.container, pos.offset) {
            Some(right) if tree.is_text(right) => return tree.start_of(right),
            Some(right) if is_enterable(tree, policy, right) => pos = tree.start_of(right),
            _ => break,
        }
    }
    pos
}
