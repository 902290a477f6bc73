//! Apply a [`Decision`] at the edge next to a restored anchor.

use indextree::NodeId;

use crate::content_type::{ContentType, Scanner, Token, is_fake_br};
use crate::position::{Direction, Position};
use crate::policy::EditingPolicy;
use crate::tree::Tree;
use crate::tree::node::{CharClass, Element, NBSP};
use crate::tree::tag::Tag;

use super::rules::{BrCondition, Decision};

const LINE_EDGE: ContentType = ContentType::BLOCK.union(ContentType::BR);

fn has_width(token: &Token) -> bool {
    !matches!(
        token,
        Token::Char {
            class: CharClass::ZeroWidth,
            ..
        }
    )
}

/// The first thing met from `anchor` looking `dir`, ignoring zero-width
/// characters.
fn edge(tree: &Tree, policy: &EditingPolicy, anchor: Position, dir: Direction) -> Option<Token> {
    Scanner::new(tree, policy.schema(), anchor, dir).find(has_width)
}

/// The run of collapsible characters starting at the edge, in scan order.
fn collapsible_run(
    tree: &Tree,
    policy: &EditingPolicy,
    anchor: Position,
    dir: Direction,
) -> Vec<(NodeId, usize)> {
    Scanner::new(tree, policy.schema(), anchor, dir)
        .filter(has_width)
        .map_while(|token| match token {
            Token::Char {
                node,
                index,
                class: CharClass::Collapsible,
            } => Some((node, index)),
            _ => None,
        })
        .collect()
}

/// Rewrite the edge on the far side of `anchor` from a snapshot taken looking
/// `dir`, where `old` was seen before the edit. Returns whether the tree
/// changed.
///
/// A collapsible edge run is only dropped when `old` was a line edge: the run
/// was collapsed then and would render as a stray space now.
pub(crate) fn enforce(
    tree: &mut Tree,
    policy: &EditingPolicy,
    anchor: Position,
    dir: Direction,
    old: ContentType,
    decision: Decision,
    tracked: &mut [Position],
) -> bool {
    let Some(token) = edge(tree, policy, anchor, dir.reverse()) else {
        return false;
    };

    match token {
        Token::Char {
            node,
            index,
            class: CharClass::Collapsible,
        } if decision.space_visible == Some(true) => {
            log::debug!("restore: edge space in {node:?} at {index} made visible");
            tree.replace_char(node, index, NBSP);
            true
        }
        Token::Char {
            class: CharClass::Collapsible,
            ..
        } if decision.space_visible == Some(false) && old.intersects(LINE_EDGE) => {
            let mut run = collapsible_run(tree, policy, anchor, dir.reverse());
            // Highest index first so earlier indices in a node stay valid.
            run.sort_by(|a, b| b.1.cmp(&a.1));
            log::debug!("restore: dropping {} edge space(s) at {run:?}", run.len());
            for (node, index) in run {
                tree.remove_char_tracked(node, index, tracked);
            }
            true
        }
        Token::Char {
            node,
            index,
            class: CharClass::HardSpace,
        } if decision.space_visible == Some(false) => {
            log::debug!("restore: edge NBSP in {node:?} at {index} made collapsible");
            tree.replace_char(node, index, ' ');
            true
        }
        Token::Br(br) if decision.br_visible == Some(true) => {
            if !is_fake_br(tree, policy.schema(), br) {
                return false;
            }
            let Some(slot) = tree.right_pos(br) else {
                return false;
            };
            log::debug!("restore: duplicating trailing break {br:?}");
            let extra = tree.new_element(Element::new(Tag::Br));
            tree.insert_tracked(slot.container, slot.offset, extra, tracked)
                .is_ok()
        }
        Token::Br(br) if decision.br_visible == Some(false) => {
            if decision.br_condition == BrCondition::OnlyIfFake
                && !is_fake_br(tree, policy.schema(), br)
            {
                return false;
            }
            log::debug!("restore: removing break {br:?}");
            tree.remove_tracked(br, tracked).is_ok()
        }
        _ => false,
    }
}
