//! Post-deletion tidying: placeholders in emptied blocks, removal of empty
//! inline shells.

use indextree::NodeId;

use crate::policy::EditingPolicy;
use crate::position::Position;
use crate::tree::Tree;
use crate::tree::node::{CharClass, Element, NodeKind, ZWSP};
use crate::tree::tag::Tag;

/// Anything under `id` (inclusive) that renders: a visible character, an
/// NBSP, or an atomic element. Line breaks do not count.
pub(crate) fn has_rendered_content(tree: &Tree, policy: &EditingPolicy, id: NodeId) -> bool {
    tree.post_order(id).into_iter().any(|n| match tree.get(n) {
        Some(NodeKind::Text(text)) => text
            .chars()
            .any(|ch| matches!(CharClass::of(ch), CharClass::Visible | CharClass::HardSpace)),
        Some(NodeKind::Element(_)) => policy.is_atomic(tree, n),
        _ => false,
    })
}

/// Any character other than a zero-width one, or an atomic element.
/// Collapsible whitespace between inlines may render, so inlines holding it
/// are kept.
fn holds_characters(tree: &Tree, policy: &EditingPolicy, id: NodeId) -> bool {
    tree.post_order(id).into_iter().any(|n| match tree.get(n) {
        Some(NodeKind::Text(text)) => text
            .chars()
            .any(|ch| CharClass::of(ch) != CharClass::ZeroWidth),
        Some(NodeKind::Element(_)) => policy.is_atomic(tree, n),
        _ => false,
    })
}

fn has_br(tree: &Tree, id: NodeId) -> bool {
    tree.post_order(id).into_iter().any(|n| tree.is_br(n))
}

/// Empty an unremovable node and give it something to hold its line open.
pub(crate) fn clear_to_placeholder(tree: &mut Tree, policy: &EditingPolicy, id: NodeId) {
    if tree.is_text(id) {
        // Infallible: `id` is a text node.
        let _ = tree.set_text(id, ZWSP.to_string());
        return;
    }
    tree.clear_children(id);
    let placeholder = if policy.is_block(tree, id) {
        tree.new_element(Element::new(Tag::Br))
    } else {
        tree.new_text(ZWSP.to_string())
    };
    if let Err(err) = tree.append(id, placeholder) {
        log::warn!("could not place placeholder in {id:?}: {err}");
    }
}

/// Remove `child`, or clear it if the policy says it must stay.
pub(crate) fn remove_or_clear(
    tree: &mut Tree,
    policy: &EditingPolicy,
    child: NodeId,
    emptied: &mut Vec<NodeId>,
) {
    if policy.is_unremovable(tree, child) {
        log::debug!("delete: clearing unremovable {child:?}");
        clear_to_placeholder(tree, policy, child);
        emptied.push(child);
    } else if let Err(err) = tree.remove(child) {
        log::warn!("delete: could not remove {child:?}: {err}");
    }
}

/// Remove now-childless removable ancestors of a node that used to live in
/// `parent`, stopping below `stop`.
pub(crate) fn remove_empty_shells(tree: &mut Tree, policy: &EditingPolicy, parent: NodeId, stop: NodeId) {
    let mut current = Some(parent);
    while let Some(node) = current {
        if node == stop
            || tree.has_children(node)
            || !tree.is_attached(node)
            || policy.is_unremovable(tree, node)
        {
            return;
        }
        current = tree.parent(node);
        log::trace!("delete: removing empty shell {node:?}");
        let _ = tree.remove(node);
    }
}

/// Tidy the subtree of `scope`, innermost first.
///
/// - A block left without content or a `<br>` is removed if it is purely
///   structural (list, table parts), otherwise it gets a `<br>`.
/// - An inline left without content is removed, unless `cursor` sits in it:
///   then it keeps a zero-width space so the caret has somewhere to be.
/// - Empty text nodes are dropped unless `cursor` sits in one.
pub(crate) fn tidy(tree: &mut Tree, policy: &EditingPolicy, scope: NodeId, cursor: &mut Position) {
    for node in tree.post_order(scope) {
        if !tree.is_attached(node) || node == tree.root() {
            continue;
        }
        let tracked = std::slice::from_mut(cursor);

        if let Some(text) = tree.text(node) {
            if text.is_empty() && tracked[0].container != node && !policy.is_unremovable(tree, node) {
                let _ = tree.remove_tracked(node, tracked);
            }
            continue;
        }
        if tree.element(node).is_none()
            || policy.is_atomic(tree, node)
            || policy.is_self_closing(tree, node)
            || has_rendered_content(tree, policy, node)
            || has_br(tree, node)
        {
            continue;
        }

        if policy.is_block(tree, node) {
            let structural = tree.tag(node).is_some_and(Tag::is_structural);
            if structural && !policy.is_unremovable(tree, node) {
                log::trace!("delete: removing empty structural block {node:?}");
                let _ = tree.remove_tracked(node, tracked);
            } else {
                let br = tree.new_element(Element::new(Tag::Br));
                let end = tree.node_size(node);
                let _ = tree.insert_tracked(node, end, br, tracked);
            }
        } else if holds_characters(tree, policy, node) {
            continue;
        } else if tree.contains(node, tracked[0].container) {
            let holds_marker = tree.text_content(node).contains(ZWSP);
            if !holds_marker {
                let marker = tree.new_text(ZWSP.to_string());
                let end = tree.node_size(node);
                let _ = tree.insert_tracked(node, end, marker, tracked);
            }
        } else if !policy.is_unremovable(tree, node) {
            let _ = tree.remove_tracked(node, tracked);
        }
    }
}
