//! # Content Tree
//!
//! The editable tree lives in an [`indextree`] arena. Nodes are addressed by
//! [`NodeId`] handles; positions and snapshots store handles, never borrows,
//! so every consumer re-checks validity at the point of use.
//!
//! Removing a node detaches it from its parent. The node stays in the arena
//! (its handle keeps working) but is no longer *attached*: walking its
//! ancestors does not reach the root. That is how stale handles are
//! detected.
//!
//! ## Primitives
//!
//! - [`Tree::child_index`], [`Tree::node_size`]
//! - [`Tree::left_pos`], [`Tree::right_pos`], [`Tree::start_of`], [`Tree::end_of`]
//! - [`Tree::insert_text`], [`Tree::split_text`], [`Tree::insert_element`],
//!   [`Tree::append`], [`Tree::remove`], [`Tree::remove_tracked`]
//!
//! Block/self-closing/editable questions are answered by the
//! [`Schema`](schema::Schema) held in the editing policy, not here.

pub mod markup;
pub mod node;
pub mod schema;
pub mod tag;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use indextree::{Arena, NodeEdge, NodeId};

use crate::error::EditError;
use crate::position::Position;
use node::{Element, NodeKind, byte_index, char_len};
use tag::Tag;

/// Roots that currently hold an exclusive restoration guard.
pub(crate) type GuardSet = Rc<RefCell<HashSet<NodeId>>>;

#[derive(Debug)]
pub struct Tree {
    arena: Arena<NodeKind>,
    root: NodeId,
    guards: GuardSet,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Tree {
    /// Clones the nodes; the copy starts with no active guards.
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            root: self.root,
            guards: GuardSet::default(),
        }
    }
}

impl Tree {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeKind::Element(Element::new(Tag::Root)));
        Self {
            arena,
            root,
            guards: GuardSet::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn guards(&self) -> &GuardSet {
        &self.guards
    }

    /// Node data, or `None` for a handle from another tree.
    pub fn get(&self, id: NodeId) -> Option<&NodeKind> {
        self.arena.get(id).map(|node| node.get())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.arena.get_mut(id).map(|node| node.get_mut())
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.get(id).and_then(NodeKind::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.get_mut(id) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(NodeKind::as_text)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(NodeKind::is_text)
    }

    pub fn is_br(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(Element::is_br)
    }

    pub fn tag(&self, id: NodeId) -> Option<&Tag> {
        self.element(id).map(|el| &el.tag)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id)?.parent()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id)?.first_child()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id)?.last_child()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id)?.next_sibling()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id)?.previous_sibling()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.first_child(id).is_some()
    }

    /// Ancestors of `id`, starting with `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.ancestors(&self.arena)
    }

    /// `ancestor` is `node` or contains it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Every node under `id` (inclusive), children before parents.
    pub fn post_order(&self, id: NodeId) -> Vec<NodeId> {
        id.traverse(&self.arena)
            .filter_map(|edge| match edge {
                NodeEdge::End(node) => Some(node),
                NodeEdge::Start(_) => None,
            })
            .collect()
    }

    /// Number of earlier siblings.
    pub fn child_index(&self, id: NodeId) -> usize {
        id.preceding_siblings(&self.arena).skip(1).count()
    }

    /// Characters for text and comments, children for elements.
    pub fn node_size(&self, id: NodeId) -> usize {
        match self.get(id) {
            Some(NodeKind::Text(text)) | Some(NodeKind::Comment(text)) => char_len(text),
            Some(NodeKind::Element(_)) => self.children(id).count(),
            None => 0,
        }
    }

    /// The slot just before `id` in its parent.
    pub fn left_pos(&self, id: NodeId) -> Option<Position> {
        let parent = self.parent(id)?;
        Some(Position::new(parent, self.child_index(id)))
    }

    /// The slot just after `id` in its parent.
    pub fn right_pos(&self, id: NodeId) -> Option<Position> {
        let parent = self.parent(id)?;
        Some(Position::new(parent, self.child_index(id) + 1))
    }

    pub fn start_of(&self, id: NodeId) -> Position {
        Position::new(id, 0)
    }

    pub fn end_of(&self, id: NodeId) -> Position {
        Position::new(id, self.node_size(id))
    }

    /// The node belongs to this tree and its ancestors reach the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some() && self.ancestors(id).last() == Some(self.root)
    }

    pub fn check_position(&self, pos: Position) -> Result<(), EditError> {
        if !self.is_attached(pos.container) {
            return Err(EditError::DetachedNode(pos.container));
        }
        let size = self.node_size(pos.container);
        if pos.offset > size {
            return Err(EditError::OffsetOutOfRange {
                node: pos.container,
                offset: pos.offset,
                size,
            });
        }
        Ok(())
    }

    /// Child-index path from the root down to `id`.
    pub fn path_of(&self, id: NodeId) -> Vec<usize> {
        let mut path: Vec<usize> = self
            .ancestors(id)
            .take_while(|&a| a != self.root)
            .map(|a| self.child_index(a))
            .collect();
        path.reverse();
        path
    }

    pub fn node_at_path(&self, path: &[usize]) -> Option<NodeId> {
        path.iter()
            .try_fold(self.root, |node, &index| self.child(node, index))
    }

    /// Parse `i/j/k:offset` into a position.
    ///
    /// The part before `:` is a child-index path from the root (empty for the
    /// root itself).
    pub fn resolve_path(&self, spec: &str) -> Result<Position, EditError> {
        let invalid = |reason: &str| EditError::InvalidPath {
            path: spec.to_string(),
            reason: reason.to_string(),
        };

        let (path, offset) = spec
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing ':offset'"))?;
        let offset: usize = offset
            .trim()
            .parse()
            .map_err(|_| invalid("offset is not a number"))?;
        let indices = path
            .split('/')
            .filter(|part| !part.trim().is_empty())
            .map(|part| part.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid("path segment is not a number"))?;
        let container = self
            .node_at_path(&indices)
            .ok_or_else(|| invalid("no node at path"))?;

        let pos = Position::new(container, offset);
        self.check_position(pos)?;
        Ok(pos)
    }

    /// Inverse of [`Tree::resolve_path`].
    pub fn path_string(&self, pos: Position) -> String {
        let path: Vec<String> = self
            .path_of(pos.container)
            .iter()
            .map(usize::to_string)
            .collect();
        format!("{}:{}", path.join("/"), pos.offset)
    }

    /// Deepest node containing both `a` and `b`.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let of_a: HashSet<NodeId> = self.ancestors(a).collect();
        self.ancestors(b).find(|n| of_a.contains(n))
    }

    // === Construction ===

    /// Create a detached element.
    pub fn new_element(&mut self, el: Element) -> NodeId {
        self.arena.new_node(NodeKind::Element(el))
    }

    /// Create a detached text node.
    pub fn new_text(&mut self, text: impl Into<String>) -> NodeId {
        self.arena.new_node(NodeKind::Text(text.into()))
    }

    pub fn new_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.arena.new_node(NodeKind::Comment(text.into()))
    }

    fn require_container(&self, parent: NodeId) -> Result<(), EditError> {
        if !self.is_attached(parent) {
            return Err(EditError::DetachedNode(parent));
        }
        match self.get(parent) {
            Some(NodeKind::Element(_)) => Ok(()),
            _ => Err(EditError::NotContainer(parent)),
        }
    }

    /// Append `child` (detaching it first) as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), EditError> {
        self.require_container(parent)?;
        if child == self.root || self.contains(child, parent) {
            return Err(EditError::NotContainer(parent));
        }
        child.detach(&mut self.arena);
        parent.append(child, &mut self.arena);
        Ok(())
    }

    /// Insert `child` (detaching it first) so that it ends up at `index`.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), EditError> {
        self.require_container(parent)?;
        if child == self.root || self.contains(child, parent) {
            return Err(EditError::NotContainer(parent));
        }
        let size = self.node_size(parent);
        if index > size {
            return Err(EditError::OffsetOutOfRange {
                node: parent,
                offset: index,
                size,
            });
        }
        child.detach(&mut self.arena);
        match self.child(parent, index) {
            Some(next) => next.insert_before(child, &mut self.arena),
            None => parent.append(child, &mut self.arena),
        }
        Ok(())
    }

    /// Replace the characters of a text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), EditError> {
        match self.get_mut(id) {
            Some(NodeKind::Text(buffer)) => {
                *buffer = text.into();
                Ok(())
            }
            _ => Err(EditError::NotText(id)),
        }
    }

    /// Replace the single character at `index` of a text node.
    pub(crate) fn replace_char(&mut self, id: NodeId, index: usize, ch: char) {
        if let Some(NodeKind::Text(buffer)) = self.get_mut(id) {
            let start = byte_index(buffer, index);
            if let Some(old) = buffer[start..].chars().next() {
                buffer.replace_range(start..start + old.len_utf8(), ch.encode_utf8(&mut [0; 4]));
            }
        }
    }

    /// Delete the character at `index` of a text node. Tracked positions
    /// after it in the same node shift left by one.
    pub(crate) fn remove_char_tracked(
        &mut self,
        id: NodeId,
        index: usize,
        tracked: &mut [Position],
    ) {
        let Some(NodeKind::Text(buffer)) = self.get_mut(id) else {
            return;
        };
        let start = byte_index(buffer, index);
        let Some(old) = buffer[start..].chars().next() else {
            return;
        };
        buffer.replace_range(start..start + old.len_utf8(), "");

        for pos in tracked.iter_mut() {
            if pos.container == id && pos.offset > index {
                pos.offset -= 1;
            }
        }
    }

    /// Insert `text` at `pos` and return the position just after it.
    ///
    /// In an element, text joins an adjacent text node when there is one.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Result<Position, EditError> {
        self.check_position(pos)?;

        if let Some(NodeKind::Text(buffer)) = self.get_mut(pos.container) {
            let at = byte_index(buffer, pos.offset);
            buffer.insert_str(at, text);
            return Ok(Position::new(pos.container, pos.offset + char_len(text)));
        }
        self.require_container(pos.container)?;

        let before = pos
            .offset
            .checked_sub(1)
            .and_then(|i| self.child(pos.container, i))
            .filter(|&n| self.is_text(n));
        if let Some(prev) = before {
            let end = self.node_size(prev);
            return self.insert_text(Position::new(prev, end), text);
        }

        let after = self
            .child(pos.container, pos.offset)
            .filter(|&n| self.is_text(n));
        if let Some(next) = after {
            return self.insert_text(Position::new(next, 0), text);
        }

        let node = self.new_text(text);
        self.insert_child(pos.container, pos.offset, node)?;
        Ok(Position::new(node, char_len(text)))
    }

    /// Make `pos` element-relative, splitting a text node if needed.
    ///
    /// Returns the slot between the two halves. A position at either end of
    /// a text node maps to the slot before or after it without splitting.
    pub fn split_text(&mut self, pos: Position) -> Result<Position, EditError> {
        self.split_at(pos).map(|(pos, _)| pos)
    }

    /// Like [`Tree::split_text`], also returning the node inserted by the
    /// split (it sits at the returned slot).
    pub(crate) fn split_at(
        &mut self,
        pos: Position,
    ) -> Result<(Position, Option<NodeId>), EditError> {
        self.check_position(pos)?;
        let Some(text) = self.text(pos.container) else {
            return Ok((pos, None));
        };

        let len = char_len(text);
        let left = self
            .left_pos(pos.container)
            .ok_or(EditError::DetachedNode(pos.container))?;
        if pos.offset == 0 {
            return Ok((left, None));
        }
        if pos.offset == len {
            return Ok((Position::new(left.container, left.offset + 1), None));
        }

        let at = byte_index(text, pos.offset);
        let tail = text[at..].to_string();
        let head = text[..at].to_string();
        self.set_text(pos.container, head)?;
        let tail_node = self.new_text(tail);
        pos.container.insert_after(tail_node, &mut self.arena);

        Ok((
            Position::new(left.container, left.offset + 1),
            Some(tail_node),
        ))
    }

    /// Insert a new element at `pos`, splitting text if needed.
    pub fn insert_element(&mut self, pos: Position, el: Element) -> Result<NodeId, EditError> {
        let slot = self.split_text(pos)?;
        let node = self.new_element(el);
        self.insert_child(slot.container, slot.offset, node)?;
        Ok(node)
    }

    /// Detach `id` from the tree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), EditError> {
        self.remove_tracked(id, &mut [])
    }

    /// Detach `id`, remapping `tracked` positions so they stay valid.
    ///
    /// Positions inside the removed subtree collapse to the slot it leaves
    /// behind; later slots in the parent shift left by one.
    pub fn remove_tracked(
        &mut self,
        id: NodeId,
        tracked: &mut [Position],
    ) -> Result<(), EditError> {
        if id == self.root {
            return Err(EditError::RootRemoval);
        }
        let slot = self.left_pos(id).ok_or(EditError::DetachedNode(id))?;
        if !self.is_attached(id) {
            return Err(EditError::DetachedNode(id));
        }

        for pos in tracked.iter_mut() {
            if self.contains(id, pos.container) {
                *pos = slot;
            } else if pos.container == slot.container && pos.offset > slot.offset {
                pos.offset -= 1;
            }
        }

        id.detach(&mut self.arena);
        Ok(())
    }

    /// Insert `child` at `index`, shifting tracked positions at or after it.
    pub(crate) fn insert_tracked(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
        tracked: &mut [Position],
    ) -> Result<(), EditError> {
        self.insert_child(parent, index, child)?;
        for pos in tracked.iter_mut() {
            if pos.container == parent && pos.offset > index {
                pos.offset += 1;
            }
        }
        Ok(())
    }

    /// Detach every child of `id`.
    pub(crate) fn clear_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            child.detach(&mut self.arena);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_tree_has_empty_root() {
        let tree = Tree::new();
        assert_eq!(tree.node_size(tree.root()), 0);
        assert!(tree.is_attached(tree.root()));
        assert_eq!(tree.tag(tree.root()), Some(&Tag::Root));
    }

    #[test]
    fn child_index_and_positions() {
        let tree = Tree::from_markup("<p>a</p><p>b</p><p>c</p>");
        let third = tree.child(tree.root(), 2).unwrap();
        assert_eq!(tree.child_index(third), 2);
        assert_eq!(tree.left_pos(third), Some(Position::new(tree.root(), 2)));
        assert_eq!(tree.right_pos(third), Some(Position::new(tree.root(), 3)));
        assert_eq!(tree.left_pos(tree.root()), None);
    }

    #[test]
    fn node_size_counts_chars_and_children() {
        let tree = Tree::from_markup("<p>a&nbsp;b<br></p>");
        let p = tree.child(tree.root(), 0).unwrap();
        let text = tree.child(p, 0).unwrap();
        assert_eq!(tree.node_size(p), 2);
        assert_eq!(tree.node_size(text), 3);
    }

    #[test]
    fn split_text_in_the_middle() {
        let mut tree = Tree::from_markup("<p>abcd</p>");
        let p = tree.child(tree.root(), 0).unwrap();
        let text = tree.child(p, 0).unwrap();

        let slot = tree.split_text(Position::new(text, 1)).unwrap();

        assert_eq!(slot, Position::new(p, 1));
        assert_eq!(tree.node_size(p), 2);
        assert_eq!(tree.text(text), Some("a"));
        assert_eq!(tree.to_markup(), "<p>abcd</p>");
    }

    #[test]
    fn split_text_at_edges_does_not_split() {
        let mut tree = Tree::from_markup("<p>ab</p>");
        let p = tree.child(tree.root(), 0).unwrap();
        let text = tree.child(p, 0).unwrap();

        assert_eq!(tree.split_text(Position::new(text, 0)).unwrap(), Position::new(p, 0));
        assert_eq!(tree.split_text(Position::new(text, 2)).unwrap(), Position::new(p, 1));
        assert_eq!(tree.node_size(p), 1);
    }

    #[test]
    fn insert_text_into_text_and_element() {
        let mut tree = Tree::from_markup("<p>ac</p><p></p>");
        let p = tree.child(tree.root(), 0).unwrap();
        let text = tree.child(p, 0).unwrap();
        let after = tree.insert_text(Position::new(text, 1), "b").unwrap();
        assert_eq!(after, Position::new(text, 2));

        let empty = tree.child(tree.root(), 1).unwrap();
        tree.insert_text(Position::new(empty, 0), "x").unwrap();
        assert_eq!(tree.to_markup(), "<p>abc</p><p>x</p>");
    }

    #[test]
    fn insert_text_joins_previous_text() {
        let mut tree = Tree::from_markup("<p>ab<br></p>");
        let p = tree.child(tree.root(), 0).unwrap();
        let after = tree.insert_text(Position::new(p, 1), "c").unwrap();
        assert_eq!(tree.node_size(p), 2);
        assert_eq!(after.offset, 3);
        assert_eq!(tree.to_markup(), "<p>abc<br></p>");
    }

    #[test]
    fn insert_element_splits_text() {
        let mut tree = Tree::from_markup("<p>ab</p>");
        let p = tree.child(tree.root(), 0).unwrap();
        let text = tree.child(p, 0).unwrap();
        tree.insert_element(Position::new(text, 1), Element::new(Tag::Br))
            .unwrap();
        assert_eq!(tree.to_markup(), "<p>a<br>b</p>");
    }

    #[test]
    fn remove_tracked_remaps_positions() {
        let mut tree = Tree::from_markup("<p>a<b>x</b>c</p>");
        let p = tree.child(tree.root(), 0).unwrap();
        let b = tree.child(p, 1).unwrap();
        let inner = tree.child(b, 0).unwrap();
        let mut tracked = [
            Position::new(p, 3),
            Position::new(inner, 1),
            Position::new(p, 1),
        ];

        tree.remove_tracked(b, &mut tracked).unwrap();

        assert_eq!(
            tracked,
            [Position::new(p, 2), Position::new(p, 1), Position::new(p, 1)]
        );
        assert!(!tree.is_attached(b));
        assert!(!tree.is_attached(inner));
        assert_eq!(tree.to_markup(), "<p>ac</p>");
    }

    #[test]
    fn remove_char_shifts_later_positions() {
        let mut tree = Tree::from_markup("<p>a\u{e9} b</p>");
        let p = tree.child(tree.root(), 0).unwrap();
        let text = tree.child(p, 0).unwrap();
        let mut tracked = [
            Position::new(text, 4),
            Position::new(text, 2),
            Position::new(p, 1),
        ];

        tree.remove_char_tracked(text, 2, &mut tracked);

        assert_eq!(tree.text(text), Some("a\u{e9}b"));
        assert_eq!(
            tracked,
            [Position::new(text, 3), Position::new(text, 2), Position::new(p, 1)]
        );
    }

    #[test]
    fn remove_root_is_an_error() {
        let mut tree = Tree::new();
        let root = tree.root();
        assert_eq!(tree.remove(root), Err(EditError::RootRemoval));
    }

    #[test]
    fn detached_positions_are_rejected() {
        let mut tree = Tree::from_markup("<p>a</p>");
        let p = tree.child(tree.root(), 0).unwrap();
        tree.remove(p).unwrap();
        assert_eq!(
            tree.check_position(Position::new(p, 0)),
            Err(EditError::DetachedNode(p))
        );
    }

    #[test]
    fn offsets_are_range_checked() {
        let tree = Tree::from_markup("<p>a</p>");
        let p = tree.child(tree.root(), 0).unwrap();
        assert!(matches!(
            tree.check_position(Position::new(p, 2)),
            Err(EditError::OffsetOutOfRange { offset: 2, size: 1, .. })
        ));
    }

    #[test]
    fn path_round_trip() {
        let tree = Tree::from_markup("<p>a<b>xy</b></p>");
        let pos = tree.resolve_path("0/1/0:2").unwrap();
        assert_eq!(tree.text(pos.container), Some("xy"));
        assert_eq!(tree.path_string(pos), "0/1/0:2");
        assert_eq!(tree.path_string(Position::new(tree.root(), 1)), ":1");
    }

    #[test]
    fn bad_paths() {
        let tree = Tree::from_markup("<p>a</p>");
        assert!(matches!(tree.resolve_path("0"), Err(EditError::InvalidPath { .. })));
        assert!(matches!(tree.resolve_path("7:0"), Err(EditError::InvalidPath { .. })));
        assert!(matches!(tree.resolve_path("x:0"), Err(EditError::InvalidPath { .. })));
        assert!(matches!(
            tree.resolve_path("0/0:9"),
            Err(EditError::OffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn common_ancestor_of_cousins() {
        let tree = Tree::from_markup("<div><p>a</p><p>b</p></div>");
        let div = tree.child(tree.root(), 0).unwrap();
        let a = tree.node_at_path(&[0, 0, 0]).unwrap();
        let b = tree.node_at_path(&[0, 1, 0]).unwrap();
        assert_eq!(tree.common_ancestor(a, b), Some(div));
        assert_eq!(tree.common_ancestor(a, a), Some(a));
    }

    #[test]
    fn post_order_visits_children_first() {
        let tree = Tree::from_markup("<p>a</p>");
        let p = tree.child(tree.root(), 0).unwrap();
        let a = tree.child(p, 0).unwrap();
        assert_eq!(tree.post_order(p), vec![a, p]);
    }
}
