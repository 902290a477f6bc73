//! Resolving "one step" left or right of the caret for single-key deletes.

use indextree::NodeId;

use crate::content_type::{ContentType, classify, is_fake_br};
use crate::policy::EditingPolicy;
use crate::position::{Direction, Position, Range};
use crate::traversal::Walker;
use crate::tree::Tree;
use crate::tree::node::{CharClass, NodeKind};
use crate::tree::schema::is_opaque;

use super::cleanup::has_rendered_content;

/// Index of the first visible character of `text` met from `from` looking
/// `dir`, skipping zero-width and collapsed whitespace. Returns the
/// position just past it.
fn visible_char(
    tree: &Tree,
    policy: &EditingPolicy,
    text: NodeId,
    from: usize,
    dir: Direction,
) -> Option<Position> {
    let chars: Vec<char> = tree.text(text)?.chars().collect();
    let from = from.min(chars.len());
    let indices: Box<dyn Iterator<Item = usize>> = match dir {
        Direction::Right => Box::new(from..chars.len()),
        Direction::Left => Box::new((0..from).rev()),
    };
    for index in indices {
        let visible = match CharClass::of(chars[index]) {
            CharClass::ZeroWidth => false,
            CharClass::Visible | CharClass::HardSpace => true,
            CharClass::Collapsible => {
                classify(tree, policy.schema(), Position::new(text, index), Direction::Right)
                    == ContentType::SPACE
            }
        };
        if visible {
            let far = match dir {
                Direction::Right => index + 1,
                Direction::Left => index,
            };
            return Some(Position::new(text, far));
        }
    }
    None
}

/// The slot on the near or far side of `node` as seen when moving `dir`.
fn near_side(tree: &Tree, node: NodeId, dir: Direction) -> Option<Position> {
    match dir {
        Direction::Right => tree.left_pos(node),
        Direction::Left => tree.right_pos(node),
    }
}

fn far_side(tree: &Tree, node: NodeId, dir: Direction) -> Option<Position> {
    near_side(tree, node, dir.reverse())
}

/// A block whose only rendered content is this fake `<br>`.
fn is_lone_break(tree: &Tree, policy: &EditingPolicy, br: NodeId) -> bool {
    let block = policy.nearest_block(tree, br);
    block != tree.root() && !has_rendered_content(tree, policy, block)
}

/// The far end of a one-step deletion from `pos`, or `None` at the edge of
/// the document.
fn far_end(tree: &Tree, policy: &EditingPolicy, pos: Position, dir: Direction) -> Option<Position> {
    if tree.is_text(pos.container)
        && let Some(far) = visible_char(tree, policy, pos.container, pos.offset, dir)
    {
        return Some(far);
    }

    let origin_block = policy.nearest_block(tree, pos.container);
    let schema = policy.schema();
    let walker = Walker::new(tree, pos, dir)
        .leaf_only()
        .stop_traverse(move |tree, node| is_opaque(tree, schema, node));

    for leaf in walker {
        let switched = policy.nearest_block(tree, leaf) != origin_block;
        match tree.get(leaf) {
            Some(NodeKind::Text(_)) => {
                if switched {
                    return Some(match dir {
                        Direction::Right => tree.start_of(leaf),
                        Direction::Left => tree.end_of(leaf),
                    });
                }
                let from = match dir {
                    Direction::Right => 0,
                    Direction::Left => tree.node_size(leaf),
                };
                if let Some(far) = visible_char(tree, policy, leaf, from, dir) {
                    return Some(far);
                }
            }
            Some(NodeKind::Comment(_)) | None => {}
            Some(NodeKind::Element(el)) => {
                if el.is_br() {
                    if is_fake_br(tree, schema, leaf) {
                        if is_lone_break(tree, policy, leaf) {
                            return near_side(tree, leaf, dir);
                        }
                        continue;
                    }
                    return if switched {
                        near_side(tree, leaf, dir)
                    } else {
                        far_side(tree, leaf, dir)
                    };
                }
                if !policy.is_editable(tree, leaf) {
                    // Non-editable islands go as a whole.
                    return far_side(tree, leaf, dir);
                }
                let block = policy.is_block(tree, leaf);
                if policy.is_self_closing(tree, leaf) {
                    return if block || !switched {
                        far_side(tree, leaf, dir)
                    } else {
                        near_side(tree, leaf, dir)
                    };
                }
                if block {
                    // Empty block: stop at its edge.
                    return Some(tree.start_of(leaf));
                }
                // Empty inline: invisible.
            }
        }
    }
    None
}

/// The range a single Backspace (`Left`) or Delete (`Right`) at `pos`
/// removes, or `None` when there is nothing in that direction.
pub fn step_range(tree: &Tree, policy: &EditingPolicy, pos: Position, dir: Direction) -> Option<Range> {
    if tree.check_position(pos).is_err() {
        return None;
    }
    let far = far_end(tree, policy, pos, dir)?;
    Some(Range::new(tree, pos, far))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn step(markup: &str, at: &str, dir: Direction) -> Option<(String, String)> {
        let tree = Tree::from_markup(markup);
        let policy = EditingPolicy::default();
        let pos = tree.resolve_path(at).unwrap();
        step_range(&tree, &policy, pos, dir)
            .map(|r| (tree.path_string(r.start()), tree.path_string(r.end())))
    }

    #[rstest]
    #[case("<p>abc</p>", "0/0:2", Direction::Left, ("0/0:1", "0/0:2"))]
    #[case("<p>abc</p>", "0/0:2", Direction::Right, ("0/0:2", "0/0:3"))]
    #[case("<p>a&#8203;b</p>", "0/0:2", Direction::Left, ("0/0:0", "0/0:2"))]
    #[case("<p>a  b</p>", "0/0:3", Direction::Left, ("0/0:1", "0/0:3"))]
    #[case("<p>a<b>x</b></p>", "0/0:1", Direction::Right, ("0/0:1", "0/1/0:1"))]
    #[case("<p>foo</p><p>bar</p>", "1/0:0", Direction::Left, ("0/0:3", "1/0:0"))]
    #[case("<p>foo</p><p>bar</p>", "0/0:3", Direction::Right, ("0/0:3", "1/0:0"))]
    #[case("<p>a<br>b</p>", "0/2:0", Direction::Left, ("0:1", "0/2:0"))]
    #[case("<p><br></p><p>b</p>", "1/0:0", Direction::Left, ("0:1", "1/0:0"))]
    #[case("<p>a<img src=\"x\">b</p>", "0/2:0", Direction::Left, ("0:1", "0/2:0"))]
    #[case(
        "<p>a<span contenteditable=\"false\">xy</span>b</p>",
        "0/2:0",
        Direction::Left,
        ("0:1", "0/2:0")
    )]
    #[case("<p>a</p><hr><p>b</p>", "2/0:0", Direction::Left, (":1", "2/0:0"))]
    fn one_step(
        #[case] markup: &str,
        #[case] at: &str,
        #[case] dir: Direction,
        #[case] expected: (&str, &str),
    ) {
        let (start, end) = step(markup, at, dir).unwrap();
        assert_eq!((start.as_str(), end.as_str()), expected);
    }

    #[rstest]
    #[case("<p>abc</p>", "0/0:0", Direction::Left)]
    #[case("<p>abc</p>", "0/0:3", Direction::Right)]
    #[case("<p>a<br></p>", "0/0:1", Direction::Right)]
    #[case("<p>a<b></b></p>", "0/0:1", Direction::Right)]
    fn nothing_to_delete(#[case] markup: &str, #[case] at: &str, #[case] dir: Direction) {
        assert_eq!(step(markup, at, dir), None);
    }

    #[test]
    fn backward_range_keeps_gesture() {
        let tree = Tree::from_markup("<p>ab</p>");
        let policy = EditingPolicy::default();
        let pos = tree.resolve_path("0/0:2").unwrap();
        let range = step_range(&tree, &policy, pos, Direction::Left).unwrap();
        assert!(range.is_backward());
        assert_eq!(range.focus(), Position::new(pos.container, 1));
    }
}
