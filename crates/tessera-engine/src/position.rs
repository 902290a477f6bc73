//! Positions, ranges and tree order.
//!
//! A [`Position`] is a `(container, offset)` pair. For a text container the
//! offset counts characters; for an element it counts child slots. Positions
//! hold arena handles, never references, so they can be checked against the
//! tree at the point of use ([`Tree::check_position`]).

use std::cmp::Ordering;

use indextree::NodeId;

use crate::tree::Tree;

/// Which way a query or traversal looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub container: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(container: NodeId, offset: usize) -> Self {
        Self { container, offset }
    }
}

/// An ordered pair of positions plus the direction of the gesture that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    start: Position,
    end: Position,
    backward: bool,
}

impl Range {
    /// Build a range from the user's anchor and focus, in either order.
    pub fn new(tree: &Tree, anchor: Position, focus: Position) -> Self {
        if compare_positions(tree, anchor, focus) == Ordering::Greater {
            Self {
                start: focus,
                end: anchor,
                backward: true,
            }
        } else {
            Self {
                start: anchor,
                end: focus,
                backward: false,
            }
        }
    }

    pub fn collapsed(at: Position) -> Self {
        Self {
            start: at,
            end: at,
            backward: false,
        }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// The focus came before the anchor.
    pub fn is_backward(&self) -> bool {
        self.backward
    }

    pub fn anchor(&self) -> Position {
        if self.backward { self.end } else { self.start }
    }

    pub fn focus(&self) -> Position {
        if self.backward { self.start } else { self.end }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn collapse_to_focus(&self) -> Self {
        Self::collapsed(self.focus())
    }
}

/// Order two positions in document order.
///
/// A position in an ancestor's child slot `k` sorts before everything inside
/// child `k` and after everything inside child `k - 1`.
pub fn compare_positions(tree: &Tree, a: Position, b: Position) -> Ordering {
    if a.container == b.container {
        return a.offset.cmp(&b.offset);
    }

    let path_a = tree.path_of(a.container);
    let path_b = tree.path_of(b.container);
    let common = path_a
        .iter()
        .zip(&path_b)
        .take_while(|(x, y)| x == y)
        .count();

    match (path_a.get(common), path_b.get(common)) {
        (None, None) => a.offset.cmp(&b.offset),
        (None, Some(&k)) => {
            if a.offset <= k {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (Some(&k), None) => {
            if b.offset <= k {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (Some(x), Some(y)) => x.cmp(y),
    }
}
