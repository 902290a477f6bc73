//! # Content-type classification
//!
//! Looking from a position in one direction, what is met first?
//!
//! | type | meaning |
//! |------|---------|
//! | `CONTENT` | a visible character or an atomic element |
//! | `SPACE` | whitespace that renders (collapsible with content on both sides, or NBSP) |
//! | `BR` | a line break that renders |
//! | `BLOCK_OUTSIDE` | the edge of a block |
//! | `BLOCK_INSIDE` | the end of the document or scope |
//!
//! Invisible things are looked through: zero-width characters, fake `<br>`s,
//! collapsed whitespace, comments and empty inline elements.
//!
//! A collapsible run seen looking right renders only if the content on the
//! left of the starting position is content-like, which is itself a left
//! classification. Left classification never asks the right one, and both
//! are memoized per [`Classifier`], so the mutual dependency terminates.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::iter::Peekable;

use bitflags::bitflags;
use indextree::NodeId;

use crate::position::{Direction, Position};
use crate::restore::Anchor;
use crate::traversal::{StopReason, Walker};
use crate::tree::Tree;
use crate::tree::node::{CharClass, NodeKind};
use crate::tree::schema::{Schema, is_block, is_opaque};

bitflags! {
    /// What a position sees in one direction.
    ///
    /// A classification is always exactly one of the single flags; the
    /// group constants are masks for matching.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContentType: u8 {
        const CONTENT       = 0b0_0001;
        const SPACE         = 0b0_0010;
        const BLOCK_OUTSIDE = 0b0_0100;
        const BLOCK_INSIDE  = 0b0_1000;
        const BR            = 0b1_0000;

        const INLINE = Self::CONTENT.bits() | Self::SPACE.bits();
        const BLOCK = Self::BLOCK_OUTSIDE.bits() | Self::BLOCK_INSIDE.bits();
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
        if names.is_empty() {
            f.write_str("NONE")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

/// One step of a raw scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    Char {
        node: NodeId,
        index: usize,
        class: CharClass,
    },
    Br(NodeId),
    Atomic(NodeId),
    End(StopReason),
}

impl Token {
    /// Something that holds whitespace open on its side.
    fn is_content_like(&self) -> bool {
        matches!(
            self,
            Token::Char {
                class: CharClass::Visible | CharClass::HardSpace,
                ..
            } | Token::Atomic(_)
        )
    }

    fn is_skippable_space(&self) -> bool {
        matches!(
            self,
            Token::Char {
                class: CharClass::Collapsible | CharClass::ZeroWidth,
                ..
            }
        )
    }
}

/// Raw token stream in one direction, stopping at block edges.
///
/// Characters of the starting text node come first (from the offset on),
/// then the leaves met by a block-stopping [`Walker`]. The stream ends with
/// one [`Token::End`].
pub(crate) struct Scanner<'t> {
    tree: &'t Tree,
    schema: &'t dyn Schema,
    dir: Direction,
    walker: Walker<'t>,
    pending: VecDeque<Token>,
    finished: bool,
}

impl<'t> Scanner<'t> {
    pub(crate) fn new(tree: &'t Tree, schema: &'t dyn Schema, from: Position, dir: Direction) -> Self {
        let walker = Walker::new(tree, from, dir)
            .leaf_only()
            .stop(move |tree, node| is_block(tree, schema, node))
            .stop_traverse(move |tree, node| is_opaque(tree, schema, node));
        let mut scanner = Self {
            tree,
            schema,
            dir,
            walker,
            pending: VecDeque::new(),
            finished: false,
        };
        if tree.is_text(from.container) {
            scanner.queue_chars(from.container, Some(from.offset));
        }
        scanner
    }

    /// Queue the characters of `node` in scan order, starting at `from`
    /// (or at the near edge).
    fn queue_chars(&mut self, node: NodeId, from: Option<usize>) {
        let Some(text) = self.tree.text(node) else {
            return;
        };
        let chars: Vec<char> = text.chars().collect();
        let token = |index: usize| Token::Char {
            node,
            index,
            class: CharClass::of(chars[index]),
        };
        match self.dir {
            Direction::Right => {
                let start = from.unwrap_or(0).min(chars.len());
                self.pending.extend((start..chars.len()).map(token));
            }
            Direction::Left => {
                let end = from.unwrap_or(chars.len()).min(chars.len());
                self.pending.extend((0..end).rev().map(token));
            }
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.finished {
                return None;
            }
            let Some(node) = self.walker.next() else {
                self.finished = true;
                let reason = self.walker.reason().unwrap_or(StopReason::Exhausted);
                return Some(Token::End(reason));
            };
            match self.tree.get(node) {
                Some(NodeKind::Text(_)) => self.queue_chars(node, None),
                Some(NodeKind::Element(el)) if el.is_br() => return Some(Token::Br(node)),
                // Otherwise an element leaf is opaque or empty
                Some(NodeKind::Element(_)) if is_opaque(self.tree, self.schema, node) => {
                    return Some(Token::Atomic(node));
                }
                _ => {}
            }
        }
    }
}

/// Raw scan right from `pos` past whitespace finds something content-like.
fn content_follows(tree: &Tree, schema: &dyn Schema, pos: Position) -> bool {
    Scanner::new(tree, schema, pos, Direction::Right)
        .find(|token| !token.is_skippable_space())
        .is_some_and(|token| token.is_content_like())
}

/// A `<br>` with nothing rendered after it in its block.
///
/// It only keeps an otherwise empty line open; it adds no line of its own.
pub fn is_fake_br(tree: &Tree, schema: &dyn Schema, br: NodeId) -> bool {
    let Some(after) = tree.right_pos(br) else {
        return true;
    };
    !Scanner::new(tree, schema, after, Direction::Right)
        .find(|token| !token.is_skippable_space())
        .is_some_and(|token| token.is_content_like() || matches!(token, Token::Br(_)))
}

#[derive(Debug, Clone, Copy)]
struct Class {
    ctype: ContentType,
    /// The first thing seen was an NBSP.
    hard_edge: bool,
}

impl Class {
    fn of(ctype: ContentType) -> Self {
        Self {
            ctype,
            hard_edge: false,
        }
    }

    fn holds_space_open(self) -> bool {
        self.ctype == ContentType::CONTENT || (self.ctype == ContentType::SPACE && self.hard_edge)
    }
}

/// A classification together with its boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub content_type: ContentType,
    /// Sits on the far side of the classified position and survives edits
    /// on the classified side.
    pub boundary: Anchor,
}

/// Memoizing classifier over one unchanging tree.
///
/// Create a fresh one after every mutation.
pub struct Classifier<'t> {
    tree: &'t Tree,
    schema: &'t dyn Schema,
    cache: HashMap<(Position, Direction), Class>,
}

impl<'t> Classifier<'t> {
    pub fn new(tree: &'t Tree, schema: &'t dyn Schema) -> Self {
        Self {
            tree,
            schema,
            cache: HashMap::new(),
        }
    }

    pub fn classify(&mut self, pos: Position, dir: Direction) -> ContentType {
        self.class_of(pos, dir).ctype
    }

    /// Like [`Classifier::classify`], also naming the boundary to
    /// re-classify from once the tree has changed.
    pub fn classify_with_boundary(&mut self, pos: Position, dir: Direction) -> Classification {
        Classification {
            content_type: self.classify(pos, dir),
            boundary: Anchor::for_point(self.tree, pos, dir),
        }
    }

    fn class_of(&mut self, pos: Position, dir: Direction) -> Class {
        if let Some(class) = self.cache.get(&(pos, dir)) {
            return *class;
        }
        let class = self.scan(pos, dir);
        log::trace!("classify {pos:?} {dir:?} -> {}", class.ctype);
        self.cache.insert((pos, dir), class);
        class
    }

    fn scan(&mut self, pos: Position, dir: Direction) -> Class {
        let (tree, schema) = (self.tree, self.schema);
        let mut tokens: Peekable<Scanner<'t>> = Scanner::new(tree, schema, pos, dir).peekable();

        while let Some(token) = tokens.next() {
            match token {
                Token::Char { class, .. } => match class {
                    CharClass::ZeroWidth => {}
                    CharClass::Visible => return Class::of(ContentType::CONTENT),
                    CharClass::HardSpace => {
                        return Class {
                            ctype: ContentType::SPACE,
                            hard_edge: true,
                        };
                    }
                    CharClass::Collapsible => {
                        while tokens.next_if(Token::is_skippable_space).is_some() {}
                        let beyond = tokens.peek().is_some_and(Token::is_content_like);
                        let visible = beyond
                            && match dir {
                                Direction::Right => {
                                    self.class_of(pos, Direction::Left).holds_space_open()
                                }
                                Direction::Left => content_follows(tree, schema, pos),
                            };
                        if visible {
                            return Class::of(ContentType::SPACE);
                        }
                    }
                },
                Token::Atomic(_) => return Class::of(ContentType::CONTENT),
                Token::Br(br) => {
                    if !is_fake_br(tree, schema, br) {
                        return Class::of(ContentType::BR);
                    }
                }
                Token::End(StopReason::BlockHit) => return Class::of(ContentType::BLOCK_OUTSIDE),
                Token::End(_) => return Class::of(ContentType::BLOCK_INSIDE),
            }
        }
        Class::of(ContentType::BLOCK_INSIDE)
    }
}

/// One-off classification.
pub fn classify(tree: &Tree, schema: &dyn Schema, pos: Position, dir: Direction) -> ContentType {
    Classifier::new(tree, schema).classify(pos, dir)
}

/// One-off classification with its boundary.
pub fn classify_with_boundary(
    tree: &Tree,
    schema: &dyn Schema,
    pos: Position,
    dir: Direction,
) -> Classification {
    Classifier::new(tree, schema).classify_with_boundary(pos, dir)
}
