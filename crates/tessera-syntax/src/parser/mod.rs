//! # Parser - Event-Based Tree Construction
//!
//! This module turns a token stream into a syntax tree using the
//! **event-based** architecture from rust-analyzer: grammar functions emit a
//! flat list of [`Event`]s and the [`Sink`] replays them into a Rowan tree.
//!
//! Markup nests arbitrarily deep and real fixtures are often sloppy (missing
//! end tags, stray `<`), so the parser never fails. Every token ends up in
//! the tree; things it cannot place are wrapped in `ERROR` nodes.
//!
//! ## The Marker System
//!
//! `parser.start()` returns a [`Marker`] that **must** be either completed
//! with `marker.complete(parser, KIND)` or dropped explicitly with
//! `marker.abandon(parser)`. Dropping it silently panics, which catches
//! grammar bugs before they produce corrupt trees.
//!
//! ```ignore
//! let m = p.start();
//! p.bump(); // `<`
//! p.bump(); // `p`
//! m.complete(p, SyntaxKind::START_TAG);
//! ```
//!
//! ## Open Element Stack
//!
//! The parser remembers which elements are open so that an end tag closing
//! an outer element (`<p><b>x</p>`) implicitly closes the inner ones, the
//! way HTML parsers recover.
//!
//! ## Public API
//!
//! ```
//! use tessera_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("<p>Hello</p>");
//! assert_eq!(tree.kind(), SyntaxKind::ROOT);
//! ```

pub mod event;
pub mod sink;

pub(crate) mod grammar;

use crate::lexer::{Token, lex};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use event::Event;
use sink::Sink;

/// The parser state machine.
///
/// Holds the token stream, current position, accumulated events and the
/// names of the currently open elements.
pub struct Parser<'t, 'input> {
    tokens: &'t [Token<'input>],
    pos: usize,
    events: Vec<Event>,
    open: Vec<String>,
}

impl<'t, 'input> Parser<'t, 'input> {
    /// Create a new parser from a slice of tokens.
    pub fn new(tokens: &'t [Token<'input>]) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Parse the tokens and return a syntax tree.
    pub fn parse(mut self) -> SyntaxNode {
        grammar::root(&mut self);
        Sink::new(self.tokens).finish(self.events)
    }

    /// Start a new node and return a marker.
    pub fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Placeholder);
        Marker {
            pos,
            completed: false,
        }
    }

    /// Current token kind, or EOF if past end.
    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Look ahead n tokens.
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map_or(SyntaxKind::EOF, |t| t.kind)
    }

    /// Text of the token n positions ahead, or `""` past the end.
    pub fn nth_text(&self, n: usize) -> &'input str {
        self.tokens.get(self.pos + n).map_or("", |t| t.text)
    }

    /// Check if at end of input.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Check if current token is of given kind.
    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the current token unconditionally.
    pub fn bump(&mut self) {
        if !self.at_end() {
            let kind = self.current();
            self.bump_as(kind);
        }
    }

    /// Consume the current token, recording it under a different kind.
    pub fn bump_as(&mut self, kind: SyntaxKind) {
        if !self.at_end() {
            self.events.push(Event::token(kind));
            self.pos += 1;
        }
    }

    /// Push an element name onto the open element stack.
    pub fn push_open(&mut self, name: &str) {
        self.open.push(name.to_ascii_lowercase());
    }

    /// Pop the innermost open element.
    pub fn pop_open(&mut self) {
        self.open.pop();
    }

    /// Name of the innermost open element.
    pub fn innermost_open(&self) -> Option<&str> {
        self.open.last().map(String::as_str)
    }

    /// Whether any open element carries `name`.
    pub fn is_open(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.open.iter().any(|open| *open == name)
    }
}

/// A marker for a node being constructed.
///
/// Points at the `Placeholder` event pushed by [`Parser::start`].
#[must_use = "Markers must be completed or abandoned, dropping them is a bug"]
pub struct Marker {
    pos: usize,
    completed: bool,
}

impl Marker {
    /// Complete this marker, creating a node of the given kind.
    pub fn complete(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) {
        self.completed = true;
        let event_at_pos = &mut p.events[self.pos];
        assert!(matches!(event_at_pos, Event::Placeholder));
        *event_at_pos = Event::start(kind);
        p.events.push(Event::Finish);
    }

    /// Abandon this marker without creating a node.
    ///
    /// The placeholder is removed when nothing was pushed after it,
    /// otherwise it stays behind as an inert event.
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.completed = true;
        if self.pos + 1 == p.events.len() {
            p.events.pop();
        }
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}

/// Parse markup source into a syntax tree.
pub fn parse(source: &str) -> SyntaxNode {
    let tokens = lex(source);
    Parser::new(&tokens).parse()
}
