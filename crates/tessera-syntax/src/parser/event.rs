//! # Parser Events
//!
//! Events are the intermediate representation between parsing and tree building.
//! Instead of building the tree directly, the parser emits a **flat sequence**
//! of events that describe the tree structure:
//!
//! ```text
//! Start(ELEMENT)     ← Begin an ELEMENT node
//!   Start(START_TAG)
//!     Token(LT)      ← Add an LT token
//!     Token(NAME)
//!     Token(GT)
//!   Finish
//! Finish             ← End the ELEMENT node
//! ```
//!
//! The Sink processes these in order, maintaining a stack of open nodes.
//! Start pushes, Finish pops. Markup has no left-recursive constructs, so
//! unlike an expression grammar there is no need to wrap already-finished
//! nodes after the fact.

use crate::syntax_kind::SyntaxKind;

/// An event emitted by the parser during tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new composite node of the given kind.
    Start { kind: SyntaxKind },

    /// Add a token to the current node.
    ///
    /// `kind` may differ from the lexer's kind: inside a start tag a `NAME`
    /// stays a `NAME`, while a stray `LT` in character data is re-tagged as
    /// `TEXT`. `n_raw_tokens` says how many lexer tokens are glued together.
    Token { kind: SyntaxKind, n_raw_tokens: u8 },

    /// Finish the current node.
    Finish,

    /// Reserved slot for a node that has been started but not completed.
    ///
    /// `marker.complete()` turns it into a `Start`; an abandoned marker
    /// leaves it behind and the Sink ignores it.
    Placeholder,
}

impl Event {
    /// Create a start event.
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start { kind }
    }

    /// Create a token event for a single raw token.
    pub fn token(kind: SyntaxKind) -> Self {
        Event::Token {
            kind,
            n_raw_tokens: 1,
        }
    }
}
