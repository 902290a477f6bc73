//! Sink for converting parser events into a Rowan green tree.

use rowan::GreenNodeBuilder;

use crate::lexer::Token;
use crate::parser::event::Event;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// Converts parser events and tokens into a Rowan syntax tree.
pub struct Sink<'t, 'input> {
    builder: GreenNodeBuilder<'static>,
    tokens: &'t [Token<'input>],
    cursor: usize,
    depth: usize,
}

impl<'t, 'input> Sink<'t, 'input> {
    /// Create a new sink over the lexed tokens.
    pub fn new(tokens: &'t [Token<'input>]) -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
            tokens,
            cursor: 0,
            depth: 0,
        }
    }

    /// Replay `events` and build the syntax tree.
    pub fn finish(mut self, events: Vec<Event>) -> SyntaxNode {
        for event in events {
            match event {
                Event::Start { kind } => {
                    self.depth += 1;
                    self.builder.start_node(kind.into());
                }
                Event::Token { kind, n_raw_tokens } => {
                    self.token(kind, usize::from(n_raw_tokens));
                }
                Event::Finish => {
                    debug_assert!(self.depth > 0, "Finish without matching Start");
                    self.depth = self.depth.saturating_sub(1);
                    self.builder.finish_node();
                }
                Event::Placeholder => {}
            }
        }

        debug_assert_eq!(self.cursor, self.tokens.len(), "tokens left unconsumed");
        SyntaxNode::new_root(self.builder.finish())
    }

    fn token(&mut self, kind: SyntaxKind, n_raw_tokens: usize) {
        let end = (self.cursor + n_raw_tokens).min(self.tokens.len());
        let text: String = self.tokens[self.cursor..end]
            .iter()
            .map(|t| t.text)
            .collect();
        self.cursor = end;
        self.builder.token(kind.into(), &text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    #[test]
    fn sink_builds_simple_tree() {
        let tokens = lex("hello");
        let events = vec![
            Event::start(SyntaxKind::ROOT),
            Event::start(SyntaxKind::TEXT_NODE),
            Event::token(SyntaxKind::NAME),
            Event::Finish,
            Event::Finish,
        ];

        let tree = Sink::new(&tokens).finish(events);

        assert_eq!(tree.kind(), SyntaxKind::ROOT);
        assert_eq!(tree.children().count(), 1);
    }

    #[test]
    fn sink_glues_raw_tokens() {
        let input = "a b";
        let tokens = lex(input);
        let events = vec![
            Event::start(SyntaxKind::ROOT),
            Event::Token {
                kind: SyntaxKind::TEXT,
                n_raw_tokens: 3,
            },
            Event::Finish,
        ];

        let tree = Sink::new(&tokens).finish(events);

        assert_eq!(tree.text().to_string(), input);
        let token = tree.first_token().map(|t| t.kind());
        assert_eq!(token, Some(SyntaxKind::TEXT));
    }

    #[test]
    fn sink_ignores_placeholders() {
        let tokens = lex("x");
        let events = vec![
            Event::start(SyntaxKind::ROOT),
            Event::Placeholder,
            Event::token(SyntaxKind::NAME),
            Event::Finish,
        ];

        let tree = Sink::new(&tokens).finish(events);

        assert_eq!(tree.children().count(), 0);
        assert_eq!(tree.text().to_string(), "x");
    }
}
