//! # Lexer - Tokenizing Markup Source
//!
//! This module provides the first stage of parsing: breaking source text into
//! tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte in the input appears in exactly one token. Nothing is skipped,
//! which is what lets a fixture be parsed and printed back byte for byte:
//!
//! ```
//! use tessera_syntax::lexer::lex;
//!
//! let input = "<p class=\"x\">a&nbsp;b</p>";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Context-Free Tokens
//!
//! The lexer does not know whether it is inside a tag or inside character
//! data. A word like `hello` is a `NAME` token in both places; the parser
//! decides whether it names an attribute or belongs to a text node. Characters
//! that no rule matches (a stray `"` or `/`) become `TEXT`.

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds produced by the Logos lexer.
///
/// This enum exists separately from [`SyntaxKind`] because Logos needs to
/// derive on it. Each variant maps to a corresponding `SyntaxKind` token.
///
/// [`SyntaxKind`]: crate::syntax_kind::SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Spaces, tabs and line endings
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    /// `<!--`
    #[token("<!--")]
    CommentOpen,

    /// `-->`
    #[token("-->")]
    CommentClose,

    /// `</`
    #[token("</")]
    LtSlash,

    /// `<`
    #[token("<")]
    Lt,

    /// `/>`
    #[token("/>")]
    SlashGt,

    /// `>`
    #[token(">")]
    Gt,

    /// `=`
    #[token("=")]
    Eq,

    /// Quoted attribute value
    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    String,

    /// Named or numeric character reference
    #[regex(r"&([A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);")]
    Entity,

    /// Names: letters, digits, underscores and inner dashes
    #[regex(r"[A-Za-z][A-Za-z0-9_]*(-[A-Za-z0-9_]+)*")]
    Name,

    /// Anything else that carries no markup meaning
    #[regex(r#"[^ \t\r\n<>&="'/A-Za-z]+"#)]
    Text,
}

impl TokenKind {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::CommentOpen => SyntaxKind::COMMENT_OPEN,
            TokenKind::CommentClose => SyntaxKind::COMMENT_CLOSE,
            TokenKind::LtSlash => SyntaxKind::LT_SLASH,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::SlashGt => SyntaxKind::SLASH_GT,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::String => SyntaxKind::STRING,
            TokenKind::Entity => SyntaxKind::ENTITY,
            TokenKind::Name => SyntaxKind::NAME,
            TokenKind::Text => SyntaxKind::TEXT,
        }
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    lex_with_spans(input)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

/// Lex and return tokens along with their byte spans.
pub fn lex_with_spans(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let kind = match result {
            Ok(token_kind) => token_kind.to_syntax_kind(),
            // Unmatched characters are character data
            Err(()) => SyntaxKind::TEXT,
        };
        tokens.push((Token { kind, text }, span));
    }

    tokens
}
