//! # tessera-syntax
//!
//! A lossless syntax tree for the small HTML-like notation tessera uses to
//! write content trees down: test fixtures, CLI input files and debug output.
//! Built on [Rowan] + [Logos], following the [rust-analyzer] architecture.
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Events → Sink → Rowan Tree
//!               (Logos)          (Grammar)        (GreenNodeBuilder)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! Every byte becomes part of some token. Nothing is skipped, so the tree
//! text always equals the input.
//!
//! ```text
//! "<p>a&nbsp;b</p>" → [LT, NAME, GT, NAME, ENTITY, NAME, LT_SLASH, NAME, GT]
//! ```
//!
//! ### 2. Parser ([`parser`] module)
//!
//! Grammar functions emit Start/Token/Finish events through the marker
//! system. The parser recovers from missing end tags and stray markup
//! instead of failing.
//!
//! ### 3. Sink ([`parser::sink`] module)
//!
//! Replays events into a `GreenNodeBuilder`.
//!
//! ### Typed views ([`ast`] module)
//!
//! Thin wrappers (`Element`, `Attribute`, `TextNode`, `Comment`) that the
//! engine lowers into its arena tree.
//!
//! ## Quick Start
//!
//! ```
//! use tessera_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("<p>Hello <b>world</b></p>");
//! assert_eq!(tree.text().to_string(), "<p>Hello <b>world</b></p>");
//! assert_eq!(tree.kind(), SyntaxKind::ROOT);
//! let p = tree.children().next().unwrap();
//! assert_eq!(p.kind(), SyntaxKind::ELEMENT);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod syntax_kind;

pub use parser::parse;
pub use syntax_kind::{MarkupLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// Whether `tag` never takes children in the notation (`br`, `img`, ...).
pub fn is_void_tag(tag: &str) -> bool {
    let tag = tag.to_ascii_lowercase();
    parser::grammar::VOID_TAGS.binary_search(&tag.as_str()).is_ok()
}
