//! # Grammar Rules
//!
//! Each function takes a `&mut Parser` and uses its methods to inspect the
//! current token, consume tokens and build structure through markers.
//!
//! - [`root`] - the whole fragment
//! - [`content`] - a run of children: elements, comments, character data
//! - [`element`] - start tags, attributes, end tags, comments, text
//!
//! Grammar functions are lenient: they always make progress and always
//! produce a tree, wrapping anything out of place in an `ERROR` node.

mod element;

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Tags that never take children, whether or not they are written `<x/>`.
pub(crate) const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Parse the root fragment.
pub fn root(p: &mut Parser<'_, '_>) {
    let m = p.start();
    content(p);
    m.complete(p, SyntaxKind::ROOT);
}

/// Parse children until end of input or an end tag for an open element.
fn content(p: &mut Parser<'_, '_>) {
    while !p.at_end() {
        match p.current() {
            SyntaxKind::LT_SLASH => {
                if p.nth(1) == SyntaxKind::NAME && p.is_open(p.nth_text(1)) {
                    return;
                }
                element::stray_end_tag(p);
            }
            SyntaxKind::LT if p.nth(1) == SyntaxKind::NAME => element::element(p),
            SyntaxKind::COMMENT_OPEN => element::comment(p),
            _ => element::text(p),
        }
    }
}
