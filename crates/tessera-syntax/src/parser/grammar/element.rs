//! # Element-Level Grammar
//!
//! | Token | Construct |
//! |-------|-----------|
//! | `<` + name | element (start tag, children, end tag) |
//! | `</` | end tag, or `ERROR` when nothing it names is open |
//! | `<!--` | comment |
//! | (other) | character data |
//!
//! Missing end tags are tolerated: an element ends at the end tag of any
//! enclosing element or at end of input.

use super::{VOID_TAGS, content};
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Parse an element starting at `<name`.
pub(super) fn element(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let name = p.nth_text(1).to_ascii_lowercase();

    let self_closing = start_tag(p);
    if self_closing || VOID_TAGS.binary_search(&name.as_str()).is_ok() {
        m.complete(p, SyntaxKind::ELEMENT);
        return;
    }

    p.push_open(&name);
    content(p);
    p.pop_open();

    if p.at(SyntaxKind::LT_SLASH) && p.nth_text(1).eq_ignore_ascii_case(&name) {
        end_tag(p);
    }
    m.complete(p, SyntaxKind::ELEMENT);
}

/// Parse `<name attrs... >` and report whether it was written `/>`.
fn start_tag(p: &mut Parser<'_, '_>) -> bool {
    let m = p.start();
    p.bump(); // `<`
    p.bump(); // name

    let mut self_closing = false;
    loop {
        match p.current() {
            SyntaxKind::WHITESPACE => p.bump(),
            SyntaxKind::NAME => attribute(p),
            SyntaxKind::GT => {
                p.bump();
                break;
            }
            SyntaxKind::SLASH_GT => {
                p.bump();
                self_closing = true;
                break;
            }
            // Unterminated tag: leave the rest to the content rule
            SyntaxKind::EOF
            | SyntaxKind::LT
            | SyntaxKind::LT_SLASH
            | SyntaxKind::COMMENT_OPEN => break,
            _ => {
                let e = p.start();
                p.bump();
                e.complete(p, SyntaxKind::ERROR);
            }
        }
    }

    m.complete(p, SyntaxKind::START_TAG);
    self_closing
}

/// Parse `name`, `name=value` or `name = "value"`.
fn attribute(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump();

    if p.at(SyntaxKind::WHITESPACE) && p.nth(1) == SyntaxKind::EQ {
        p.bump();
    }
    if p.eat(SyntaxKind::EQ) {
        p.eat(SyntaxKind::WHITESPACE);
        if matches!(
            p.current(),
            SyntaxKind::STRING | SyntaxKind::NAME | SyntaxKind::TEXT
        ) {
            p.bump();
        }
    }

    m.complete(p, SyntaxKind::ATTRIBUTE);
}

fn end_tag(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(); // `</`
    p.eat(SyntaxKind::NAME);
    p.eat(SyntaxKind::WHITESPACE);
    p.eat(SyntaxKind::GT);
    m.complete(p, SyntaxKind::END_TAG);
}

/// An end tag that closes nothing.
pub(super) fn stray_end_tag(p: &mut Parser<'_, '_>) {
    let m = p.start();
    end_tag(p);
    m.complete(p, SyntaxKind::ERROR);
}

/// Parse `<!-- ... -->`; an unclosed comment runs to end of input.
pub(super) fn comment(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump();
    while !p.at_end() && !p.at(SyntaxKind::COMMENT_CLOSE) {
        p.bump();
    }
    p.eat(SyntaxKind::COMMENT_CLOSE);
    m.complete(p, SyntaxKind::COMMENT);
}

/// Parse character data up to the next tag or comment.
///
/// Markup punctuation that does not start a construct (`a < b`, a lone `>`)
/// is re-tagged as `TEXT`.
pub(super) fn text(p: &mut Parser<'_, '_>) {
    let m = p.start();
    while !p.at_end() {
        match p.current() {
            SyntaxKind::LT_SLASH | SyntaxKind::COMMENT_OPEN => break,
            SyntaxKind::LT if p.nth(1) == SyntaxKind::NAME => break,
            SyntaxKind::NAME | SyntaxKind::WHITESPACE | SyntaxKind::ENTITY | SyntaxKind::TEXT => {
                p.bump();
            }
            _ => p.bump_as(SyntaxKind::TEXT),
        }
    }
    m.complete(p, SyntaxKind::TEXT_NODE);
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::syntax_kind::{SyntaxKind, SyntaxNode};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn first_element(tree: &SyntaxNode) -> SyntaxNode {
        tree.children()
            .find(|n| n.kind() == SyntaxKind::ELEMENT)
            .unwrap()
    }

    #[rstest]
    #[case("<br>")]
    #[case("<br/>")]
    #[case("<img src=\"a.png\">")]
    fn void_elements_take_no_children(#[case] input: &str) {
        let tree = parse(&format!("{input}text"));
        let element = first_element(&tree);
        assert_eq!(element.children().count(), 1);
        assert_eq!(tree.children().count(), 2);
    }

    #[test]
    fn missing_end_tag_closed_by_outer() {
        let tree = parse("<p><b>x</p>y");
        let p = first_element(&tree);
        let b = first_element(&p);
        assert_eq!(b.text().to_string(), "<b>x");
        assert_eq!(p.text().to_string(), "<p><b>x</p>");
    }

    #[test]
    fn attribute_forms() {
        let tree = parse("<a href=\"x\" data-n=1 hidden>");
        let start = first_element(&tree).children().next().unwrap();
        let attrs: Vec<_> = start
            .children()
            .filter(|n| n.kind() == SyntaxKind::ATTRIBUTE)
            .map(|n| n.text().to_string())
            .collect();
        assert_eq!(attrs, vec!["href=\"x\"", "data-n=1", "hidden"]);
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        let tree = parse("a < b");
        let kinds: Vec<_> = tree.children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::TEXT_NODE]);
        assert_eq!(tree.text().to_string(), "a < b");
    }

    #[test]
    fn comment_node() {
        let tree = parse("<!-- note -->x");
        let kinds: Vec<_> = tree.children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::COMMENT, SyntaxKind::TEXT_NODE]);
    }

    #[test]
    fn unclosed_comment_runs_to_end() {
        let input = "<!-- never closed <p>x</p>";
        let tree = parse(input);
        assert_eq!(tree.children().count(), 1);
        assert_eq!(tree.text().to_string(), input);
    }
}
