//! Typed views over the untyped CST.
//!
//! Each wrapper holds a [`SyntaxNode`] of a known kind and exposes the parts
//! a consumer cares about. Character references are returned raw; decoding
//! them is the consumer's business.

use crate::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

/// A child of the root or of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Element(Element),
    Text(TextNode),
    Comment(Comment),
}

impl Child {
    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::ELEMENT => Some(Self::Element(Element(node))),
            SyntaxKind::TEXT_NODE => Some(Self::Text(TextNode(node))),
            SyntaxKind::COMMENT => Some(Self::Comment(Comment(node))),
            _ => None,
        }
    }
}

/// Children of a `ROOT` node, skipping error nodes.
pub fn root_children(root: &SyntaxNode) -> impl Iterator<Item = Child> + use<> {
    root.children().filter_map(Child::cast)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element(SyntaxNode);

impl Element {
    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    fn start_tag(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::START_TAG)
    }

    /// The tag name as written in the start tag.
    pub fn tag_name(&self) -> Option<String> {
        self.start_tag()?
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.kind() == SyntaxKind::NAME)
            .map(|t| t.text().to_string())
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        self.start_tag()
            .map(|tag| {
                tag.children()
                    .filter(|n| n.kind() == SyntaxKind::ATTRIBUTE)
                    .map(Attribute)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn children(&self) -> impl Iterator<Item = Child> + use<> {
        self.0.children().filter_map(Child::cast)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute(SyntaxNode);

impl Attribute {
    fn tokens(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
    }

    pub fn name(&self) -> Option<String> {
        self.tokens()
            .find(|t| t.kind() == SyntaxKind::NAME)
            .map(|t| t.text().to_string())
    }

    /// The value with surrounding quotes removed; `None` for a bare attribute.
    pub fn value(&self) -> Option<String> {
        let mut after_eq = self.tokens().skip_while(|t| t.kind() != SyntaxKind::EQ);
        after_eq.next()?;
        let token = after_eq.find(|t| !t.kind().is_trivia())?;
        let text = token.text();
        if token.kind() == SyntaxKind::STRING && text.len() >= 2 {
            Some(text[1..text.len() - 1].to_string())
        } else {
            Some(text.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode(SyntaxNode);

impl TextNode {
    /// Source text, character references still encoded.
    pub fn raw(&self) -> String {
        self.0.text().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment(SyntaxNode);

impl Comment {
    /// Text between `<!--` and `-->`.
    pub fn body(&self) -> String {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| {
                !matches!(
                    t.kind(),
                    SyntaxKind::COMMENT_OPEN | SyntaxKind::COMMENT_CLOSE
                )
            })
            .map(|t| t.text().to_string())
            .collect()
    }
}
