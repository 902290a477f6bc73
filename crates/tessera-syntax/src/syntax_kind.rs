//! SyntaxKind enum for all tokens and nodes in the markup CST.
//!
//! Following the rust-analyzer model, all tokens and nodes share a single enum.
//! Every byte in the source must appear as a token in the tree.

/// All syntax kinds for the markup CST.
///
/// This enum represents both tokens (lexer output) and composite nodes (parser output).
/// The `repr(u16)` ensures efficient storage in rowan's green tree.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Tokens (lexer output) ===
    /// Spaces, tabs and line endings
    WHITESPACE,
    /// Run of text characters that cannot start a name
    TEXT,
    /// Tag or attribute name (also plain words in content)
    NAME,
    /// `<` opening a start tag
    LT,
    /// `</` opening an end tag
    LT_SLASH,
    /// `>` closing a tag
    GT,
    /// `/>` closing a self-closing tag
    SLASH_GT,
    /// `=` between attribute name and value
    EQ,
    /// Quoted attribute value
    STRING,
    /// Character reference such as `&nbsp;` or `&#8203;`
    ENTITY,
    /// `<!--`
    COMMENT_OPEN,
    /// `-->`
    COMMENT_CLOSE,
    /// End of file marker
    EOF,

    // === Composite Nodes (parser output) ===
    /// Root of the parsed fragment
    ROOT,
    /// Element: start tag, children, optional end tag
    ELEMENT,
    /// `<tag attr="v">`
    START_TAG,
    /// `</tag>`
    END_TAG,
    /// `name="value"` or a bare `name`
    ATTRIBUTE,
    /// Character data between tags
    TEXT_NODE,
    /// `<!-- ... -->`
    COMMENT,

    /// Error recovery node
    ERROR,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token (lexer output).
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia inside a tag.
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkupLang {}

impl rowan::Language for MarkupLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::ERROR as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<MarkupLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<MarkupLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<MarkupLang>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn token_kinds_are_tokens() {
        assert!(SyntaxKind::WHITESPACE.is_token());
        assert!(SyntaxKind::ENTITY.is_token());
        assert!(SyntaxKind::EOF.is_token());
    }

    #[test]
    fn node_kinds_are_nodes() {
        assert!(SyntaxKind::ROOT.is_node());
        assert!(SyntaxKind::ELEMENT.is_node());
        assert!(SyntaxKind::COMMENT.is_node());
    }

    #[test]
    fn rowan_conversion_roundtrip() {
        let kind = SyntaxKind::START_TAG;
        let raw: rowan::SyntaxKind = kind.into();
        let back = MarkupLang::kind_from_raw(raw);
        assert_eq!(kind, back);
    }
}
