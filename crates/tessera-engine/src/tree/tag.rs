use std::fmt;

/// Element tag identity.
///
/// Known HTML tags get their own variant so schema predicates are exhaustive
/// matches; anything else is kept verbatim (lowercased) in [`Tag::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// The invisible tree root. Never printed.
    Root,
    // Blocks
    P,
    Div,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Ul,
    Ol,
    Li,
    Table,
    Thead,
    Tbody,
    Tr,
    Td,
    Th,
    Blockquote,
    Pre,
    Section,
    Article,
    Header,
    Footer,
    Hr,
    // Inlines
    Span,
    A,
    B,
    Strong,
    I,
    Em,
    U,
    S,
    Code,
    Sub,
    Sup,
    // Void inlines
    Br,
    Img,
    Input,
    Wbr,
    Other(String),
}

impl Tag {
    pub fn parse(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "p" => Tag::P,
            "div" => Tag::Div,
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "h4" => Tag::H4,
            "h5" => Tag::H5,
            "h6" => Tag::H6,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "table" => Tag::Table,
            "thead" => Tag::Thead,
            "tbody" => Tag::Tbody,
            "tr" => Tag::Tr,
            "td" => Tag::Td,
            "th" => Tag::Th,
            "blockquote" => Tag::Blockquote,
            "pre" => Tag::Pre,
            "section" => Tag::Section,
            "article" => Tag::Article,
            "header" => Tag::Header,
            "footer" => Tag::Footer,
            "hr" => Tag::Hr,
            "span" => Tag::Span,
            "a" => Tag::A,
            "b" => Tag::B,
            "strong" => Tag::Strong,
            "i" => Tag::I,
            "em" => Tag::Em,
            "u" => Tag::U,
            "s" => Tag::S,
            "code" => Tag::Code,
            "sub" => Tag::Sub,
            "sup" => Tag::Sup,
            "br" => Tag::Br,
            "img" => Tag::Img,
            "input" => Tag::Input,
            "wbr" => Tag::Wbr,
            _ => Tag::Other(lower),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tag::Root => "#root",
            Tag::P => "p",
            Tag::Div => "div",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::H4 => "h4",
            Tag::H5 => "h5",
            Tag::H6 => "h6",
            Tag::Ul => "ul",
            Tag::Ol => "ol",
            Tag::Li => "li",
            Tag::Table => "table",
            Tag::Thead => "thead",
            Tag::Tbody => "tbody",
            Tag::Tr => "tr",
            Tag::Td => "td",
            Tag::Th => "th",
            Tag::Blockquote => "blockquote",
            Tag::Pre => "pre",
            Tag::Section => "section",
            Tag::Article => "article",
            Tag::Header => "header",
            Tag::Footer => "footer",
            Tag::Hr => "hr",
            Tag::Span => "span",
            Tag::A => "a",
            Tag::B => "b",
            Tag::Strong => "strong",
            Tag::I => "i",
            Tag::Em => "em",
            Tag::U => "u",
            Tag::S => "s",
            Tag::Code => "code",
            Tag::Sub => "sub",
            Tag::Sup => "sup",
            Tag::Br => "br",
            Tag::Img => "img",
            Tag::Input => "input",
            Tag::Wbr => "wbr",
            Tag::Other(name) => name,
        }
    }

    /// Block-level in plain HTML rendering.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Tag::Root
                | Tag::P
                | Tag::Div
                | Tag::H1
                | Tag::H2
                | Tag::H3
                | Tag::H4
                | Tag::H5
                | Tag::H6
                | Tag::Ul
                | Tag::Ol
                | Tag::Li
                | Tag::Table
                | Tag::Thead
                | Tag::Tbody
                | Tag::Tr
                | Tag::Td
                | Tag::Th
                | Tag::Blockquote
                | Tag::Pre
                | Tag::Section
                | Tag::Article
                | Tag::Header
                | Tag::Footer
                | Tag::Hr
        )
    }

    /// Never takes children.
    pub fn is_void(&self) -> bool {
        matches!(
            self,
            Tag::Hr | Tag::Br | Tag::Img | Tag::Input | Tag::Wbr
        ) || matches!(self, Tag::Other(name) if tessera_syntax::is_void_tag(name))
    }

    /// Blocks that only make sense with children (lists, table rows).
    ///
    /// When left empty these are removed rather than given a placeholder.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Tag::Ul | Tag::Ol | Tag::Table | Tag::Thead | Tag::Tbody | Tag::Tr
        )
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
