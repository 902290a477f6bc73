use std::collections::{BTreeMap, BTreeSet};

use super::tag::Tag;

/// Non-breaking space: visible, never collapses.
pub const NBSP: char = '\u{a0}';
/// Zero-width space: used as an inline placeholder.
pub const ZWSP: char = '\u{200b}';
/// Byte order mark, treated as zero-width content.
pub const BOM: char = '\u{feff}';

/// How a character takes part in whitespace collapsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Occupies no space (ZWSP, BOM).
    ZeroWidth,
    /// Space, tab, newline, carriage return, form feed.
    Collapsible,
    /// Non-breaking space.
    HardSpace,
    Visible,
}

impl CharClass {
    pub fn of(ch: char) -> Self {
        match ch {
            ZWSP | BOM => CharClass::ZeroWidth,
            ' ' | '\t' | '\n' | '\r' | '\u{c}' => CharClass::Collapsible,
            NBSP => CharClass::HardSpace,
            _ => CharClass::Visible,
        }
    }
}

/// What lives in each arena slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    Comment(String),
}

impl NodeKind {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NodeKind::Text(_))
    }
}

/// Element data: tag, attributes and the class set.
///
/// `class` is never stored in `attrs`; it is split into `classes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: Tag,
    pub attrs: BTreeMap<String, String>,
    pub classes: BTreeSet<String>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attrs: BTreeMap::new(),
            classes: BTreeSet::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        if name.eq_ignore_ascii_case("class") {
            self.classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            self.attrs
                .insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn is_br(&self) -> bool {
        self.tag == Tag::Br
    }
}

/// Length of `s` in characters.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the character at `char_offset`, or `s.len()` past the end.
pub(crate) fn byte_index(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map_or(s.len(), |(index, _)| index)
}
