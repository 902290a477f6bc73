//! Node-kind predicates.
//!
//! The core never inspects tag names directly. It asks a [`Schema`], so an
//! embedder can declare its own blocks, void widgets and read-only islands.

use std::collections::HashSet;

use indextree::NodeId;

use super::Tree;
use super::node::Element;
use super::tag::Tag;

/// Element that the schema calls a block. Text is never a block.
pub fn is_block(tree: &Tree, schema: &dyn Schema, id: NodeId) -> bool {
    tree.element(id).is_some_and(|el| schema.is_block(el))
}

pub fn is_self_closing(tree: &Tree, schema: &dyn Schema, id: NodeId) -> bool {
    tree.element(id).is_some_and(|el| schema.is_self_closing(el))
}

/// Text and comments count as editable; their container decides.
pub fn is_editable(tree: &Tree, schema: &dyn Schema, id: NodeId) -> bool {
    tree.element(id).is_none_or(|el| schema.is_editable(el))
}

/// Self-closing (other than `<br>`) or non-editable: treated as one opaque
/// unit of content.
pub fn is_atomic(tree: &Tree, schema: &dyn Schema, id: NodeId) -> bool {
    tree.element(id).is_some_and(|el| {
        (schema.is_self_closing(el) && !el.is_br()) || !schema.is_editable(el)
    })
}

/// Traversal yields these as leaves instead of descending.
pub(crate) fn is_opaque(tree: &Tree, schema: &dyn Schema, id: NodeId) -> bool {
    tree.element(id)
        .is_some_and(|el| schema.is_self_closing(el) || !schema.is_editable(el))
}

/// Innermost block containing `id` (inclusive).
pub fn nearest_block(tree: &Tree, schema: &dyn Schema, id: NodeId) -> NodeId {
    tree.ancestors(id)
        .find(|&a| is_block(tree, schema, a))
        .unwrap_or(tree.root())
}

/// Classification of elements by kind.
///
/// Implementations must be pure: the answer for an element may not change
/// while an operation is running.
pub trait Schema {
    /// Starts a new line and stops inline traversal.
    fn is_block(&self, el: &Element) -> bool;

    /// Never has children; a caret cannot be placed inside it.
    fn is_self_closing(&self, el: &Element) -> bool;

    /// Content may be edited. Non-editable subtrees are deleted atomically.
    fn is_editable(&self, el: &Element) -> bool {
        el.attr("contenteditable") != Some("false")
    }
}

/// Plain HTML rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSchema;

impl Schema for HtmlSchema {
    fn is_block(&self, el: &Element) -> bool {
        el.tag.is_block()
    }

    fn is_self_closing(&self, el: &Element) -> bool {
        el.tag.is_void()
    }
}

/// HTML rules with per-tag and per-class overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredSchema {
    block_tags: HashSet<String>,
    inline_tags: HashSet<String>,
    self_closing_tags: HashSet<String>,
    non_editable_classes: HashSet<String>,
}

impl ConfiguredSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.block_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn inline_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inline_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn self_closing_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.self_closing_tags
            .extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn non_editable_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_editable_classes
            .extend(classes.into_iter().map(Into::into));
        self
    }
}

impl Schema for ConfiguredSchema {
    fn is_block(&self, el: &Element) -> bool {
        if el.tag == Tag::Root {
            return true;
        }
        let name = el.tag.as_str();
        if self.inline_tags.contains(name) {
            false
        } else {
            self.block_tags.contains(name) || el.tag.is_block()
        }
    }

    fn is_self_closing(&self, el: &Element) -> bool {
        self.self_closing_tags.contains(el.tag.as_str()) || el.tag.is_void()
    }

    fn is_editable(&self, el: &Element) -> bool {
        el.attr("contenteditable") != Some("false")
            && !el
                .classes
                .iter()
                .any(|class| self.non_editable_classes.contains(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_schema_follows_tags() {
        let schema = HtmlSchema;
        assert!(schema.is_block(&Element::new(Tag::P)));
        assert!(!schema.is_block(&Element::new(Tag::B)));
        assert!(schema.is_self_closing(&Element::new(Tag::Br)));
        assert!(schema.is_editable(&Element::new(Tag::Span)));
        assert!(!schema.is_editable(&Element::new(Tag::Span).with_attr("contenteditable", "false")));
    }

    #[test]
    fn configured_schema_overrides() {
        let schema = ConfiguredSchema::new()
            .block_tags(["figure"])
            .inline_tags(["li"])
            .self_closing_tags(["x-embed"])
            .non_editable_classes(["widget"]);

        assert!(schema.is_block(&Element::new(Tag::parse("figure"))));
        assert!(!schema.is_block(&Element::new(Tag::Li)));
        assert!(schema.is_block(&Element::new(Tag::P)));
        assert!(schema.is_self_closing(&Element::new(Tag::parse("x-embed"))));
        assert!(!schema.is_editable(&Element::new(Tag::Div).with_class("widget")));
        assert!(schema.is_editable(&Element::new(Tag::Div).with_class("other")));
    }

    #[test]
    fn root_stays_a_block() {
        let schema = ConfiguredSchema::new().inline_tags(["#root"]);
        assert!(schema.is_block(&Element::new(Tag::Root)));
    }
}
