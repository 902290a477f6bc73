//! Building trees from, and printing them to, the markup notation.
//!
//! The notation is a fixture and debugging surface: `<p>a&nbsp;<b>b</b></p>`.
//! Parsing goes through the lossless CST in `tessera-syntax`, then lowers it
//! into the arena. Printing is canonical: attributes sorted, NBSP written as
//! `&nbsp;` and zero-width spaces as `&#8203;` so they stay visible in test
//! output.

use indextree::NodeId;
use tessera_syntax::ast::{self, Child};

use super::Tree;
use super::node::{BOM, CharClass, Element, NBSP, NodeKind, ZWSP};
use super::schema::{HtmlSchema, Schema};
use super::tag::Tag;
use crate::content_type::is_fake_br;

/// Object replacement character, printed for atomic inline content.
const OBJECT: char = '\u{fffc}';

impl Tree {
    /// Build a tree from markup. Malformed markup never fails; whatever the
    /// parser recovered is lowered.
    pub fn from_markup(source: &str) -> Self {
        let mut tree = Tree::new();
        let syntax = tessera_syntax::parse(source);
        let root = tree.root();
        for child in ast::root_children(&syntax) {
            tree.lower(root, child);
        }
        tree
    }

    fn lower(&mut self, parent: NodeId, child: Child) {
        let node = match child {
            Child::Text(text) => {
                let decoded = html_escape::decode_html_entities(&text.raw()).into_owned();
                if decoded.is_empty() {
                    return;
                }
                self.new_text(decoded)
            }
            Child::Comment(comment) => self.new_comment(comment.body()),
            Child::Element(element) => {
                let tag = Tag::parse(&element.tag_name().unwrap_or_default());
                let mut el = Element::new(tag);
                for attr in element.attributes() {
                    if let Some(name) = attr.name() {
                        let value = attr.value().unwrap_or_default();
                        el.set_attr(&name, &html_escape::decode_html_entities(&value));
                    }
                }
                let void = el.tag.is_void();
                let node = self.new_element(el);
                parent.append(node, &mut self.arena);
                if !void {
                    for grandchild in element.children() {
                        self.lower(node, grandchild);
                    }
                }
                return;
            }
        };
        parent.append(node, &mut self.arena);
    }

    /// Print the whole tree (the root itself is invisible).
    pub fn to_markup(&self) -> String {
        self.to_markup_of(self.root)
    }

    /// Print one node and its subtree.
    pub fn to_markup_of(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        match self.get(id) {
            Some(NodeKind::Text(text)) => {
                for ch in text.chars() {
                    match ch {
                        '&' => out.push_str("&amp;"),
                        '<' => out.push_str("&lt;"),
                        '>' => out.push_str("&gt;"),
                        NBSP => out.push_str("&nbsp;"),
                        ZWSP => out.push_str("&#8203;"),
                        BOM => out.push_str("&#65279;"),
                        _ => out.push(ch),
                    }
                }
            }
            Some(NodeKind::Comment(text)) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Some(NodeKind::Element(el)) if el.tag == Tag::Root => {
                for child in self.children(id) {
                    self.write_markup(child, out);
                }
            }
            Some(NodeKind::Element(el)) => {
                out.push('<');
                out.push_str(el.tag.as_str());

                let classes = el.classes.iter().cloned().collect::<Vec<_>>().join(" ");
                let mut attrs: Vec<(&str, &str)> = el
                    .attrs
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str()))
                    .collect();
                if !classes.is_empty() {
                    attrs.push(("class", &classes));
                }
                attrs.sort_unstable();
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&html_escape::encode_double_quoted_attribute(value));
                        out.push('"');
                    }
                }
                out.push('>');

                if el.tag.is_void() {
                    return;
                }
                for child in self.children(id) {
                    self.write_markup(child, out);
                }
                out.push_str("</");
                out.push_str(el.tag.as_str());
                out.push('>');
            }
            None => {}
        }
    }

    /// Raw characters of every text node under `id`, in order.
    pub fn text_content(&self, id: NodeId) -> String {
        id.descendants(&self.arena)
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Text as plain HTML would render it. See [`Tree::rendered_text_with`].
    pub fn rendered_text(&self, id: NodeId) -> String {
        self.rendered_text_with(id, &HtmlSchema)
    }

    /// Text as it would render under `schema`.
    ///
    /// Collapsible whitespace runs render as one space and vanish at line
    /// edges, NBSP renders as a space, zero-width characters vanish, a
    /// non-fake `<br>` and block edges produce `\n`, and atomic inline
    /// elements print as U+FFFC.
    pub fn rendered_text_with(&self, id: NodeId, schema: &dyn Schema) -> String {
        let mut renderer = Renderer::default();
        self.render_into(id, schema, &mut renderer);
        renderer.out.trim_end_matches('\n').to_string()
    }

    fn render_into(&self, id: NodeId, schema: &dyn Schema, r: &mut Renderer) {
        match self.get(id) {
            Some(NodeKind::Text(text)) => {
                for ch in text.chars() {
                    match CharClass::of(ch) {
                        CharClass::ZeroWidth => {}
                        CharClass::Collapsible => r.space(),
                        CharClass::HardSpace => r.push(' '),
                        CharClass::Visible => r.push(ch),
                    }
                }
            }
            Some(NodeKind::Comment(_)) | None => {}
            Some(NodeKind::Element(el)) => {
                if el.is_br() {
                    if !is_fake_br(self, schema, id) {
                        r.newline();
                    }
                    return;
                }
                let block = schema.is_block(el);
                if schema.is_self_closing(el) && !block {
                    r.push(OBJECT);
                    return;
                }
                if block {
                    r.boundary();
                }
                for child in self.children(id) {
                    self.render_into(child, schema, r);
                }
                if block {
                    r.boundary();
                }
            }
        }
    }
}

#[derive(Default)]
struct Renderer {
    out: String,
    pending_space: bool,
    mid_line: bool,
}

impl Renderer {
    fn push(&mut self, ch: char) {
        if self.pending_space {
            self.out.push(' ');
        }
        self.pending_space = false;
        self.out.push(ch);
        self.mid_line = true;
    }

    fn space(&mut self) {
        if self.mid_line {
            self.pending_space = true;
        }
    }

    fn newline(&mut self) {
        self.pending_space = false;
        self.out.push('\n');
        self.mid_line = false;
    }

    fn boundary(&mut self) {
        self.pending_space = false;
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.mid_line = false;
    }
}
