//! Rendering-tree abstraction
//!
//! The locator and highlighter only talk to the page through [`Dom`]. The
//! arena [`Document`](crate::Document) implements it for offline snapshots and
//! tests; the browser build implements it over live `web_sys::Node`s.

use crate::error::DomError;
use std::fmt;

/// Coarse node classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Other,
}

/// Elements whose text never contributes to rendered prose
pub const NON_RENDERED_TAGS: &[&str] = &["script", "style", "noscript", "template", "textarea"];

/// Elements laid out on their own lines
pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "td", "th", "tr", "ul",
];

/// Text a line break contributes to rendered text
pub const LINE_BREAK: &str = "\n";

/// One piece of an element's rendered text, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<N> {
    Leaf(N),
    /// Line break from a block boundary or `<br>`; backed by no node
    Break,
}

/// Whether `node` is a non-rendered element or holds one
pub fn has_hidden_content<D: Dom + ?Sized>(dom: &D, node: &D::Node) -> bool {
    let hidden = |n: &D::Node| {
        dom.tag_name(n)
            .map(|t| NON_RENDERED_TAGS.contains(&t.as_str()))
            .unwrap_or(false)
    };
    if hidden(node) {
        return true;
    }
    let mut current = dom.first_child(node);
    while let Some(n) = current {
        if hidden(&n) {
            return true;
        }
        current = next_in_preorder(dom, &n, node);
    }
    false
}

/// Read and mutation primitives over a tree of elements and text nodes.
///
/// Text offsets are UTF-16 code units, matching the page's string APIs.
pub trait Dom {
    type Node: Clone + PartialEq + fmt::Debug;

    /// Descendants of `scope` matching a CSS selector, in document order
    fn query_all(&self, scope: &Self::Node, selector: &str) -> Result<Vec<Self::Node>, DomError>;

    fn node_kind(&self, node: &Self::Node) -> NodeKind;

    /// Lower-case tag name for elements
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Character data of a text node
    fn text_data(&self, node: &Self::Node) -> Option<String>;

    /// Current value of a form control (`textarea`, `input`)
    fn form_value(&self, node: &Self::Node) -> Option<String>;

    fn create_element(&mut self, tag: &str) -> Result<Self::Node, DomError>;

    fn create_text(&mut self, data: &str) -> Result<Self::Node, DomError>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str)
        -> Result<(), DomError>;

    /// Split a text node at `offset`; the original keeps the head and the
    /// returned node, inserted right after it, holds the tail
    fn split_text(&mut self, node: &Self::Node, offset: usize) -> Result<Self::Node, DomError>;

    /// Insert (or move) `child` into `parent` before `reference`, or at the end
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), DomError>;

    /// Detach a node from its parent
    fn remove(&mut self, node: &Self::Node) -> Result<(), DomError>;

    /// Merge adjacent text nodes and drop empty ones below `node`
    fn normalize(&mut self, node: &Self::Node) -> Result<(), DomError>;

    /// Inclusive containment, like `Node.contains`
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if n == *ancestor {
                return true;
            }
            current = self.parent(&n);
        }
        false
    }

    fn children(&self, node: &Self::Node) -> Vec<Self::Node> {
        let mut out = Vec::new();
        let mut child = self.first_child(node);
        while let Some(c) = child {
            child = self.next_sibling(&c);
            out.push(c);
        }
        out
    }

    fn has_class(&self, node: &Self::Node, class: &str) -> bool {
        self.attribute(node, "class")
            .map(|c| c.split_whitespace().any(|name| name == class))
            .unwrap_or(false)
    }

    /// Concatenated data of every descendant text node
    fn text_content(&self, node: &Self::Node) -> String {
        if self.node_kind(node) == NodeKind::Text {
            return self.text_data(node).unwrap_or_default();
        }
        let mut out = String::new();
        let mut current = self.first_child(node);
        while let Some(n) = current {
            if self.node_kind(&n) == NodeKind::Text {
                out.push_str(&self.text_data(&n).unwrap_or_default());
            }
            current = next_in_preorder(self, &n, node);
        }
        out
    }
}

/// Whether a `contenteditable` attribute value turns editing on
pub fn is_editable_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "true" | "plaintext-only"
    )
}

/// Element carries an editing flag of its own
pub fn is_editable<D: Dom + ?Sized>(dom: &D, node: &D::Node) -> bool {
    dom.node_kind(node) == NodeKind::Element
        && dom
            .attribute(node, "contenteditable")
            .map(|v| is_editable_flag(&v))
            .unwrap_or(false)
}

/// Proper ancestors, nearest first
pub fn ancestors<D: Dom + ?Sized>(dom: &D, node: &D::Node) -> Vec<D::Node> {
    let mut out = Vec::new();
    let mut current = dom.parent(node);
    while let Some(n) = current {
        current = dom.parent(&n);
        out.push(n);
    }
    out
}

/// Next node in document order, staying inside `root`
pub fn next_in_preorder<D: Dom + ?Sized>(
    dom: &D,
    node: &D::Node,
    root: &D::Node,
) -> Option<D::Node> {
    if let Some(child) = dom.first_child(node) {
        return Some(child);
    }
    let mut current = node.clone();
    loop {
        if current == *root {
            return None;
        }
        if let Some(sibling) = dom.next_sibling(&current) {
            return Some(sibling);
        }
        current = dom.parent(&current)?;
    }
}

/// Rendered pieces below `root`: text leaves plus the line breaks that
/// block elements and `<br>` produce. Subtrees of non-rendered elements are
/// skipped, as are subtrees of elements carrying `skip_class`. Block
/// boundaries never produce a leading break or two breaks in a row.
pub fn rendered_pieces<D: Dom + ?Sized>(
    dom: &D,
    root: &D::Node,
    skip_class: Option<&str>,
) -> Vec<Rendered<D::Node>> {
    let mut out = Vec::new();
    collect_pieces(dom, root, skip_class, &mut out);
    out
}

fn block_break<N>(out: &mut Vec<Rendered<N>>) {
    if matches!(out.last(), Some(Rendered::Leaf(_))) {
        out.push(Rendered::Break);
    }
}

fn collect_pieces<D: Dom + ?Sized>(
    dom: &D,
    node: &D::Node,
    skip_class: Option<&str>,
    out: &mut Vec<Rendered<D::Node>>,
) {
    let mut child = dom.first_child(node);
    while let Some(c) = child {
        match dom.node_kind(&c) {
            NodeKind::Text => out.push(Rendered::Leaf(c.clone())),
            NodeKind::Element => {
                let tag = dom.tag_name(&c).unwrap_or_default();
                let skipped = skip_class.map(|s| dom.has_class(&c, s)).unwrap_or(false);
                if tag == "br" {
                    out.push(Rendered::Break);
                } else if !skipped && !NON_RENDERED_TAGS.contains(&tag.as_str()) {
                    let block = BLOCK_TAGS.contains(&tag.as_str());
                    if block {
                        block_break(out);
                    }
                    collect_pieces(dom, &c, skip_class, out);
                    if block {
                        block_break(out);
                    }
                }
            }
            NodeKind::Other => {}
        }
        child = dom.next_sibling(&c);
    }
}

/// Visible text of an element, with a line break per block boundary and `<br>`
pub fn rendered_text<D: Dom + ?Sized>(dom: &D, root: &D::Node) -> String {
    let mut out = String::new();
    for piece in rendered_pieces(dom, root, None) {
        match piece {
            Rendered::Leaf(node) => out.push_str(&dom.text_data(&node).unwrap_or_default()),
            Rendered::Break => out.push_str(LINE_BREAK),
        }
    }
    out
}
