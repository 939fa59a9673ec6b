//! Arena-backed document tree
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`]. Removed
//! nodes stay in the arena, detached, so stale ids never dangle.

use crate::dom::{Dom, NodeKind};
use crate::error::DomError;
use crate::selector::SelectorList;
use shared_types::text::{byte_index, utf16_len};

/// Node identifier - index into the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The document node is always allocated first
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct ArenaNode {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory document snapshot
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<ArenaNode>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document holding only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![ArenaNode {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index()).map(|n| &n.data)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ArenaNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn node(&self, id: NodeId) -> Result<&ArenaNode, DomError> {
        self.nodes.get(id.index()).ok_or(DomError::NotFound)
    }

    /// Append a new element under `parent`
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        let id = self.alloc(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                .collect(),
        });
        self.insert_before(&parent, &id, None)?;
        Ok(id)
    }

    /// Append a new text node under `parent`
    pub fn append_text(&mut self, parent: NodeId, data: &str) -> Result<NodeId, DomError> {
        let id = self.alloc(NodeData::Text(data.to_string()));
        self.insert_before(&parent, &id, None)?;
        Ok(id)
    }

    /// Replace the character data of a text node
    pub fn set_text(&mut self, node: NodeId, data: &str) -> Result<(), DomError> {
        match self.nodes.get_mut(node.index()).map(|n| &mut n.data) {
            Some(NodeData::Text(text)) => {
                *text = data.to_string();
                Ok(())
            }
            Some(_) => Err(DomError::NotText),
            None => Err(DomError::NotFound),
        }
    }

    /// Serialize a subtree back to HTML (children only for the document node)
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => {
                for child in &node.children {
                    self.write_html(*child, out);
                }
            }
            NodeData::Text(text) => out.push_str(&escape_text(text)),
            NodeData::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_text(value).replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if crate::html::is_void(tag) {
                    return;
                }
                for child in &node.children {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|c| *c != id);
        }
    }

    fn normalize_children(&mut self, id: NodeId) {
        let children = self.nodes[id.index()].children.clone();
        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());

        for child in children {
            let text = match &self.nodes[child.index()].data {
                NodeData::Text(t) => Some(t.clone()),
                _ => None,
            };
            match text {
                Some(t) if t.is_empty() => {
                    self.nodes[child.index()].parent = None;
                }
                Some(t) => {
                    let previous_text = kept.last().copied().filter(|prev| {
                        matches!(self.nodes[prev.index()].data, NodeData::Text(_))
                    });
                    match previous_text {
                        Some(prev) => {
                            if let NodeData::Text(existing) = &mut self.nodes[prev.index()].data {
                                existing.push_str(&t);
                            }
                            self.nodes[child.index()].parent = None;
                        }
                        None => kept.push(child),
                    }
                }
                None => {
                    self.normalize_children(child);
                    kept.push(child);
                }
            }
        }

        self.nodes[id.index()].children = kept;
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl Dom for Document {
    type Node = NodeId;

    fn query_all(&self, scope: &NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = SelectorList::parse(selector)?;
        let mut out = Vec::new();
        let mut current = self.first_child(scope);
        while let Some(node) = current {
            if self.node_kind(&node) == NodeKind::Element && selector.matches(self, node) {
                out.push(node);
            }
            current = crate::dom::next_in_preorder(self, &node, scope);
        }
        Ok(out)
    }

    fn node_kind(&self, node: &NodeId) -> NodeKind {
        match self.data(*node) {
            Some(NodeData::Element { .. }) => NodeKind::Element,
            Some(NodeData::Text(_)) => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn tag_name(&self, node: &NodeId) -> Option<String> {
        match self.data(*node) {
            Some(NodeData::Element { tag, .. }) => Some(tag.clone()),
            _ => None,
        }
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        match self.data(*node) {
            Some(NodeData::Element { attrs, .. }) => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node).ok().and_then(|n| n.parent)
    }

    fn first_child(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node).ok().and_then(|n| n.children.first().copied())
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.nodes[parent.index()].children;
        let pos = siblings.iter().position(|c| c == node)?;
        siblings.get(pos + 1).copied()
    }

    fn text_data(&self, node: &NodeId) -> Option<String> {
        match self.data(*node) {
            Some(NodeData::Text(t)) => Some(t.clone()),
            _ => None,
        }
    }

    fn form_value(&self, node: &NodeId) -> Option<String> {
        match self.tag_name(node)?.as_str() {
            "input" => self.attribute(node, "value"),
            "textarea" => self
                .attribute(node, "value")
                .or_else(|| Some(self.text_content(node))),
            _ => None,
        }
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        Ok(self.alloc(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }))
    }

    fn create_text(&mut self, data: &str) -> Result<NodeId, DomError> {
        Ok(self.alloc(NodeData::Text(data.to_string())))
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        match self.nodes.get_mut(node.index()).map(|n| &mut n.data) {
            Some(NodeData::Element { attrs, .. }) => {
                match attrs.iter_mut().find(|(k, _)| *k == name) {
                    Some(entry) => entry.1 = value.to_string(),
                    None => attrs.push((name, value.to_string())),
                }
                Ok(())
            }
            Some(_) => Err(DomError::NotElement),
            None => Err(DomError::NotFound),
        }
    }

    fn split_text(&mut self, node: &NodeId, offset: usize) -> Result<NodeId, DomError> {
        let text = self.text_data(node).ok_or(DomError::NotText)?;
        let len = utf16_len(&text);
        let at = byte_index(&text, offset).ok_or(DomError::IndexSize { offset, len })?;

        let tail = self.alloc(NodeData::Text(text[at..].to_string()));
        self.set_text(*node, &text[..at])?;

        if let Some(parent) = self.parent(node) {
            let reference = self.next_sibling(node);
            self.insert_before(&parent, &tail, reference.as_ref())?;
        }
        Ok(tail)
    }

    fn insert_before(
        &mut self,
        parent: &NodeId,
        child: &NodeId,
        reference: Option<&NodeId>,
    ) -> Result<(), DomError> {
        self.node(*child)?;
        if matches!(self.node(*parent)?.data, NodeData::Text(_)) || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if let Some(r) = reference {
            if self.parent(r) != Some(*parent) {
                return Err(DomError::NotFound);
            }
            if r == child {
                return Ok(());
            }
        }

        self.detach(*child);
        let siblings = &mut self.nodes[parent.index()].children;
        let pos = match reference {
            Some(r) => siblings
                .iter()
                .position(|c| c == r)
                .ok_or(DomError::NotFound)?,
            None => siblings.len(),
        };
        siblings.insert(pos, *child);
        self.nodes[child.index()].parent = Some(*parent);
        Ok(())
    }

    fn remove(&mut self, node: &NodeId) -> Result<(), DomError> {
        if self.parent(node).is_none() {
            return Err(DomError::Detached);
        }
        self.detach(*node);
        Ok(())
    }

    fn normalize(&mut self, node: &NodeId) -> Result<(), DomError> {
        self.node(*node)?;
        self.normalize_children(*node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paragraph(text: &str) -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let p = doc.append_element(root, "p", &[]).unwrap();
        let t = doc.append_text(p, text).unwrap();
        (doc, p, t)
    }

    #[test]
    fn test_split_text_keeps_head_in_place() {
        let (mut doc, p, t) = paragraph("very comprehensive");
        let tail = doc.split_text(&t, 5).unwrap();

        assert_eq!(doc.text_data(&t).unwrap(), "very ");
        assert_eq!(doc.text_data(&tail).unwrap(), "comprehensive");
        assert_eq!(doc.children(&p), vec![t, tail]);
    }

    #[test]
    fn test_split_text_uses_utf16_offsets() {
        let (mut doc, _, t) = paragraph("😀ab");
        let tail = doc.split_text(&t, 2).unwrap();
        assert_eq!(doc.text_data(&tail).unwrap(), "ab");
        assert_eq!(
            doc.split_text(&t, 1),
            Err(DomError::IndexSize { offset: 1, len: 2 })
        );
    }

    #[test]
    fn test_insert_before_moves_node() {
        let mut doc = Document::parse_html("<p id=a>x</p><p id=b>y</p>");
        let a = doc.query_all(&doc.root(), "#a").unwrap()[0];
        let b = doc.query_all(&doc.root(), "#b").unwrap()[0];
        let y = doc.first_child(&b).unwrap();

        doc.insert_before(&a, &y, None).unwrap();
        assert_eq!(doc.to_html(doc.root()), "<p id=\"a\">xy</p><p id=\"b\"></p>");
    }

    #[test]
    fn test_insert_rejects_cycles() {
        let mut doc = Document::parse_html("<div id=o><div id=i></div></div>");
        let o = doc.query_all(&doc.root(), "#o").unwrap()[0];
        let i = doc.query_all(&doc.root(), "#i").unwrap()[0];
        assert_eq!(
            doc.insert_before(&i, &o, None),
            Err(DomError::HierarchyRequest)
        );
    }

    #[test]
    fn test_remove_detached_node_errors() {
        let (mut doc, _, t) = paragraph("x");
        doc.remove(&t).unwrap();
        assert_eq!(doc.remove(&t), Err(DomError::Detached));
        assert_eq!(doc.parent(&t), None);
    }

    #[test]
    fn test_normalize_merges_and_drops_empty() {
        let mut doc = Document::new();
        let root = doc.root();
        let p = doc.append_element(root, "p", &[]).unwrap();
        doc.append_text(p, "a").unwrap();
        doc.append_text(p, "").unwrap();
        doc.append_text(p, "b").unwrap();
        let b = doc.append_element(p, "b", &[]).unwrap();
        doc.append_text(b, "c").unwrap();
        doc.append_text(b, "d").unwrap();

        doc.normalize(&p).unwrap();
        assert_eq!(doc.children(&p).len(), 2);
        assert_eq!(doc.children(&b).len(), 1);
        assert_eq!(doc.to_html(p), "<p>ab<b>cd</b></p>");
    }

    #[test]
    fn test_form_values() {
        let doc = Document::parse_html(
            "<input id=i type=text value=\"hello\"><textarea id=t>draft text</textarea>",
        );
        let input = doc.query_all(&doc.root(), "#i").unwrap()[0];
        let area = doc.query_all(&doc.root(), "#t").unwrap()[0];
        assert_eq!(doc.form_value(&input).as_deref(), Some("hello"));
        assert_eq!(doc.form_value(&area).as_deref(), Some("draft text"));
    }

    #[test]
    fn test_set_attribute_replaces_value() {
        let (mut doc, p, t) = paragraph("x");
        doc.set_attribute(&p, "class", "a").unwrap();
        doc.set_attribute(&p, "CLASS", "b").unwrap();
        assert_eq!(doc.attribute(&p, "class").as_deref(), Some("b"));
        assert_eq!(doc.set_attribute(&t, "class", "c"), Err(DomError::NotElement));
    }
}
