//! [`Dom`] over the live browser page

use page_dom::{Dom, DomError, NodeKind};
use shared_types::text::utf16_len;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlTextAreaElement, Node, Text};

pub struct LiveDom {
    document: Document,
}

/// Message of a thrown `Error`, or the thrown value itself
pub(crate) fn describe_js(e: &JsValue) -> String {
    e.dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| e.as_string())
        .unwrap_or_else(|| format!("{:?}", e))
}

fn js_error(e: JsValue) -> DomError {
    DomError::Js(describe_js(&e))
}

impl LiveDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The document of the current window, if there is one
    pub fn from_window() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    /// The document node, used as the scan root
    pub fn root(&self) -> Node {
        self.document.clone().unchecked_into()
    }
}

impl Dom for LiveDom {
    type Node = Node;

    fn query_all(&self, scope: &Node, selector: &str) -> Result<Vec<Node>, DomError> {
        let result = if let Some(element) = scope.dyn_ref::<Element>() {
            element.query_selector_all(selector)
        } else if let Some(document) = scope.dyn_ref::<Document>() {
            document.query_selector_all(selector)
        } else {
            return Err(DomError::NotElement);
        };
        let list = result.map_err(|_| DomError::InvalidSelector(selector.to_string()))?;

        Ok((0..list.length()).filter_map(|i| list.item(i)).collect())
    }

    fn node_kind(&self, node: &Node) -> NodeKind {
        match node.node_type() {
            Node::ELEMENT_NODE => NodeKind::Element,
            Node::TEXT_NODE => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn tag_name(&self, node: &Node) -> Option<String> {
        node.dyn_ref::<Element>()
            .map(|e| e.tag_name().to_ascii_lowercase())
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn first_child(&self, node: &Node) -> Option<Node> {
        node.first_child()
    }

    fn next_sibling(&self, node: &Node) -> Option<Node> {
        node.next_sibling()
    }

    fn text_data(&self, node: &Node) -> Option<String> {
        if node.node_type() == Node::TEXT_NODE {
            node.node_value()
        } else {
            None
        }
    }

    fn form_value(&self, node: &Node) -> Option<String> {
        if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            return Some(area.value());
        }
        node.dyn_ref::<HtmlInputElement>().map(|input| input.value())
    }

    fn create_element(&mut self, tag: &str) -> Result<Node, DomError> {
        self.document
            .create_element(tag)
            .map(Into::into)
            .map_err(js_error)
    }

    fn create_text(&mut self, data: &str) -> Result<Node, DomError> {
        Ok(self.document.create_text_node(data).into())
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &str) -> Result<(), DomError> {
        node.dyn_ref::<Element>()
            .ok_or(DomError::NotElement)?
            .set_attribute(name, value)
            .map_err(js_error)
    }

    fn split_text(&mut self, node: &Node, offset: usize) -> Result<Node, DomError> {
        let text = node.dyn_ref::<Text>().ok_or(DomError::NotText)?;
        let len = node.node_value().map(|v| utf16_len(&v)).unwrap_or(0);
        if offset > len {
            return Err(DomError::IndexSize { offset, len });
        }
        text.split_text(offset as u32)
            .map(Into::into)
            .map_err(|_| DomError::IndexSize { offset, len })
    }

    fn insert_before(
        &mut self,
        parent: &Node,
        child: &Node,
        reference: Option<&Node>,
    ) -> Result<(), DomError> {
        parent
            .insert_before(child, reference)
            .map(|_| ())
            .map_err(js_error)
    }

    fn remove(&mut self, node: &Node) -> Result<(), DomError> {
        let parent = node.parent_node().ok_or(DomError::Detached)?;
        parent.remove_child(node).map(|_| ()).map_err(js_error)
    }

    fn normalize(&mut self, node: &Node) -> Result<(), DomError> {
        node.normalize();
        Ok(())
    }

    fn contains(&self, ancestor: &Node, node: &Node) -> bool {
        ancestor.contains(Some(node))
    }
}
