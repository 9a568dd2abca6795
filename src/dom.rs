//! Browser DOM render target
//!
//! Author: Moroya Sakamoto

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Node};

use crate::target::RenderTarget;

/// Rejected DOM call, carrying the JavaScript exception text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// No `window` or `document` (running outside a browser)
    #[error("DOM is not available")]
    Unavailable,
    /// Wrapper around a JavaScript exception
    #[error("JavaScript error: {0}")]
    Js(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        value
            .as_string()
            .map_or_else(|| Self::Js(format!("{value:?}")), Self::Js)
    }
}

/// [`RenderTarget`] over a live `web_sys::Document`
#[derive(Debug, Clone)]
pub struct DomTarget {
    document: Document,
}

impl DomTarget {
    /// Target bound to the given document
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Target bound to the current window's document
    pub fn from_window() -> Result<Self, DomError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(DomError::Unavailable)?;
        Ok(Self { document })
    }

    /// The owning document
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl RenderTarget for DomTarget {
    type Node = Node;
    type Error = DomError;

    fn create_element_node(&mut self, tag: &str) -> Result<Node, DomError> {
        Ok(self.document.create_element(tag)?.into())
    }

    fn create_text_node(&mut self, text: &str) -> Result<Node, DomError> {
        Ok(self.document.create_text_node(text).into())
    }

    fn append_child(&mut self, parent: &Node, child: &Node) -> Result<(), DomError> {
        parent.append_child(child)?;
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: &Node,
        child: &Node,
        reference: Option<&Node>,
    ) -> Result<(), DomError> {
        parent.insert_before(child, reference)?;
        Ok(())
    }

    fn remove_child(&mut self, parent: &Node, child: &Node) -> Result<(), DomError> {
        parent.remove_child(child)?;
        Ok(())
    }

    fn set_text_content(&mut self, node: &Node, text: &str) -> Result<(), DomError> {
        node.set_text_content(Some(text));
        Ok(())
    }

    fn parent_of(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn next_sibling_of(&self, node: &Node) -> Option<Node> {
        node.next_sibling()
    }

    fn tag_name(&self, node: &Node) -> Option<String> {
        node.dyn_ref::<Element>().map(Element::local_name)
    }
}
