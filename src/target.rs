//! Render-target adapter
//!
//! The live tree the reconciler mutates. Implementations wrap a DOM, a
//! native widget tree, or the in-memory [`MemoryTarget`](crate::MemoryTarget).
//!
//! Author: Moroya Sakamoto

#[cfg(not(feature = "std"))]
use alloc::string::String;

use core::fmt;

/// Tree-mutation API consumed by the reconciler.
///
/// Node handles are cheap to clone and compare by identity. Every mutation
/// is fallible; queries are not.
pub trait RenderTarget {
    /// Handle to a live node
    type Node: Clone + PartialEq + fmt::Debug;
    /// Error raised by a rejected mutation
    type Error: core::error::Error + 'static;

    /// Create a detached element
    fn create_element_node(&mut self, tag: &str) -> Result<Self::Node, Self::Error>;

    /// Create a detached text node
    fn create_text_node(&mut self, text: &str) -> Result<Self::Node, Self::Error>;

    /// Append `child` as the last child of `parent`
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

    /// Insert `child` before `reference`; `None` appends. An attached
    /// `child` is moved.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), Self::Error>;

    /// Detach `child` from `parent`
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;

    /// Replace all content of `node` with `text` (clears existing children)
    fn set_text_content(&mut self, node: &Self::Node, text: &str) -> Result<(), Self::Error>;

    /// Current parent, if attached
    fn parent_of(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Following sibling, if any
    fn next_sibling_of(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Lower-case element tag; `None` for text nodes
    fn tag_name(&self, node: &Self::Node) -> Option<String>;
}
