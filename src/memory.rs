//! In-memory render target
//!
//! Flat arena of live nodes with DOM-like mutation semantics. Every
//! mutation is recorded in a journal so callers can inspect exactly what a
//! reconciliation pass did to the tree.
//!
//! Author: Moroya Sakamoto

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};
#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap as HashMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::error::MemoryError;
use crate::target::RenderTarget;

/// Live node identifier
pub type NodeId = u32;

/// Payload of a live node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveKind {
    /// Element with a tag
    Element(String),
    /// Text node with its data
    Text(String),
}

/// Live node
#[derive(Debug, Clone)]
pub struct LiveNode {
    /// Unique identifier within the target
    pub id: NodeId,
    /// Element or text payload
    pub kind: LiveKind,
    /// Attached child node IDs, in document order
    pub children: Vec<NodeId>,
}

impl LiveNode {
    fn new(id: NodeId, kind: LiveKind) -> Self {
        Self {
            id,
            kind,
            children: Vec::new(),
        }
    }

    /// True for element nodes
    pub fn is_element(&self) -> bool {
        matches!(self.kind, LiveKind::Element(_))
    }
}

/// One recorded mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// A detached element was created
    CreateElement { node: NodeId, tag: String },
    /// A detached text node was created
    CreateText { node: NodeId, text: String },
    /// A detached node was attached
    Insert {
        parent: NodeId,
        node: NodeId,
        before: Option<NodeId>,
    },
    /// An attached node was re-positioned
    Move {
        parent: NodeId,
        node: NodeId,
        before: Option<NodeId>,
    },
    /// A node was detached
    Remove { parent: NodeId, node: NodeId },
    /// Text content of a node was replaced
    SetText { node: NodeId, text: String },
}

/// Mutation counts over a journal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    /// Elements and text nodes created
    pub created: usize,
    /// Detached nodes attached
    pub inserted: usize,
    /// Attached nodes re-positioned
    pub moved: usize,
    /// Nodes detached
    pub removed: usize,
    /// Text content writes
    pub text_writes: usize,
}

impl MutationStats {
    /// Sum of all counted mutations
    #[inline]
    pub fn total(&self) -> usize {
        self.created + self.inserted + self.moved + self.removed + self.text_writes
    }

    /// True if nothing was touched
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Arena render target: flat storage with O(1) ID lookup and a parent index
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    nodes: Vec<LiveNode>,
    /// Maps child NodeId → parent NodeId for attached nodes
    parent_index: HashMap<NodeId, NodeId>,
    journal: Vec<Mutation>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element without journaling it (test fixtures, mount points)
    pub fn add_element(&mut self, tag: &str, parent: Option<NodeId>) -> NodeId {
        let id = self.alloc(LiveKind::Element(String::from(tag)));
        if let Some(parent_id) = parent {
            self.attach_unlogged(parent_id, id);
        }
        id
    }

    /// Add a text node without journaling it
    pub fn add_text(&mut self, text: &str, parent: Option<NodeId>) -> NodeId {
        let id = self.alloc(LiveKind::Text(String::from(text)));
        if let Some(parent_id) = parent {
            self.attach_unlogged(parent_id, id);
        }
        id
    }

    fn alloc(&mut self, kind: LiveKind) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(LiveNode::new(id, kind));
        id
    }

    fn attach_unlogged(&mut self, parent_id: NodeId, id: NodeId) {
        if let Some(parent) = self.nodes.get_mut(parent_id as usize) {
            parent.children.push(id);
            self.parent_index.insert(id, parent_id);
        }
    }

    /// Get node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&LiveNode> {
        self.nodes.get(id as usize)
    }

    /// Total allocated nodes, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Parent of an attached node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent_index.get(&id).copied()
    }

    /// Attached children of a node (empty for unknown IDs)
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.get_node(id).map_or(&[][..], |n| n.children.as_slice())
    }

    /// Concatenated text of a subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(node) = self.get_node(id) {
            match &node.kind {
                LiveKind::Text(t) => out.push_str(t),
                LiveKind::Element(_) => {
                    for &child in &node.children {
                        self.collect_text(child, out);
                    }
                }
            }
        }
    }

    /// Compact markup of a subtree, e.g. `<ul><li>a</li></ul>`
    pub fn markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        if let Some(node) = self.get_node(id) {
            match &node.kind {
                LiveKind::Text(t) => out.push_str(t),
                LiveKind::Element(tag) => {
                    out.push('<');
                    out.push_str(tag);
                    out.push('>');
                    for &child in &node.children {
                        self.write_markup(child, out);
                    }
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
            }
        }
    }

    /// Recorded mutations since the last [`clear_journal`](Self::clear_journal)
    pub fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    /// Forget recorded mutations
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Count recorded mutations by category
    pub fn stats(&self) -> MutationStats {
        let mut stats = MutationStats::default();
        for m in &self.journal {
            match m {
                Mutation::CreateElement { .. } | Mutation::CreateText { .. } => stats.created += 1,
                Mutation::Insert { .. } => stats.inserted += 1,
                Mutation::Move { .. } => stats.moved += 1,
                Mutation::Remove { .. } => stats.removed += 1,
                Mutation::SetText { .. } => stats.text_writes += 1,
            }
        }
        stats
    }

    fn node(&self, id: NodeId) -> Result<&LiveNode, MemoryError> {
        self.get_node(id).ok_or(MemoryError::UnknownNode(id))
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut LiveNode, MemoryError> {
        let node = self
            .nodes
            .get_mut(id as usize)
            .ok_or(MemoryError::UnknownNode(id))?;
        if node.is_element() {
            Ok(node)
        } else {
            Err(MemoryError::NotAnElement(id))
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent(id) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent_id) = self.parent_index.remove(&id) {
            if let Some(parent) = self.nodes.get_mut(parent_id as usize) {
                parent.children.retain(|&c| c != id);
            }
        }
    }
}

impl RenderTarget for MemoryTarget {
    type Node = NodeId;
    type Error = MemoryError;

    fn create_element_node(&mut self, tag: &str) -> Result<NodeId, MemoryError> {
        let node = self.alloc(LiveKind::Element(String::from(tag)));
        self.journal.push(Mutation::CreateElement {
            node,
            tag: String::from(tag),
        });
        Ok(node)
    }

    fn create_text_node(&mut self, text: &str) -> Result<NodeId, MemoryError> {
        let node = self.alloc(LiveKind::Text(String::from(text)));
        self.journal.push(Mutation::CreateText {
            node,
            text: String::from(text),
        });
        Ok(node)
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), MemoryError> {
        self.insert_before(parent, child, None)
    }

    fn insert_before(
        &mut self,
        parent: &NodeId,
        child: &NodeId,
        reference: Option<&NodeId>,
    ) -> Result<(), MemoryError> {
        let (parent, child, before) = (*parent, *child, reference.copied());
        self.element_mut(parent)?;
        self.node(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(MemoryError::CycleDetected { parent, child });
        }
        if let Some(r) = before {
            if self.parent(r) != Some(parent) {
                return Err(MemoryError::NotAChild { parent, child: r });
            }
        }

        let moved = self.parent(child).is_some();
        if before == Some(child) {
            self.journal.push(Mutation::Move {
                parent,
                node: child,
                before,
            });
            return Ok(());
        }
        self.detach(child);

        let target = self.element_mut(parent)?;
        let pos = before
            .and_then(|r| target.children.iter().position(|&c| c == r))
            .unwrap_or(target.children.len());
        target.children.insert(pos, child);
        self.parent_index.insert(child, parent);

        self.journal.push(if moved {
            Mutation::Move {
                parent,
                node: child,
                before,
            }
        } else {
            Mutation::Insert {
                parent,
                node: child,
                before,
            }
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), MemoryError> {
        let (parent, child) = (*parent, *child);
        self.node(parent)?;
        self.node(child)?;
        if self.parent(child) != Some(parent) {
            return Err(MemoryError::NotAChild { parent, child });
        }
        self.detach(child);
        self.journal.push(Mutation::Remove {
            parent,
            node: child,
        });
        Ok(())
    }

    fn set_text_content(&mut self, node: &NodeId, text: &str) -> Result<(), MemoryError> {
        let id = *node;
        if self.node(id)?.is_element() {
            let old_children = core::mem::take(&mut self.nodes[id as usize].children);
            for child in old_children {
                self.parent_index.remove(&child);
            }
            if !text.is_empty() {
                let text_node = self.alloc(LiveKind::Text(String::from(text)));
                self.attach_unlogged(id, text_node);
            }
        } else if let LiveKind::Text(data) = &mut self.nodes[id as usize].kind {
            *data = String::from(text);
        }
        self.journal.push(Mutation::SetText {
            node: id,
            text: String::from(text),
        });
        Ok(())
    }

    fn parent_of(&self, node: &NodeId) -> Option<NodeId> {
        self.parent(*node)
    }

    fn next_sibling_of(&self, node: &NodeId) -> Option<NodeId> {
        let siblings = self.children_of(self.parent(*node)?);
        let pos = siblings.iter().position(|c| c == node)?;
        siblings.get(pos + 1).copied()
    }

    fn tag_name(&self, node: &NodeId) -> Option<String> {
        match &self.get_node(*node)?.kind {
            LiveKind::Element(tag) => Some(tag.to_lowercase()),
            LiveKind::Text(_) => None,
        }
    }
}
