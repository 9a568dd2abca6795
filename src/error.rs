//! Error types
//!
//! Builder rejections, reconciliation failures, and the in-memory
//! render target's own error type.
//!
//! Author: Moroya Sakamoto

use crate::memory::NodeId;

/// Rejection raised while building a [`VNode`](crate::VNode).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VNodeError {
    /// Tag was the empty string
    #[error("element tag must not be empty")]
    EmptyTag,
    /// Both `text` and `children` were supplied
    #[error("a node carries either text or children, not both")]
    TextAndChildren,
    /// Owned and shared children were both supplied
    #[error("owned and shared children cannot be combined")]
    MixedChildren,
    /// A child description has no tag (it was synthesized from a live text node)
    #[error("child at index {index} has no tag")]
    UntaggedChild {
        /// Position of the offending child in the sequence
        index: usize,
    },
}

/// Failure during a reconciliation pass.
///
/// `E` is the render target's error type.
#[derive(Debug, thiserror::Error)]
pub enum PatchError<E> {
    /// The render target rejected a mutation
    #[error("render target failed during `{op}`")]
    Target {
        /// Adapter operation that failed
        op: &'static str,
        /// Error reported by the render target
        #[source]
        source: E,
    },
    /// An old description was never materialized or matched
    #[error("description has no live host node")]
    Unbound,
    /// A description without a tag cannot be materialized
    #[error("description has no tag and cannot be materialized")]
    MissingTag,
}

impl<E> PatchError<E> {
    /// Adapter for `map_err` at render-target call sites.
    #[inline]
    pub(crate) fn target(op: &'static str) -> impl FnOnce(E) -> Self {
        move |source| Self::Target { op, source }
    }
}

/// Failure inside [`MemoryTarget`](crate::MemoryTarget).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// Node id was never allocated by this target
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    /// `child` is not currently attached under `parent`
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// Expected parent
        parent: NodeId,
        /// Node that was looked up
        child: NodeId,
    },
    /// Text nodes cannot hold children
    #[error("node {0} is a text node and cannot hold children")]
    NotAnElement(NodeId),
    /// Attaching the node would make it its own ancestor
    #[error("attaching {child} under {parent} would create a cycle")]
    CycleDetected {
        /// Would-be parent
        parent: NodeId,
        /// Node being attached
        child: NodeId,
    },
}
