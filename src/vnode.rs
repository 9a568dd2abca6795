//! Node descriptions
//!
//! Immutable, lightweight descriptions of the desired tree shape. Each
//! node has a tag, an optional key, and either text or children. The
//! `host` cell records which live render-target node the description
//! currently stands for.
//!
//! Author: Moroya Sakamoto

#[cfg(not(feature = "std"))]
use alloc::{rc::Rc, string::String, vec::Vec};
#[cfg(feature = "std")]
use std::rc::Rc;

use core::cell::RefCell;
use core::fmt;

use crate::error::VNodeError;

/// Stable identity of a child within its sibling sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// String key
    Str(String),
    /// Numeric key
    Num(i64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{s:?}"),
            Key::Num(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(String::from(s))
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Num(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Num(i64::from(n))
    }
}

impl From<u32> for Key {
    fn from(n: u32) -> Self {
        Key::Num(i64::from(n))
    }
}

/// Description of one node of the desired tree.
///
/// `N` is the render target's node handle. Descriptions are built once per
/// render pass and consumed by exactly one reconciliation call.
pub struct VNode<N> {
    tag: Option<String>,
    key: Option<Key>,
    children: Option<Rc<[VNode<N>]>>,
    text: Option<String>,
    host: RefCell<Option<N>>,
}

impl<N: fmt::Debug> fmt::Debug for VNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VNode")
            .field("tag", &self.tag)
            .field("key", &self.key)
            .field("children", &self.children)
            .field("text", &self.text)
            .field("host", &self.host.borrow())
            .finish()
    }
}

impl<N: Clone> VNode<N> {
    /// Start building an element description
    pub fn builder(tag: &str) -> VNodeBuilder<N> {
        VNodeBuilder::new(tag)
    }

    /// Degenerate description of an existing live node: no key, empty
    /// children, no text, bound to `node`.
    ///
    /// `tag` is `None` for live text nodes.
    pub fn empty_at(tag: Option<String>, node: N) -> Self {
        Self {
            tag,
            key: None,
            children: Some(Rc::from(Vec::new())),
            text: None,
            host: RefCell::new(Some(node)),
        }
    }

    /// Element tag, `None` only for descriptions of live text nodes
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Sibling key
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Child descriptions, if this node holds children
    pub fn children(&self) -> Option<&[VNode<N>]> {
        self.children.as_deref()
    }

    /// Shared handle to the child sequence
    pub fn children_rc(&self) -> Option<&Rc<[VNode<N>]>> {
        self.children.as_ref()
    }

    /// Text content, if this node holds text
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Live node this description currently represents
    pub fn host(&self) -> Option<N> {
        self.host.borrow().clone()
    }

    /// True once materialized or matched against a live node
    pub fn is_bound(&self) -> bool {
        self.host.borrow().is_some()
    }

    pub(crate) fn bind_host(&self, node: N) {
        *self.host.borrow_mut() = Some(node);
    }
}

/// Builder enforcing the text/children exclusivity at construction time
pub struct VNodeBuilder<N> {
    tag: String,
    key: Option<Key>,
    children: Option<Vec<VNode<N>>>,
    shared: Option<Rc<[VNode<N>]>>,
    text: Option<String>,
    host: Option<N>,
}

impl<N: Clone> VNodeBuilder<N> {
    fn new(tag: &str) -> Self {
        Self {
            tag: String::from(tag),
            key: None,
            children: None,
            shared: None,
            text: None,
            host: None,
        }
    }

    /// Set the sibling key
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Append one child
    pub fn child(mut self, child: VNode<N>) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Append several children; an empty iterator still marks the node as a
    /// children-holder
    pub fn children(mut self, children: impl IntoIterator<Item = VNode<N>>) -> Self {
        self.children
            .get_or_insert_with(Vec::new)
            .extend(children);
        self
    }

    /// Reuse an existing child sequence as-is
    pub fn shared_children(mut self, children: Rc<[VNode<N>]>) -> Self {
        self.shared = Some(children);
        self
    }

    /// Set the text content
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Pre-bind the description to a live node
    pub fn host(mut self, node: N) -> Self {
        self.host = Some(node);
        self
    }

    /// Validate and produce the description
    pub fn build(self) -> Result<VNode<N>, VNodeError> {
        if self.tag.is_empty() {
            return Err(VNodeError::EmptyTag);
        }
        let children = match (self.children, self.shared) {
            (Some(_), Some(_)) => return Err(VNodeError::MixedChildren),
            (Some(owned), None) => Some(Rc::from(owned)),
            (None, shared) => shared,
        };
        if children.is_some() && self.text.is_some() {
            return Err(VNodeError::TextAndChildren);
        }
        if let Some(children) = &children {
            if let Some(index) = children.iter().position(|c| c.tag.is_none()) {
                return Err(VNodeError::UntaggedChild { index });
            }
        }
        Ok(VNode {
            tag: Some(self.tag),
            key: self.key,
            children,
            text: self.text,
            host: RefCell::new(self.host),
        })
    }
}

// ── Predicates ─────────────────────────────────────────────────────────

/// Two descriptions denote the same logical node iff tag and key match
/// (both absent counts as a match).
#[inline]
pub fn same_vnode<N>(a: &VNode<N>, b: &VNode<N>) -> bool {
    a.tag == b.tag && a.key == b.key
}

/// A description built by the builder, as opposed to one synthesized for
/// a raw live text node
#[inline]
pub fn is_vnode<N>(v: &VNode<N>) -> bool {
    v.tag.is_some()
}

/// Presence test
#[inline]
pub fn is_def<T>(v: &Option<T>) -> bool {
    v.is_some()
}

/// Absence test
#[inline]
pub fn is_undef<T>(v: &Option<T>) -> bool {
    v.is_none()
}
