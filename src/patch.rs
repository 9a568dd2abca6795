//! Node patcher and root entry
//!
//! [`patch_vnode`] reconciles two descriptions already known to denote the
//! same logical node. [`patch`] is the per-render entry point: it accepts
//! either the previous description tree or a raw live node on first mount.
//!
//! Author: Moroya Sakamoto

use core::ptr;

#[cfg(not(feature = "std"))]
use alloc::rc::Rc;
#[cfg(feature = "std")]
use std::rc::Rc;

use tracing::{debug, warn};

use crate::children::update_children;
use crate::error::PatchError;
use crate::materialize::{add_vnodes, materialize, remove_vnodes};
use crate::target::RenderTarget;
use crate::vnode::{is_def, same_vnode, VNode};

/// What the previous render pass left behind
#[derive(Debug)]
pub enum Previous<N> {
    /// Description tree returned by the previous [`patch`]
    Tree(VNode<N>),
    /// Raw live node to mount onto (first render)
    Mount(N),
}

impl<N> From<VNode<N>> for Previous<N> {
    fn from(tree: VNode<N>) -> Self {
        Previous::Tree(tree)
    }
}

/// Reconcile `new` against `old`, assuming `same_vnode(old, new)`.
///
/// `new` takes over `old`'s live node. Text and children are exclusive,
/// so the branching below covers every combination:
///
/// | new | old | action |
/// |-----|-----|--------|
/// | text, equal | any | nothing |
/// | text, differs | children | remove children, set text |
/// | text, differs | no children | set text |
/// | children | same sequence | nothing |
/// | children | other children | keyed diff |
/// | children | text or nothing | clear text if any, append new children |
/// | nothing | children | remove children |
/// | nothing | text | clear text |
/// | nothing | nothing | nothing |
pub fn patch_vnode<T: RenderTarget>(
    target: &mut T,
    old: &VNode<T::Node>,
    new: &VNode<T::Node>,
) -> Result<(), PatchError<T::Error>> {
    if ptr::eq(old, new) {
        return Ok(());
    }
    let elm = old.host().ok_or(PatchError::Unbound)?;
    new.bind_host(elm.clone());

    let old_ch = old.children_rc();
    let ch = new.children_rc();

    match new.text() {
        Some(text) => {
            if old.text() == Some(text) {
                return Ok(());
            }
            if let Some(old_ch) = old_ch {
                remove_vnodes(target, &elm, old_ch)?;
            }
            target
                .set_text_content(&elm, text)
                .map_err(PatchError::target("set_text_content"))?;
        }
        None => {
            match (old_ch, ch) {
                (Some(old_ch), Some(ch)) => {
                    if !Rc::ptr_eq(old_ch, ch) {
                        update_children(target, &elm, old_ch, ch)?;
                    }
                }
                (None, Some(ch)) => {
                    if is_def(&old.text()) {
                        target
                            .set_text_content(&elm, "")
                            .map_err(PatchError::target("set_text_content"))?;
                    }
                    add_vnodes(target, &elm, ch, None)?;
                }
                (Some(old_ch), None) => remove_vnodes(target, &elm, old_ch)?,
                (None, None) => {
                    if is_def(&old.text()) {
                        target
                            .set_text_content(&elm, "")
                            .map_err(PatchError::target("set_text_content"))?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Bring the live tree in line with `next` and return it as the tree for
/// the following pass.
///
/// A raw live node is first wrapped in an empty description carrying its
/// own tag. When `next` is a different logical node, a fresh subtree
/// replaces the old live node in its parent; with no parent nothing is
/// attached and `next` is returned detached.
pub fn patch<T: RenderTarget>(
    target: &mut T,
    previous: impl Into<Previous<T::Node>>,
    next: VNode<T::Node>,
) -> Result<VNode<T::Node>, PatchError<T::Error>> {
    let old = match previous.into() {
        Previous::Tree(tree) => tree,
        Previous::Mount(node) => {
            let tag = target.tag_name(&node);
            debug!(?node, ?tag, "first mount");
            VNode::empty_at(tag, node)
        }
    };

    if same_vnode(&old, &next) {
        patch_vnode(target, &old, &next)?;
        return Ok(next);
    }

    let elm = old.host().ok_or(PatchError::Unbound)?;
    debug!(old = ?old.tag(), new = ?next.tag(), "root identity changed, replacing");
    let new_elm = materialize(target, &next)?;
    match target.parent_of(&elm) {
        Some(parent) => {
            target
                .insert_before(&parent, &new_elm, Some(&elm))
                .map_err(PatchError::target("insert_before"))?;
            target
                .remove_child(&parent, &elm)
                .map_err(PatchError::target("remove_child"))?;
        }
        None => warn!(node = ?elm, "replaced root has no parent, leaving new tree detached"),
    }
    Ok(next)
}
