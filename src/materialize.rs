//! Subtree materializer
//!
//! Realizes node descriptions as live render-target nodes, recursively,
//! and binds every visited description to the node it produced.
//!
//! Author: Moroya Sakamoto

use tracing::trace;

use crate::error::PatchError;
use crate::target::RenderTarget;
use crate::vnode::VNode;

/// Create the live subtree for `vnode` and return its root.
///
/// Children are created and appended in sequence order. A description
/// without children gets a single text node when it has text, and stays an
/// empty element otherwise. The returned node is detached.
pub fn materialize<T: RenderTarget>(
    target: &mut T,
    vnode: &VNode<T::Node>,
) -> Result<T::Node, PatchError<T::Error>> {
    let tag = vnode.tag().ok_or(PatchError::MissingTag)?;
    let elm = target
        .create_element_node(tag)
        .map_err(PatchError::target("create_element_node"))?;

    if let Some(children) = vnode.children() {
        for child in children {
            let child_elm = materialize(target, child)?;
            target
                .append_child(&elm, &child_elm)
                .map_err(PatchError::target("append_child"))?;
        }
    } else if let Some(text) = vnode.text() {
        let text_node = target
            .create_text_node(text)
            .map_err(PatchError::target("create_text_node"))?;
        target
            .append_child(&elm, &text_node)
            .map_err(PatchError::target("append_child"))?;
    }

    trace!(tag, node = ?elm, "materialized");
    vnode.bind_host(elm.clone());
    Ok(elm)
}

/// Materialize each description and insert it before `before` (`None` appends)
pub(crate) fn add_vnodes<T: RenderTarget>(
    target: &mut T,
    parent: &T::Node,
    vnodes: &[VNode<T::Node>],
    before: Option<&T::Node>,
) -> Result<(), PatchError<T::Error>> {
    for vnode in vnodes {
        let elm = materialize(target, vnode)?;
        target
            .insert_before(parent, &elm, before)
            .map_err(PatchError::target("insert_before"))?;
    }
    Ok(())
}

/// Detach the live node of each description from `parent`
pub(crate) fn remove_vnodes<T: RenderTarget>(
    target: &mut T,
    parent: &T::Node,
    vnodes: &[VNode<T::Node>],
) -> Result<(), PatchError<T::Error>> {
    for vnode in vnodes {
        let elm = vnode.host().ok_or(PatchError::Unbound)?;
        target
            .remove_child(parent, &elm)
            .map_err(PatchError::target("remove_child"))?;
    }
    Ok(())
}
