//! Keyed children diff
//!
//! Reconciles two ordered child sequences under one live parent in place.
//! Four cursors converge inward from both ends; each step tries the four
//! positional hypotheses (start/start, end/end, start/end, end/start) in
//! that fixed order and falls back to a key lookup over the remaining old
//! range. Common edits (appends, removals at either end, single rotations)
//! never touch the key index.
//!
//! Author: Moroya Sakamoto

#[cfg(not(feature = "std"))]
use alloc::{vec, collections::BTreeMap as HashMap};
#[cfg(feature = "std")]
use std::collections::HashMap;

use tracing::{trace, trace_span, warn};

use crate::error::PatchError;
use crate::materialize::{add_vnodes, materialize};
use crate::patch::patch_vnode;
use crate::target::RenderTarget;
use crate::vnode::{same_vnode, Key, VNode};

/// Reconcile `old_ch` into `new_ch` under the live node `parent`.
///
/// Every new child ends bound to a live node in document order. Old
/// children with no counterpart are detached. Old descriptions are never
/// modified apart from being read; matched slots are tracked on the side.
pub fn update_children<T: RenderTarget>(
    target: &mut T,
    parent: &T::Node,
    old_ch: &[VNode<T::Node>],
    new_ch: &[VNode<T::Node>],
) -> Result<(), PatchError<T::Error>> {
    let span = trace_span!("update_children", old = old_ch.len(), new = new_ch.len());
    let _enter = span.enter();

    // Half-open ranges: [old_start, old_end) and [new_start, new_end)
    let mut old_start = 0;
    let mut old_end = old_ch.len();
    let mut new_start = 0;
    let mut new_end = new_ch.len();

    // Old slots already matched through the key index
    let mut consumed = vec![false; old_ch.len()];
    let mut key_to_old: Option<HashMap<&Key, usize>> = None;

    while old_start < old_end && new_start < new_end {
        if consumed[old_start] {
            old_start += 1;
            continue;
        }
        if consumed[old_end - 1] {
            old_end -= 1;
            continue;
        }

        let old_start_node = &old_ch[old_start];
        let old_end_node = &old_ch[old_end - 1];
        let new_start_node = &new_ch[new_start];
        let new_end_node = &new_ch[new_end - 1];

        if same_vnode(old_start_node, new_start_node) {
            trace!(old = old_start, new = new_start, "start matches start");
            patch_vnode(target, old_start_node, new_start_node)?;
            old_start += 1;
            new_start += 1;
        } else if same_vnode(old_end_node, new_end_node) {
            trace!(old = old_end - 1, new = new_end - 1, "end matches end");
            patch_vnode(target, old_end_node, new_end_node)?;
            old_end -= 1;
            new_end -= 1;
        } else if same_vnode(old_start_node, new_end_node) {
            trace!(old = old_start, new = new_end - 1, "start moved to end");
            patch_vnode(target, old_start_node, new_end_node)?;
            let elm = host_of(old_start_node)?;
            let anchor = host_of(old_end_node)?;
            let after = target.next_sibling_of(&anchor);
            target
                .insert_before(parent, &elm, after.as_ref())
                .map_err(PatchError::target("insert_before"))?;
            old_start += 1;
            new_end -= 1;
        } else if same_vnode(old_end_node, new_start_node) {
            trace!(old = old_end - 1, new = new_start, "end moved to start");
            patch_vnode(target, old_end_node, new_start_node)?;
            let elm = host_of(old_end_node)?;
            let anchor = host_of(old_start_node)?;
            target
                .insert_before(parent, &elm, Some(&anchor))
                .map_err(PatchError::target("insert_before"))?;
            old_end -= 1;
            new_start += 1;
        } else {
            // Built once per call, over the range still unmatched at first miss
            let index = key_to_old
                .get_or_insert_with(|| key_index(old_ch, &consumed, old_start, old_end));
            let anchor = host_of(old_start_node)?;

            let found = new_start_node.key().and_then(|k| index.get(k)).copied();
            let live = found.filter(|&i| i >= old_start && i < old_end && !consumed[i]);
            if found.is_some() && live.is_none() {
                warn!(new = new_start, "key already matched, treating as new node");
            }

            match live {
                None => {
                    trace!(new = new_start, "no old counterpart, materializing");
                    let elm = materialize(target, new_start_node)?;
                    target
                        .insert_before(parent, &elm, Some(&anchor))
                        .map_err(PatchError::target("insert_before"))?;
                }
                Some(i) if old_ch[i].tag() != new_start_node.tag() => {
                    trace!(old = i, new = new_start, "key reused across tags, replacing");
                    let elm = materialize(target, new_start_node)?;
                    target
                        .insert_before(parent, &elm, Some(&anchor))
                        .map_err(PatchError::target("insert_before"))?;
                    let stale = host_of(&old_ch[i])?;
                    target
                        .remove_child(parent, &stale)
                        .map_err(PatchError::target("remove_child"))?;
                    consumed[i] = true;
                }
                Some(i) => {
                    trace!(old = i, new = new_start, "matched by key");
                    let elm_to_move = &old_ch[i];
                    patch_vnode(target, elm_to_move, new_start_node)?;
                    consumed[i] = true;
                    let elm = host_of(elm_to_move)?;
                    target
                        .insert_before(parent, &elm, Some(&anchor))
                        .map_err(PatchError::target("insert_before"))?;
                }
            }
            new_start += 1;
        }
    }

    if old_start >= old_end {
        if new_start < new_end {
            // Insert before the first already-placed new child, or append
            let before = new_ch.get(new_end).and_then(|v| v.host());
            add_vnodes(target, parent, &new_ch[new_start..new_end], before.as_ref())?;
        }
    } else if new_start >= new_end {
        for (i, old) in old_ch.iter().enumerate().take(old_end).skip(old_start) {
            if consumed[i] {
                continue;
            }
            let elm = host_of(old)?;
            target
                .remove_child(parent, &elm)
                .map_err(PatchError::target("remove_child"))?;
        }
    }
    Ok(())
}

/// Map key → old index over `[start, end)`; the last duplicate wins
fn key_index<'a, N: Clone>(
    children: &'a [VNode<N>],
    consumed: &[bool],
    start: usize,
    end: usize,
) -> HashMap<&'a Key, usize> {
    let mut map = HashMap::new();
    for (i, child) in children.iter().enumerate().take(end).skip(start) {
        if consumed[i] {
            continue;
        }
        if let Some(key) = child.key() {
            if map.insert(key, i).is_some() {
                warn!(%key, "duplicate key among siblings");
            }
        }
    }
    map
}

#[inline]
fn host_of<N: Clone, E>(vnode: &VNode<N>) -> Result<N, PatchError<E>> {
    vnode.host().ok_or(PatchError::Unbound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryTarget, Mutation, NodeId};
    #[cfg(not(feature = "std"))]
    use alloc::{format, string::String, vec::Vec};

    type V = VNode<NodeId>;

    fn li(key: i64) -> V {
        VNode::builder("li").key(key).text(format!("{key}")).build().unwrap()
    }

    fn list(keys: &[i64]) -> V {
        VNode::builder("ul")
            .children(keys.iter().map(|&k| li(k)))
            .build()
            .unwrap()
    }

    fn markup_of(keys: &[i64]) -> String {
        let mut s = String::from("<ul>");
        for k in keys {
            s.push_str(&format!("<li>{k}</li>"));
        }
        s.push_str("</ul>");
        s
    }

    /// Materialize `old` under a body element and reset the journal
    fn mount(t: &mut MemoryTarget, old: &V) -> NodeId {
        let body = t.add_element("body", None);
        let ul = materialize(t, old).unwrap();
        t.append_child(&body, &ul).unwrap();
        t.clear_journal();
        ul
    }

    /// Diff the children of two lists and return the live `ul`
    fn diff(t: &mut MemoryTarget, from: &[i64], to: &[i64]) -> (NodeId, V) {
        let old = list(from);
        let new = list(to);
        let ul = mount(t, &old);
        update_children(t, &ul, old.children().unwrap(), new.children().unwrap()).unwrap();
        (ul, new)
    }

    fn inserts_under(t: &MemoryTarget, parent: NodeId) -> usize {
        t.journal()
            .iter()
            .filter(|m| matches!(m, Mutation::Insert { parent: p, .. } if *p == parent))
            .count()
    }

    fn assert_bound_in_order(t: &MemoryTarget, ul: NodeId, new: &V) {
        let hosts: Vec<NodeId> = new
            .children()
            .unwrap()
            .iter()
            .map(|c| c.host().expect("every new child is bound"))
            .collect();
        assert_eq!(t.children_of(ul), hosts.as_slice());
    }

    #[test]
    fn test_identical_lists_no_mutations() {
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &[1, 2, 3], &[1, 2, 3]);
        assert!(t.stats().is_empty());
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_append_at_end_no_moves() {
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &[1, 2, 3], &[1, 2, 3, 4, 5]);
        let stats = t.stats();
        assert_eq!(inserts_under(&t, ul), 2);
        assert_eq!(stats.moved, 0);
        assert_eq!(stats.removed, 0);
        assert_eq!(stats.created, 4); // two <li> plus their text nodes
        assert_eq!(t.markup(ul), markup_of(&[1, 2, 3, 4, 5]));
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_prepend_inserts_before_first_survivor() {
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &[3, 4], &[1, 2, 3, 4]);
        assert_eq!(inserts_under(&t, ul), 2);
        assert_eq!(t.stats().moved, 0);
        assert_eq!(t.markup(ul), markup_of(&[1, 2, 3, 4]));
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &[1, 2, 3], &[1, 4, 2, 3]);
        assert_eq!(inserts_under(&t, ul), 1);
        assert_eq!(t.stats().moved, 0);
        assert_eq!(t.markup(ul), markup_of(&[1, 4, 2, 3]));
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_remove_prefix_only_removals() {
        let mut t = MemoryTarget::new();
        let (ul, _) = diff(&mut t, &[1, 2, 3, 4, 5], &[3, 4, 5]);
        let stats = t.stats();
        assert_eq!(stats.removed, 2);
        assert_eq!(stats.total(), 2);
        assert_eq!(t.markup(ul), markup_of(&[3, 4, 5]));
    }

    #[test]
    fn test_remove_suffix_only_removals() {
        let mut t = MemoryTarget::new();
        let (ul, _) = diff(&mut t, &[1, 2, 3, 4, 5], &[1, 2]);
        let stats = t.stats();
        assert_eq!(stats.removed, 3);
        assert_eq!(stats.total(), 3);
        assert_eq!(t.markup(ul), markup_of(&[1, 2]));
    }

    #[test]
    fn test_remove_both_ends_exact_removals() {
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &[1, 2, 3, 4, 5], &[2, 3, 4]);
        let stats = t.stats();
        assert_eq!(stats.removed, 2);
        assert_eq!(stats.created, 0);
        assert_eq!(t.markup(ul), markup_of(&[2, 3, 4]));
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_rotate_first_to_last_single_move() {
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &[1, 2, 3, 4], &[2, 3, 4, 1]);
        let stats = t.stats();
        assert_eq!(stats.moved, 1);
        assert_eq!(stats.total(), 1);
        assert_eq!(t.markup(ul), markup_of(&[2, 3, 4, 1]));
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_rotate_last_to_first_single_move() {
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &[1, 2, 3, 4], &[4, 1, 2, 3]);
        let stats = t.stats();
        assert_eq!(stats.moved, 1);
        assert_eq!(stats.total(), 1);
        assert_eq!(t.markup(ul), markup_of(&[4, 1, 2, 3]));
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_key_match_across_positions_reuses_nodes() {
        let mut t = MemoryTarget::new();
        let old = list(&[1, 2, 3]);
        let ul = mount(&mut t, &old);
        let before: Vec<NodeId> = t.children_of(ul).to_vec();
        let new = list(&[3, 1, 2]);
        update_children(&mut t, &ul, old.children().unwrap(), new.children().unwrap()).unwrap();

        assert_eq!(t.stats().created, 0);
        assert_eq!(t.markup(ul), markup_of(&[3, 1, 2]));
        assert_eq!(t.children_of(ul), &[before[2], before[0], before[1]]);
    }

    #[test]
    fn test_reverse_reuses_all_nodes() {
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &[1, 2, 3, 4, 5], &[5, 4, 3, 2, 1]);
        let stats = t.stats();
        assert_eq!(stats.created, 0);
        assert_eq!(stats.removed, 0);
        assert_eq!(stats.moved, 4);
        assert_eq!(t.markup(ul), markup_of(&[5, 4, 3, 2, 1]));
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_shuffle_goes_through_key_index() {
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &[1, 2, 3, 4], &[3, 1, 4, 2]);
        let stats = t.stats();
        assert_eq!(stats.created, 0);
        assert_eq!(stats.removed, 0);
        assert_eq!(stats.moved, 2);
        assert_eq!(t.markup(ul), markup_of(&[3, 1, 4, 2]));
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_replace_all_keys() {
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &[1, 2, 3], &[7, 8]);
        let stats = t.stats();
        assert_eq!(stats.removed, 3);
        assert_eq!(inserts_under(&t, ul), 2);
        assert_eq!(stats.moved, 0);
        assert_eq!(t.markup(ul), markup_of(&[7, 8]));
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_from_empty_and_to_empty() {
        let mut t = MemoryTarget::new();
        let (ul, _) = diff(&mut t, &[], &[1, 2]);
        assert_eq!(t.markup(ul), markup_of(&[1, 2]));

        let mut t = MemoryTarget::new();
        let (ul, _) = diff(&mut t, &[1, 2], &[]);
        assert_eq!(t.stats().removed, 2);
        assert_eq!(t.markup(ul), "<ul></ul>");
    }

    #[test]
    fn test_mixed_insert_remove_and_move() {
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &[1, 2, 3, 4, 5, 6], &[6, 9, 2, 4, 1, 8]);
        assert_eq!(t.markup(ul), markup_of(&[6, 9, 2, 4, 1, 8]));
        assert_eq!(t.stats().removed, 2); // 3 and 5
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_duplicate_new_key_materializes_second_copy() {
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &[1, 2, 3, 4], &[5, 2, 2, 6]);
        assert_eq!(t.markup(ul), markup_of(&[5, 2, 2, 6]));
        assert_eq!(t.stats().removed, 3);
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_key_reused_across_tags_replaces_stale_node() {
        let mut t = MemoryTarget::new();
        let old = list(&[1, 2]);
        let ul = mount(&mut t, &old);
        let stale = t.children_of(ul)[0];
        let new = VNode::builder("ul")
            .child(VNode::builder("p").key(1).text("1").build().unwrap())
            .child(li(2))
            .build()
            .unwrap();
        update_children(&mut t, &ul, old.children().unwrap(), new.children().unwrap()).unwrap();

        assert_eq!(t.markup(ul), "<ul><p>1</p><li>2</li></ul>");
        assert_eq!(t.parent(stale), None);
        assert_eq!(t.stats().removed, 1);
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_key_reused_across_tags_mid_list() {
        // The stale node sits strictly inside the old range when the new
        // node takes its key; it must still be detached exactly once.
        let mut t = MemoryTarget::new();
        let old = list(&[1, 2, 3, 4]);
        let ul = mount(&mut t, &old);
        let new = VNode::builder("ul")
            .child(li(4))
            .child(VNode::builder("p").key(2).text("2").build().unwrap())
            .child(li(1))
            .build()
            .unwrap();
        update_children(&mut t, &ul, old.children().unwrap(), new.children().unwrap()).unwrap();

        assert_eq!(t.markup(ul), "<ul><li>4</li><p>2</p><li>1</li></ul>");
        assert_eq!(t.stats().removed, 2); // stale <li>2</li> and <li>3</li>
        assert_bound_in_order(&t, ul, &new);
    }

    #[test]
    fn test_unkeyed_children_patch_in_place() {
        let mut t = MemoryTarget::new();
        let old = VNode::builder("ul")
            .child(VNode::builder("li").text("a").build().unwrap())
            .child(VNode::builder("li").text("b").build().unwrap())
            .build()
            .unwrap();
        let ul = mount(&mut t, &old);
        let new = VNode::builder("ul")
            .child(VNode::builder("li").text("b").build().unwrap())
            .child(VNode::builder("li").text("c").build().unwrap())
            .build()
            .unwrap();
        update_children(&mut t, &ul, old.children().unwrap(), new.children().unwrap()).unwrap();

        let stats = t.stats();
        assert_eq!(stats.text_writes, 2);
        assert_eq!(stats.created, 0);
        assert_eq!(stats.moved, 0);
        assert_eq!(t.markup(ul), "<ul><li>b</li><li>c</li></ul>");
    }

    #[test]
    fn test_unkeyed_new_node_without_match_is_created() {
        let mut t = MemoryTarget::new();
        let old = VNode::builder("div")
            .child(VNode::builder("span").text("x").build().unwrap())
            .build()
            .unwrap();
        let ul = mount(&mut t, &old);
        let new = VNode::builder("div")
            .child(VNode::builder("em").text("y").build().unwrap())
            .build()
            .unwrap();
        update_children(&mut t, &ul, old.children().unwrap(), new.children().unwrap()).unwrap();

        assert_eq!(t.markup(ul), "<div><em>y</em></div>");
        assert_eq!(t.stats().removed, 1);
    }

    #[test]
    fn test_nested_lists_recurse() {
        let mut t = MemoryTarget::new();
        let build = |outer: &[i64], inner: &[&[i64]]| -> V {
            VNode::builder("div")
                .children(outer.iter().zip(inner.iter()).map(|(&k, keys)| {
                    VNode::builder("ul")
                        .key(k)
                        .children(keys.iter().map(|&i| li(i)))
                        .build()
                        .unwrap()
                }))
                .build()
                .unwrap()
        };
        let old = build(&[1, 2], &[&[1, 2][..], &[3][..]]);
        let root = mount(&mut t, &old);
        let new = build(&[2, 1], &[&[3, 4][..], &[2, 1][..]]);
        update_children(&mut t, &root, old.children().unwrap(), new.children().unwrap()).unwrap();

        assert_eq!(
            t.markup(root),
            "<div><ul><li>3</li><li>4</li></ul><ul><li>2</li><li>1</li></ul></div>"
        );
        assert_eq!(t.stats().created, 2); // <li>4</li> and its text
    }

    #[test]
    fn test_key_index_skips_consumed_and_unkeyed() {
        let children = [li(1), VNode::builder("li").build().unwrap(), li(3), li(3)];
        let consumed = [true, false, false, false];
        let map = key_index(&children, &consumed, 0, 4);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Key::Num(3)).copied(), Some(3));
    }

    #[test]
    fn test_large_list_shuffle() {
        let from: Vec<i64> = (0..64).collect();
        let mut to: Vec<i64> = from.iter().rev().step_by(2).copied().collect();
        to.extend(100..110);
        to.extend(from.iter().step_by(4).copied());
        let mut t = MemoryTarget::new();
        let (ul, new) = diff(&mut t, &from, &to);
        assert_eq!(t.markup(ul), markup_of(&to));
        assert_bound_in_order(&t, ul, &new);
    }
}
