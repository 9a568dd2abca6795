//! ALICE-VDOM — Virtual Tree Reconciliation
//!
//! Don't rebuild the tree, patch it.
//!
//! Keyed reconciliation between two descriptions of a UI tree:
//! - Cheap, immutable node descriptions (tag, key, text or children)
//! - Four-way end-pointer heuristic with key-map fallback for sibling lists
//! - Minimal create / insert / move / remove / set-text mutations
//! - Pluggable render target (in-memory arena, browser DOM)
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`vnode`] | Node descriptions, keys, builder, identity predicates |
//! | [`target`] | Render-target adapter trait |
//! | [`materialize`] | Recursive subtree creation |
//! | [`patch`] | Single-node patcher and root entry point |
//! | [`children`] | Keyed sibling-list differ |
//! | [`memory`] | Arena-backed render target with a mutation journal |
//! | [`error`] | Builder, patch, and target error types |
//! | `dom` | Browser DOM render target (feature `web`) |
//!
//! # Feature flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `std` | Enable `std` collections (default: `no_std` + `alloc`) |
//! | `web` | `web-sys` DOM render target |
//!
//! # Quick Start
//!
//! ```
//! use alice_vdom::{patch, MemoryTarget, Previous, VNode};
//!
//! let mut target = MemoryTarget::new();
//! let body = target.add_element("body", None);
//! let mount = target.add_element("ul", Some(body));
//!
//! let item = |k: i64| VNode::builder("li").key(k).text(k.to_string()).build().unwrap();
//! let list = |keys: &[i64]| VNode::builder("ul").children(keys.iter().map(|&k| item(k))).build().unwrap();
//!
//! // First render onto the existing <ul>
//! let tree = patch(&mut target, Previous::Mount(mount), list(&[1, 2, 3])).unwrap();
//! target.clear_journal();
//!
//! // Rotate: one move, nothing created
//! let _tree = patch(&mut target, tree, list(&[3, 1, 2])).unwrap();
//! let stats = target.stats();
//! assert_eq!(stats.moved, 1);
//! assert_eq!(stats.created, 0);
//! assert_eq!(target.markup(body), "<body><ul><li>3</li><li>1</li><li>2</li></ul></body>");
//! ```
//!
//! Author: Moroya Sakamoto

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod children;
#[cfg(feature = "web")]
pub mod dom;
pub mod error;
pub mod materialize;
pub mod memory;
pub mod patch;
pub mod target;
pub mod vnode;

pub use children::update_children;
#[cfg(feature = "web")]
pub use dom::{DomError, DomTarget};
pub use error::{MemoryError, PatchError, VNodeError};
pub use materialize::materialize;
pub use memory::{LiveKind, LiveNode, MemoryTarget, Mutation, MutationStats, NodeId};
pub use patch::{patch, patch_vnode, Previous};
pub use target::RenderTarget;
pub use vnode::{is_def, is_undef, is_vnode, same_vnode, Key, VNode, VNodeBuilder};
