//! Binding layer for component trees.
//!
//! - [`ComponentTree`]: arena of mounted nodes with explicit parent links,
//!   lifecycle events, local event dispatch and error boundaries
//! - [`NodeRef`]: read view of a node, implementing [`Traced`](chainspy_core::Traced)
//! - [`ComponentTree::wrap_callback`]: callback middleware
//! - [`Step`]: enter/leave reporting for multi-step flows

mod callbacks;
mod step;
mod tree;

pub use step::{ENTER, LEAVE, Step};
pub use tree::{ComponentTree, ERROR, MOUNT, NodeId, NodeRef, TreeError, UNMOUNT};
