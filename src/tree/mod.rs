//! Bookmark tree engine
//!
//! Structural operations over the flat [`NodeStore`](crate::store::NodeStore):
//! add, edit, reparent, reorder and cascade delete, plus the ancestry checks
//! that keep the parent graph acyclic and depth-bounded.

pub mod ancestry;
pub mod node;
pub mod ops;

pub use ancestry::{ancestors, folder_depth, is_descendant, is_self_or_descendant, subtree_ids};
pub use node::{EditRequest, NewNode, Node, NodeKind};
pub use ops::{add_node, check_move, delete_cascade, edit_node, reorder, reparent, ReorderTarget};

use serde::{Deserialize, Serialize};

/// Default bound on folder nesting
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Structural limits enforced by tree and navigation operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeLimits {
    /// Maximum number of nested folders from root, which is also the longest
    /// navigation path
    pub max_depth: usize,
}

impl Default for TreeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
