//! Parent-chain walks: ancestry, depth and subtree collection.
//!
//! Every walk is bounded by the store size, so a corrupt stored tree with a
//! parent cycle degrades to a truncated walk instead of a hang.

use crate::store::NodeStore;
use crate::types::{NodeId, ROOT};
use std::collections::{HashSet, VecDeque};

/// Ancestor ids of `id`, nearest first, stopping at root.
pub fn ancestors(store: &NodeStore, id: &str) -> Vec<NodeId> {
    let mut chain = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let Some(mut current) = store.get_by_id(id) else {
        return chain;
    };
    seen.insert(current.id.as_str());
    loop {
        let parent = store.effective_parent(current);
        if parent == ROOT || !seen.insert(parent) {
            break;
        }
        chain.push(parent.to_string());
        match store.get_by_id(parent) {
            Some(node) => current = node,
            None => break,
        }
    }
    chain
}

/// True iff `node_id` is a strict ancestor of `candidate_id`.
pub fn is_descendant(store: &NodeStore, candidate_id: &str, node_id: &str) -> bool {
    if candidate_id == node_id {
        return false;
    }
    ancestors(store, candidate_id).iter().any(|id| id == node_id)
}

/// True when `candidate_id` is `node_id` or lies inside its subtree; such a
/// candidate can never become the node's new parent.
pub fn is_self_or_descendant(store: &NodeStore, candidate_id: &str, node_id: &str) -> bool {
    candidate_id == node_id || is_descendant(store, candidate_id, node_id)
}

/// Number of folders on the path from root down to and including `id`.
///
/// Root itself has depth 0, a top-level folder depth 1.
pub fn folder_depth(store: &NodeStore, id: &str) -> usize {
    if id == ROOT {
        return 0;
    }
    match store.get_by_id(id) {
        Some(node) if node.is_folder() => 1 + ancestors(store, id).len(),
        Some(_) => ancestors(store, id).len(),
        None => 0,
    }
}

/// Height of the folder subtree rooted at `id`: 0 for a link, 1 for a folder
/// without subfolders, and so on.
pub fn folder_height(store: &NodeStore, id: &str) -> usize {
    let Some(root) = store.get_by_id(id) else {
        return 0;
    };
    if !root.is_folder() {
        return 0;
    }
    let index = store.children_index();
    let mut height = 0;
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(root.id.as_str(), 1)]);
    while let Some((current, level)) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        height = height.max(level);
        for &child in index.get(current).into_iter().flatten() {
            if store.is_folder(child) {
                queue.push_back((child, level + 1));
            }
        }
    }
    height
}

/// Every transitive child of `id`, breadth first, excluding `id` itself.
pub fn subtree_ids(store: &NodeStore, id: &str) -> Vec<NodeId> {
    let index = store.children_index();
    let mut collected = Vec::new();
    let mut seen: HashSet<&str> = HashSet::from([id]);
    let mut queue: VecDeque<&str> = VecDeque::from([id]);
    while let Some(current) = queue.pop_front() {
        for &child in index.get(current).into_iter().flatten() {
            if seen.insert(child) {
                collected.push(child.to_string());
                queue.push_back(child);
            }
        }
    }
    collected
}
