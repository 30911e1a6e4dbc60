//! Structural mutations on a [`NodeStore`].
//!
//! Each operation validates everything it needs (existence, ancestry, depth)
//! before touching the store, so a rejected call leaves no partial state.
//! Persistence is the caller's job.

use super::ancestry::{folder_depth, folder_height, is_descendant, subtree_ids};
use super::node::{EditRequest, NewNode, Node, NodeKind};
use super::TreeLimits;
use crate::error::ApiError;
use crate::store::NodeStore;
use crate::types::{generate_node_id, NodeId, ROOT};
use tracing::debug;

/// Where a reordered node lands among its siblings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderTarget {
    /// Immediately before this sibling
    Before(NodeId),
    /// After the last sibling
    End,
}

/// Create a node under `parent` and append it after the existing children.
pub fn add_node(
    store: &mut NodeStore,
    limits: &TreeLimits,
    parent: &str,
    new_node: NewNode,
) -> Result<Node, ApiError> {
    ensure_container(store, parent)?;
    let kind = match &new_node {
        NewNode::Folder { name } => {
            validate_name(name)?;
            let depth = folder_depth(store, parent) + 1;
            if depth > limits.max_depth {
                return Err(ApiError::depth(
                    limits.max_depth,
                    format!("a folder here would sit at depth {}", depth),
                ));
            }
            NodeKind::Folder
        }
        NewNode::Link { name, url } => {
            validate_name(name)?;
            validate_url(url)?;
            NodeKind::Bookmark {
                url: url.trim().to_string(),
                access_time: 0,
            }
        }
    };
    let name = match new_node {
        NewNode::Folder { name } | NewNode::Link { name, .. } => name.trim().to_string(),
    };
    let node = Node {
        id: generate_node_id(|candidate| store.contains(candidate)),
        name,
        parent: parent.to_string(),
        kind,
        order: store.next_order(parent),
    };
    debug!(node_id = %node.id, parent = %parent, order = node.order, "Adding node");
    store.upsert(node.clone());
    Ok(node)
}

/// Update name and/or url in place, optionally reparenting in the same call.
pub fn edit_node(
    store: &mut NodeStore,
    limits: &TreeLimits,
    id: &str,
    request: EditRequest,
) -> Result<Node, ApiError> {
    let node = store
        .get_by_id(id)
        .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
    if let Some(name) = &request.name {
        validate_name(name)?;
    }
    if let Some(url) = &request.url {
        if node.is_folder() {
            return Err(ApiError::InvalidNode(format!(
                "folder {} has no url to edit",
                id
            )));
        }
        validate_url(url)?;
    }
    if let Some(parent) = &request.parent {
        check_move(store, limits, id, parent)?;
    }

    let Some(node) = store.get_mut(id) else {
        return Err(ApiError::NotFound(id.to_string()));
    };
    if let Some(name) = request.name {
        node.name = name.trim().to_string();
    }
    if let (Some(new_url), NodeKind::Bookmark { url, .. }) = (request.url, &mut node.kind) {
        *url = new_url.trim().to_string();
    }
    match request.parent {
        Some(parent) => apply_move(store, id, &parent),
        None => store
            .get_by_id(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(id.to_string())),
    }
}

/// Move `id` under `new_parent` (or [`ROOT`]).
///
/// A node that changes parent is appended after its new siblings. Moving to the
/// parent it already has changes nothing.
pub fn reparent(
    store: &mut NodeStore,
    limits: &TreeLimits,
    id: &str,
    new_parent: &str,
) -> Result<Node, ApiError> {
    check_move(store, limits, id, new_parent)?;
    apply_move(store, id, new_parent)
}

/// Validate a reparent without applying it.
pub fn check_move(
    store: &NodeStore,
    limits: &TreeLimits,
    id: &str,
    new_parent: &str,
) -> Result<(), ApiError> {
    let node = store
        .get_by_id(id)
        .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
    if new_parent == id {
        return Err(ApiError::InvalidMove(format!(
            "{} cannot be its own parent",
            id
        )));
    }
    if new_parent != ROOT {
        let target = store
            .get_by_id(new_parent)
            .ok_or_else(|| ApiError::NotFound(new_parent.to_string()))?;
        if !target.is_folder() {
            return Err(ApiError::InvalidMove(format!(
                "{} is not a folder",
                new_parent
            )));
        }
        if is_descendant(store, new_parent, id) {
            return Err(ApiError::InvalidMove(format!(
                "{} lies inside {}",
                new_parent, id
            )));
        }
    }
    if node.is_folder() && store.effective_parent(node) != new_parent {
        let deepest = folder_depth(store, new_parent) + folder_height(store, id);
        if deepest > limits.max_depth {
            return Err(ApiError::depth(
                limits.max_depth,
                format!("moving {} would nest folders {} deep", id, deepest),
            ));
        }
    }
    Ok(())
}

fn apply_move(store: &mut NodeStore, id: &str, new_parent: &str) -> Result<Node, ApiError> {
    let current_parent = store
        .get_by_id(id)
        .map(|node| store.effective_parent(node).to_string())
        .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
    if current_parent != new_parent {
        let order = store.next_order(new_parent);
        if let Some(node) = store.get_mut(id) {
            debug!(node_id = %id, from = %current_parent, to = %new_parent, order, "Reparenting node");
            node.parent = new_parent.to_string();
            node.order = order;
        }
    }
    store
        .get_by_id(id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(id.to_string()))
}

/// Move `id` within its sibling list and renumber all siblings `0..n`.
///
/// Returns the new sibling sequence.
pub fn reorder(
    store: &mut NodeStore,
    id: &str,
    target: &ReorderTarget,
) -> Result<Vec<NodeId>, ApiError> {
    let node = store
        .get_by_id(id)
        .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
    let parent = store.effective_parent(node).to_string();
    if let ReorderTarget::Before(target_id) = target {
        let target_node = store
            .get_by_id(target_id)
            .ok_or_else(|| ApiError::NotFound(target_id.clone()))?;
        if store.effective_parent(target_node) != parent {
            return Err(ApiError::InvalidMove(format!(
                "{} and {} are not siblings",
                id, target_id
            )));
        }
    }

    let mut sequence: Vec<NodeId> = store
        .children_of(&parent)
        .into_iter()
        .map(|node| node.id.clone())
        .collect();
    let original = sequence.clone();
    match target {
        ReorderTarget::Before(target_id) if target_id != id => {
            sequence.retain(|sibling| sibling != id);
            let position = sequence
                .iter()
                .position(|sibling| sibling == target_id)
                .unwrap_or(sequence.len());
            sequence.insert(position, id.to_string());
        }
        ReorderTarget::Before(_) => {}
        ReorderTarget::End => {
            sequence.retain(|sibling| sibling != id);
            sequence.push(id.to_string());
        }
    }

    for (index, sibling) in sequence.iter().enumerate() {
        if let Some(node) = store.get_mut(sibling) {
            node.order = index as i64;
        }
    }
    debug!(
        node_id = %id,
        parent = %parent,
        moved = original != sequence,
        "Reordered siblings"
    );
    Ok(sequence)
}

/// Remove `id` and its whole subtree. The full batch is collected before
/// anything is removed. Returns the removed nodes, `id` first.
pub fn delete_cascade(store: &mut NodeStore, id: &str) -> Result<Vec<Node>, ApiError> {
    if !store.contains(id) {
        return Err(ApiError::NotFound(id.to_string()));
    }
    let mut batch = vec![id.to_string()];
    batch.extend(subtree_ids(store, id));
    let removed: Vec<Node> = batch
        .iter()
        .filter_map(|node_id| store.remove_by_id(node_id))
        .collect();
    debug!(node_id = %id, removed = removed.len(), "Cascade delete");
    Ok(removed)
}

fn ensure_container(store: &NodeStore, parent: &str) -> Result<(), ApiError> {
    if parent == ROOT {
        return Ok(());
    }
    match store.get_by_id(parent) {
        Some(node) if node.is_folder() => Ok(()),
        Some(_) => Err(ApiError::InvalidMove(format!(
            "{} is a link and cannot hold children",
            parent
        ))),
        None => Err(ApiError::NotFound(parent.to_string())),
    }
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::InvalidNode("name cannot be empty".to_string()));
    }
    Ok(())
}

fn validate_url(url: &str) -> Result<(), ApiError> {
    if url.trim().is_empty() {
        return Err(ApiError::InvalidNode("url cannot be empty".to_string()));
    }
    Ok(())
}
