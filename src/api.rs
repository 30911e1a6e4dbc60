//! Bookmark API
//!
//! [`BookmarkApi`] owns the node store and the navigation cursor and is the one
//! mutator of both. Every successful structural change is written through the
//! persistence gateway before the call returns; a failed write is reported as
//! a warning on the result, and the in-memory change stays.

use crate::error::ApiError;
use crate::import::{self, ImportOutcome};
use crate::navigation::{CursorEntry, NavigationCursor};
use crate::search;
use crate::store::persistence::PersistenceGateway;
use crate::store::NodeStore;
use crate::tree::{self, EditRequest, NewNode, Node, ReorderTarget, TreeLimits};
use crate::types::{now_millis, NodeId};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a mutation that was applied in memory.
///
/// `warning` is set when the change could not be persisted.
#[derive(Debug)]
pub struct Applied<T> {
    pub value: T,
    pub warning: Option<ApiError>,
}

impl<T> Applied<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applied<U> {
        Applied {
            value: f(self.value),
            warning: self.warning,
        }
    }
}

pub struct BookmarkApi {
    store: NodeStore,
    gateway: PersistenceGateway,
    cursor: Arc<RwLock<NavigationCursor>>,
    limits: TreeLimits,
}

impl BookmarkApi {
    /// Load the store and cursor from `gateway`.
    ///
    /// Nothing stored yet means an empty tree. A stored node blob that cannot
    /// be read fails with `FormatError`; a stale or unreadable cursor is
    /// trimmed or reset.
    pub fn open(gateway: PersistenceGateway, limits: TreeLimits) -> Result<Self, ApiError> {
        let nodes = gateway.load_nodes()?.unwrap_or_default();
        let store = NodeStore::from_nodes(nodes);
        let saved = gateway.load_cursor()?;
        let cursor = NavigationCursor::restore(saved, &store, limits.max_depth);
        info!(
            nodes = store.len(),
            cursor_depth = cursor.depth(),
            "Opened bookmark store"
        );
        Ok(Self {
            store,
            gateway,
            cursor: Arc::new(RwLock::new(cursor)),
            limits,
        })
    }

    /// Fresh API over an in-memory backend
    pub fn in_memory(limits: TreeLimits) -> Self {
        Self {
            store: NodeStore::new(),
            gateway: PersistenceGateway::in_memory(),
            cursor: Arc::new(RwLock::new(NavigationCursor::new(limits.max_depth))),
            limits,
        }
    }

    pub fn limits(&self) -> &TreeLimits {
        &self.limits
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// Shared handle to the cursor, for the periodic autosave
    pub fn cursor_handle(&self) -> Arc<RwLock<NavigationCursor>> {
        Arc::clone(&self.cursor)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.store.get_by_id(id)
    }

    pub fn children(&self, parent: &str) -> Vec<&Node> {
        self.store.children_of(parent)
    }

    pub fn is_descendant(&self, candidate: &str, node: &str) -> bool {
        tree::is_descendant(&self.store, candidate, node)
    }

    pub fn add(&mut self, parent: &str, new_node: NewNode) -> Result<Applied<Node>, ApiError> {
        let node = tree::add_node(&mut self.store, &self.limits, parent, new_node)?;
        info!(node_id = %node.id, kind = node.type_label(), parent = %parent, "Added node");
        Ok(self.commit(node))
    }

    pub fn edit(&mut self, id: &str, request: EditRequest) -> Result<Applied<Node>, ApiError> {
        if request.is_empty() {
            return self
                .store
                .get_by_id(id)
                .cloned()
                .map(Applied::clean)
                .ok_or_else(|| ApiError::NotFound(id.to_string()));
        }
        let node = tree::edit_node(&mut self.store, &self.limits, id, request)?;
        info!(node_id = %id, "Edited node");
        Ok(self.commit(node))
    }

    pub fn reparent(&mut self, id: &str, new_parent: &str) -> Result<Applied<Node>, ApiError> {
        let node = tree::reparent(&mut self.store, &self.limits, id, new_parent)?;
        info!(node_id = %id, parent = %new_parent, order = node.order, "Moved node");
        Ok(self.commit(node))
    }

    /// Returns the new sibling sequence
    pub fn reorder(
        &mut self,
        id: &str,
        target: &ReorderTarget,
    ) -> Result<Applied<Vec<NodeId>>, ApiError> {
        let sequence = tree::reorder(&mut self.store, id, target)?;
        info!(node_id = %id, siblings = sequence.len(), "Reordered node");
        Ok(self.commit(sequence))
    }

    /// Remove `id` and everything under it. Returns the removed nodes.
    pub fn delete(&mut self, id: &str) -> Result<Applied<Vec<Node>>, ApiError> {
        let removed = tree::delete_cascade(&mut self.store, id)?;
        info!(node_id = %id, removed = removed.len(), "Deleted subtree");
        Ok(self.commit(removed))
    }

    pub fn search(&self, query: &str) -> Vec<&Node> {
        search::search(&self.store, query)
    }

    /// Stamp a link as visited now. The only writer of `accessTime`.
    pub fn record_access(&mut self, id: &str) -> Result<Applied<Node>, ApiError> {
        let node = search::touch(&mut self.store, id, now_millis())?;
        info!(node_id = %id, access_time = node.access_time(), "Recorded access");
        Ok(self.commit(node))
    }

    pub fn navigation_path(&self) -> Vec<CursorEntry> {
        self.cursor.read().snapshot()
    }

    /// Folder the cursor points at ([`crate::types::ROOT`] when at the top)
    pub fn current_folder(&self) -> NodeId {
        self.cursor.read().current().to_string()
    }

    pub fn descend_into(
        &mut self,
        folder_id: &str,
        at_depth: usize,
    ) -> Result<Applied<Vec<CursorEntry>>, ApiError> {
        self.cursor
            .write()
            .descend_into(&self.store, folder_id, at_depth)?;
        Ok(self.save_cursor())
    }

    pub fn enter(&mut self, folder_id: &str) -> Result<Applied<Vec<CursorEntry>>, ApiError> {
        self.cursor.write().enter(&self.store, folder_id)?;
        Ok(self.save_cursor())
    }

    pub fn ascend(&mut self, levels: usize) -> Applied<Vec<CursorEntry>> {
        self.cursor.write().ascend(levels);
        self.save_cursor()
    }

    pub fn reset_navigation(&mut self) -> Applied<()> {
        self.cursor.write().reset();
        let warning = self
            .gateway
            .clear_cursor()
            .err()
            .map(ApiError::PersistenceFailure);
        if let Some(e) = &warning {
            warn!(error = %e, "Failed to clear navigation cursor");
        }
        Applied { value: (), warning }
    }

    /// Native JSON export of the whole store
    pub fn export(&self) -> Result<String, ApiError> {
        Ok(import::native::encode(&self.store)?)
    }

    /// Parse `text` and, when it yields nodes, replace the whole store.
    ///
    /// An [`ImportOutcome::Empty`] result leaves the store untouched; call
    /// [`BookmarkApi::replace_all`] with no nodes to clear it deliberately.
    pub fn import(&mut self, text: &str) -> Result<Applied<ImportOutcome>, ApiError> {
        let outcome = import::parse_import(text, &self.limits)?;
        match &outcome {
            ImportOutcome::Nodes(parsed) => {
                let applied = self.replace_all(parsed.nodes.clone());
                Ok(applied.map(|_| outcome))
            }
            ImportOutcome::Empty(format) => {
                warn!(format = %format, "Import produced no nodes; store left unchanged");
                Ok(Applied::clean(outcome))
            }
        }
    }

    /// Replace every node. Returns the new node count.
    pub fn replace_all(&mut self, nodes: Vec<Node>) -> Applied<usize> {
        self.store.replace_all(nodes);
        info!(nodes = self.store.len(), "Replaced bookmark store");
        let count = self.store.len();
        self.commit(count)
    }

    pub fn settings(&self) -> Result<Option<String>, ApiError> {
        Ok(self.gateway.load_settings()?)
    }

    pub fn save_settings(&self, blob: &str) -> Result<(), ApiError> {
        Ok(self.gateway.save_settings(blob)?)
    }

    /// Persist the node sequence, then bring the cursor in line with the tree.
    fn commit<T>(&mut self, value: T) -> Applied<T> {
        let mut warning = None;
        if let Err(e) = self.gateway.save_nodes(&self.store) {
            warn!(error = %e, "Failed to persist bookmark store");
            warning = Some(ApiError::PersistenceFailure(e));
        }
        let changed = self.cursor.write().reconcile(&self.store);
        if changed {
            let snapshot = self.cursor.read().snapshot();
            if let Err(e) = self.gateway.save_cursor(&snapshot) {
                warn!(error = %e, "Failed to persist navigation cursor");
                warning.get_or_insert(ApiError::PersistenceFailure(e));
            }
        }
        Applied { value, warning }
    }

    fn save_cursor(&self) -> Applied<Vec<CursorEntry>> {
        let snapshot = self.cursor.read().snapshot();
        match self.gateway.save_cursor(&snapshot) {
            Ok(()) => Applied::clean(snapshot),
            Err(e) => {
                warn!(error = %e, "Failed to persist navigation cursor");
                Applied {
                    value: snapshot,
                    warning: Some(ApiError::PersistenceFailure(e)),
                }
            }
        }
    }
}
