//! Navigation Cursor
//!
//! The drilled-down folder path, root first. The cursor holds `(id, name)`
//! pairs only; it is checked against the store whenever it is restored or the
//! tree changes, and it is truncated at the first entry that no longer
//! resolves to a folder directly under the entry before it.

pub mod autosave;

pub use autosave::CursorAutosave;

use crate::error::ApiError;
use crate::store::NodeStore;
use crate::types::{NodeId, ROOT};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One step of the navigation path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorEntry {
    pub id: NodeId,
    pub name: String,
}

impl CursorEntry {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationCursor {
    entries: Vec<CursorEntry>,
    max_depth: usize,
}

impl NavigationCursor {
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_depth,
        }
    }

    pub fn entries(&self) -> &[CursorEntry] {
        &self.entries
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Folder the cursor points at, or [`ROOT`] when the path is empty
    pub fn current(&self) -> &str {
        self.entries.last().map(|e| e.id.as_str()).unwrap_or(ROOT)
    }

    /// Make `folder_id` the entry at position `at_depth` (0 = top level),
    /// dropping everything that was at or below that position.
    ///
    /// The folder must be a child of the entry at `at_depth - 1` (or of root).
    /// On any error the cursor is left as it was.
    pub fn descend_into(
        &mut self,
        store: &NodeStore,
        folder_id: &str,
        at_depth: usize,
    ) -> Result<(), ApiError> {
        if at_depth >= self.max_depth {
            return Err(ApiError::depth(
                self.max_depth,
                format!("cannot navigate to level {}", at_depth + 1),
            ));
        }
        if at_depth > self.entries.len() {
            return Err(ApiError::InvalidNode(format!(
                "level {} is below the current path of {}",
                at_depth,
                self.entries.len()
            )));
        }
        let folder = store
            .get_by_id(folder_id)
            .ok_or_else(|| ApiError::NotFound(folder_id.to_string()))?;
        if !folder.is_folder() {
            return Err(ApiError::InvalidNode(format!(
                "{} is a link, not a folder",
                folder_id
            )));
        }
        let expected_parent = match at_depth {
            0 => ROOT,
            n => self.entries[n - 1].id.as_str(),
        };
        if store.effective_parent(folder) != expected_parent {
            return Err(ApiError::InvalidNode(format!(
                "{} is not inside the folder at level {}",
                folder_id, at_depth
            )));
        }
        let entry = CursorEntry::new(folder.id.clone(), folder.name.clone());
        self.entries.truncate(at_depth);
        self.entries.push(entry);
        debug!(folder = %folder_id, depth = self.entries.len(), "Cursor descended");
        Ok(())
    }

    /// Descend one level below the current folder
    pub fn enter(&mut self, store: &NodeStore, folder_id: &str) -> Result<(), ApiError> {
        let at_depth = self.entries.len();
        self.descend_into(store, folder_id, at_depth)
    }

    /// Drop the last `levels` entries; ascending past root stops at root.
    pub fn ascend(&mut self, levels: usize) {
        let keep = self.entries.len().saturating_sub(levels);
        self.entries.truncate(keep);
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// The `(id, name)` pairs to persist
    pub fn snapshot(&self) -> Vec<CursorEntry> {
        self.entries.clone()
    }

    /// Rebuild a cursor from a saved path, keeping the longest valid prefix.
    ///
    /// Names are taken from the store, not from the saved data.
    pub fn restore(saved: Vec<CursorEntry>, store: &NodeStore, max_depth: usize) -> Self {
        let mut cursor = Self::new(max_depth);
        cursor.entries = valid_prefix(&saved, store, max_depth);
        if cursor.entries.len() < saved.len() {
            debug!(
                saved = saved.len(),
                kept = cursor.entries.len(),
                "Dropped stale navigation entries"
            );
        }
        cursor
    }

    /// Re-validate against `store` after a mutation. Returns true when the
    /// path changed (truncated or renamed).
    pub fn reconcile(&mut self, store: &NodeStore) -> bool {
        let valid = valid_prefix(&self.entries, store, self.max_depth);
        if valid == self.entries {
            return false;
        }
        self.entries = valid;
        true
    }
}

fn valid_prefix(saved: &[CursorEntry], store: &NodeStore, max_depth: usize) -> Vec<CursorEntry> {
    let mut entries: Vec<CursorEntry> = Vec::with_capacity(saved.len().min(max_depth));
    for entry in saved.iter().take(max_depth) {
        let expected_parent = entries.last().map(|e| e.id.as_str()).unwrap_or(ROOT);
        match store.get_by_id(&entry.id) {
            Some(folder)
                if folder.is_folder() && store.effective_parent(folder) == expected_parent =>
            {
                entries.push(CursorEntry::new(folder.id.clone(), folder.name.clone()));
            }
            _ => break,
        }
    }
    entries
}
