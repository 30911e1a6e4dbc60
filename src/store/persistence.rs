//! Persistence Gateway
//!
//! The only component that talks to the key-value collaborator. The node
//! sequence, the settings blob and the navigation cursor live under separate
//! keys and are read and written independently.

use crate::error::{ApiError, StorageError};
use crate::import::native;
use crate::navigation::CursorEntry;
use crate::store::NodeStore;
use crate::tree::node::Node;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Key holding the serialized node sequence
pub const NODES_KEY: &str = "bookmarks";
/// Key holding the opaque settings blob
pub const SETTINGS_KEY: &str = "settings";
/// Key holding the navigation cursor
pub const CURSOR_KEY: &str = "navigation";

/// Load/save contract of the external key-value store
pub trait KeyValueStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// sled-backed store; every write is flushed before returning
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = sled::open(path)?;
        Ok(Self { db })
    }
}

impl KeyValueStore for SledStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| StorageError::InvalidEncoding(key.to_string())),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.db.remove(key.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
///
/// `set_fail_writes(true)` makes every save and remove fail, which is how the
/// persistence-failure path is exercised.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteRejected(key.to_string()));
        }
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteRejected(key.to_string()));
        }
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Typed access to the three logical keys
#[derive(Clone)]
pub struct PersistenceGateway {
    backend: Arc<dyn KeyValueStore>,
}

impl PersistenceGateway {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Gateway over a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Gateway over a sled database at `path`
    pub fn sled(path: &Path) -> Result<Self, StorageError> {
        Ok(Self::new(Arc::new(SledStore::open(path)?)))
    }

    /// Stored node sequence, or `None` when nothing was saved yet.
    ///
    /// A stored value that is not a node sequence is an error: the caller must
    /// not start over on top of data it could not read.
    pub fn load_nodes(&self) -> Result<Option<Vec<Node>>, ApiError> {
        match self.backend.load(NODES_KEY)? {
            Some(text) => native::decode(&text).map(Some),
            None => Ok(None),
        }
    }

    pub fn save_nodes(&self, store: &NodeStore) -> Result<(), StorageError> {
        let text = native::encode(store)?;
        self.backend.save(NODES_KEY, &text)
    }

    /// Stored cursor path. Missing or unreadable data yields an empty path.
    pub fn load_cursor(&self) -> Result<Vec<CursorEntry>, StorageError> {
        let Some(text) = self.backend.load(CURSOR_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&text) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable navigation cursor");
                Ok(Vec::new())
            }
        }
    }

    pub fn save_cursor(&self, entries: &[CursorEntry]) -> Result<(), StorageError> {
        let text = serde_json::to_string(entries)?;
        self.backend.save(CURSOR_KEY, &text)
    }

    pub fn clear_cursor(&self) -> Result<(), StorageError> {
        self.backend.remove(CURSOR_KEY)
    }

    pub fn load_settings(&self) -> Result<Option<String>, StorageError> {
        self.backend.load(SETTINGS_KEY)
    }

    pub fn save_settings(&self, blob: &str) -> Result<(), StorageError> {
        self.backend.save(SETTINGS_KEY, blob)
    }
}
