//! Persistence through sled and the in-memory backend

use linkshelf::store::persistence::{
    KeyValueStore, MemoryStore, PersistenceGateway, NODES_KEY,
};
use linkshelf::tree::{NewNode, TreeLimits};
use linkshelf::types::ROOT;
use linkshelf::{ApiError, BookmarkApi};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn sled_store_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store");

    let (folder, link) = {
        let gateway = PersistenceGateway::sled(&path).unwrap();
        let mut api = BookmarkApi::open(gateway, TreeLimits::default()).unwrap();
        let folder = api.add(ROOT, NewNode::folder("Dev")).unwrap().value;
        let link = api
            .add(&folder.id, NewNode::link("Rust", "https://rust.test"))
            .unwrap()
            .value;
        api.enter(&folder.id).unwrap();
        api.record_access(&link.id).unwrap();
        (folder, link)
    };

    let gateway = PersistenceGateway::sled(&path).unwrap();
    let api = BookmarkApi::open(gateway, TreeLimits::default()).unwrap();
    assert_eq!(api.store().len(), 2);
    assert_eq!(api.get(&folder.id).unwrap().name, "Dev");
    let reloaded = api.get(&link.id).unwrap();
    assert_eq!(reloaded.parent, folder.id);
    assert!(reloaded.access_time() > 0);
    assert_eq!(api.current_folder(), folder.id);
}

#[test]
fn empty_backend_opens_empty_tree() {
    let api = BookmarkApi::open(PersistenceGateway::in_memory(), TreeLimits::default()).unwrap();
    assert!(api.store().is_empty());
    assert!(api.navigation_path().is_empty());
}

#[test]
fn every_mutation_is_written_through() {
    let backend = Arc::new(MemoryStore::new());
    let mut api =
        BookmarkApi::open(PersistenceGateway::new(backend.clone()), TreeLimits::default()).unwrap();
    let folder = api.add(ROOT, NewNode::folder("Dev")).unwrap().value;
    let stored = backend.raw(NODES_KEY).unwrap();
    assert!(stored.contains(&folder.id));

    api.delete(&folder.id).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&backend.raw(NODES_KEY).unwrap()).unwrap();
    assert_eq!(stored, serde_json::json!([]));
}

#[test]
fn write_failure_is_reported_but_change_is_kept() {
    let backend = Arc::new(MemoryStore::new());
    let mut api =
        BookmarkApi::open(PersistenceGateway::new(backend.clone()), TreeLimits::default()).unwrap();
    let kept = api.add(ROOT, NewNode::folder("Kept")).unwrap().value;

    backend.set_fail_writes(true);
    let applied = api.add(ROOT, NewNode::folder("Unsaved")).unwrap();
    assert!(!applied.is_persisted());
    assert!(matches!(
        applied.warning,
        Some(ApiError::PersistenceFailure(_))
    ));
    assert_eq!(api.store().len(), 2);
    let nav = api.enter(&kept.id).unwrap();
    assert!(nav.warning.is_some());
    assert_eq!(api.current_folder(), kept.id);

    // the backend still holds the last successful write
    backend.set_fail_writes(false);
    let reopened =
        BookmarkApi::open(PersistenceGateway::new(backend.clone()), TreeLimits::default()).unwrap();
    assert_eq!(reopened.store().len(), 1);
}

#[test]
fn unreadable_node_blob_refuses_to_open() {
    let backend = Arc::new(MemoryStore::new());
    backend.save(NODES_KEY, "{\"bookmarks\": true}").unwrap();
    let result = BookmarkApi::open(PersistenceGateway::new(backend), TreeLimits::default());
    assert!(matches!(result, Err(ApiError::FormatError(_))));
}

#[test]
fn settings_blob_is_opaque() {
    let api = BookmarkApi::open(PersistenceGateway::in_memory(), TreeLimits::default()).unwrap();
    assert_eq!(api.settings().unwrap(), None);
    api.save_settings("{\"theme\":\"dark\"}").unwrap();
    assert_eq!(api.settings().unwrap().as_deref(), Some("{\"theme\":\"dark\"}"));
}
