//! Navigation cursor behavior across mutations and reopen

use linkshelf::navigation::CursorEntry;
use linkshelf::store::persistence::{KeyValueStore, MemoryStore, PersistenceGateway, CURSOR_KEY};
use linkshelf::tree::{EditRequest, NewNode, TreeLimits};
use linkshelf::types::ROOT;
use linkshelf::{ApiError, BookmarkApi};
use std::sync::Arc;

fn open(backend: &Arc<MemoryStore>, limits: TreeLimits) -> BookmarkApi {
    BookmarkApi::open(PersistenceGateway::new(backend.clone()), limits).unwrap()
}

fn path_names(api: &BookmarkApi) -> Vec<String> {
    api.navigation_path().into_iter().map(|e| e.name).collect()
}

#[test]
fn descend_into_replaces_deeper_levels() {
    let mut api = BookmarkApi::in_memory(TreeLimits::default());
    let a = api.add(ROOT, NewNode::folder("A")).unwrap().value;
    let b = api.add(&a.id, NewNode::folder("B")).unwrap().value;
    let c = api.add(ROOT, NewNode::folder("C")).unwrap().value;

    api.descend_into(&a.id, 0).unwrap();
    api.descend_into(&b.id, 1).unwrap();
    assert_eq!(path_names(&api), vec!["A", "B"]);

    let path = api.descend_into(&c.id, 0).unwrap().value;
    assert_eq!(path, vec![CursorEntry::new(c.id.clone(), "C")]);
    assert_eq!(api.current_folder(), c.id);
}

#[test]
fn descend_into_rejects_bad_targets() {
    let mut api = BookmarkApi::in_memory(TreeLimits { max_depth: 2 });
    let a = api.add(ROOT, NewNode::folder("A")).unwrap().value;
    let b = api.add(&a.id, NewNode::folder("B")).unwrap().value;
    let link = api
        .add(ROOT, NewNode::link("L", "https://l.test"))
        .unwrap()
        .value;

    assert!(matches!(
        api.descend_into("missing", 0),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        api.descend_into(&link.id, 0),
        Err(ApiError::InvalidNode(_))
    ));
    // B is not a top-level folder
    assert!(matches!(
        api.descend_into(&b.id, 0),
        Err(ApiError::InvalidNode(_))
    ));
    assert!(matches!(
        api.descend_into(&a.id, 2),
        Err(ApiError::DepthExceeded { .. })
    ));
    assert!(api.navigation_path().is_empty());
}

#[test]
fn ascend_past_root_stops_at_root() {
    let mut api = BookmarkApi::in_memory(TreeLimits::default());
    let a = api.add(ROOT, NewNode::folder("A")).unwrap().value;
    api.enter(&a.id).unwrap();
    let path = api.ascend(5).value;
    assert!(path.is_empty());
    assert_eq!(api.current_folder(), ROOT);
}

#[test]
fn cursor_is_restored_on_reopen() {
    let backend = Arc::new(MemoryStore::new());
    let (a, b) = {
        let mut api = open(&backend, TreeLimits::default());
        let a = api.add(ROOT, NewNode::folder("A")).unwrap().value;
        let b = api.add(&a.id, NewNode::folder("B")).unwrap().value;
        api.enter(&a.id).unwrap();
        api.enter(&b.id).unwrap();
        (a, b)
    };

    let api = open(&backend, TreeLimits::default());
    let path = api.navigation_path();
    assert_eq!(
        path,
        vec![CursorEntry::new(a.id, "A"), CursorEntry::new(b.id.clone(), "B")]
    );
    assert_eq!(api.current_folder(), b.id);
}

#[test]
fn stale_saved_cursor_keeps_longest_valid_prefix() {
    let backend = Arc::new(MemoryStore::new());
    let a = {
        let mut api = open(&backend, TreeLimits::default());
        api.add(ROOT, NewNode::folder("A")).unwrap().value
    };
    let stale = serde_json::to_string(&vec![
        CursorEntry::new(a.id.clone(), "Old name"),
        CursorEntry::new("gone", "Gone"),
        CursorEntry::new("also-gone", "Also gone"),
    ])
    .unwrap();
    backend.save(CURSOR_KEY, &stale).unwrap();

    let api = open(&backend, TreeLimits::default());
    assert_eq!(api.navigation_path(), vec![CursorEntry::new(a.id, "A")]);
}

#[test]
fn unreadable_saved_cursor_starts_at_root() {
    let backend = Arc::new(MemoryStore::new());
    {
        let mut api = open(&backend, TreeLimits::default());
        api.add(ROOT, NewNode::folder("A")).unwrap();
    }
    backend.save(CURSOR_KEY, "{{{ not json").unwrap();
    let api = open(&backend, TreeLimits::default());
    assert!(api.navigation_path().is_empty());
    assert_eq!(api.store().len(), 1);
}

#[test]
fn restored_cursor_is_capped_at_max_depth() {
    let backend = Arc::new(MemoryStore::new());
    {
        let mut api = open(&backend, TreeLimits::default());
        let a = api.add(ROOT, NewNode::folder("A")).unwrap().value;
        let b = api.add(&a.id, NewNode::folder("B")).unwrap().value;
        let c = api.add(&b.id, NewNode::folder("C")).unwrap().value;
        for id in [&a.id, &b.id, &c.id] {
            api.enter(id).unwrap();
        }
    }
    let api = open(&backend, TreeLimits { max_depth: 2 });
    assert_eq!(path_names(&api), vec!["A", "B"]);
}

#[test]
fn mutations_keep_cursor_in_line_with_tree() {
    let mut api = BookmarkApi::in_memory(TreeLimits::default());
    let a = api.add(ROOT, NewNode::folder("A")).unwrap().value;
    let b = api.add(&a.id, NewNode::folder("B")).unwrap().value;
    let other = api.add(ROOT, NewNode::folder("Other")).unwrap().value;
    api.enter(&a.id).unwrap();
    api.enter(&b.id).unwrap();

    api.edit(&b.id, EditRequest::rename("Renamed")).unwrap();
    assert_eq!(path_names(&api), vec!["A", "Renamed"]);

    // B leaves A, so the path can only keep A
    api.reparent(&b.id, &other.id).unwrap();
    assert_eq!(path_names(&api), vec!["A"]);

    api.delete(&a.id).unwrap();
    assert!(api.navigation_path().is_empty());
}

#[test]
fn reset_navigation_clears_saved_cursor() {
    let backend = Arc::new(MemoryStore::new());
    let mut api = open(&backend, TreeLimits::default());
    let a = api.add(ROOT, NewNode::folder("A")).unwrap().value;
    api.enter(&a.id).unwrap();
    assert!(backend.raw(CURSOR_KEY).is_some());

    let applied = api.reset_navigation();
    assert!(applied.is_persisted());
    assert!(backend.raw(CURSOR_KEY).is_none());
    assert!(api.navigation_path().is_empty());
}
