//! Search ordering by recency and name

use linkshelf::search::search;
use linkshelf::store::NodeStore;
use linkshelf::tree::{NewNode, Node, NodeKind, TreeLimits};
use linkshelf::types::ROOT;
use linkshelf::BookmarkApi;

fn visited(id: &str, name: &str, at: i64) -> Node {
    let mut node = Node::link(id, name, format!("https://{}.test", id), ROOT);
    if let NodeKind::Bookmark { access_time, .. } = &mut node.kind {
        *access_time = at;
    }
    node
}

fn ids(hits: &[&Node]) -> Vec<String> {
    hits.iter().map(|n| n.id.clone()).collect()
}

#[test]
fn most_recent_first_then_never_visited() {
    let store = NodeStore::from_nodes(vec![
        visited("A", "Alpha", 100),
        visited("B", "Beta", 200),
        visited("C", "Gamma", 0),
    ]);
    assert_eq!(ids(&search(&store, "a")), vec!["B", "A", "C"]);
}

#[test]
fn ties_fall_back_to_name() {
    let store = NodeStore::from_nodes(vec![
        visited("z", "Zeta", 0),
        visited("a", "Alpha", 0),
    ]);
    let names: Vec<&str> = search(&store, "a").iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Zeta"]);
}

#[test]
fn search_spans_every_folder() {
    let mut api = BookmarkApi::in_memory(TreeLimits::default());
    let dev = api.add(ROOT, NewNode::folder("Dev")).unwrap().value;
    let deep = api.add(&dev.id, NewNode::folder("Deep")).unwrap().value;
    api.add(&deep.id, NewNode::link("Rust book", "https://book.test"))
        .unwrap();
    api.add(ROOT, NewNode::link("Rust blog", "https://blog.test"))
        .unwrap();

    let hits = api.search("RUST");
    assert_eq!(hits.len(), 2);
    assert!(api.search("python").is_empty());
    assert!(api.search("").is_empty());
}

#[test]
fn recording_access_moves_link_to_front() {
    let mut api = BookmarkApi::in_memory(TreeLimits::default());
    let first = api
        .add(ROOT, NewNode::link("Docs one", "https://1.test"))
        .unwrap()
        .value;
    let second = api
        .add(ROOT, NewNode::link("Docs two", "https://2.test"))
        .unwrap()
        .value;
    assert_eq!(api.search("docs")[0].id, first.id);

    api.record_access(&second.id).unwrap();
    assert_eq!(api.search("docs")[0].id, second.id);
    assert!(api.get(&second.id).unwrap().access_time() > 0);
}
