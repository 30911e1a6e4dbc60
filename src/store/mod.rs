//! Node Store
//!
//! Flat id -> node mapping that every other component reads and writes through.
//! Children are never stored; they are derived by filtering on `parent`, and
//! each node remembers the position at which it first entered the store so
//! that siblings with equal `order` still have a total order.

pub mod persistence;

use crate::tree::node::Node;
use crate::types::{NodeId, ROOT};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    node: Node,
}

/// In-memory node store
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    slots: HashMap<NodeId, Slot>,
    next_seq: u64,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store whose insertion order is the order of `nodes`
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut store = Self::new();
        store.replace_all(nodes);
        store
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Node> {
        self.slots.get(id).map(|slot| &slot.node)
    }

    pub fn is_folder(&self, id: &str) -> bool {
        self.get_by_id(id).map(Node::is_folder).unwrap_or(false)
    }

    /// Parent used for traversal: the stored parent when it names an existing
    /// folder other than the node itself, otherwise [`ROOT`].
    pub fn effective_parent<'a>(&self, node: &'a Node) -> &'a str {
        if node.parent != ROOT && node.parent != node.id && self.is_folder(&node.parent) {
            &node.parent
        } else {
            ROOT
        }
    }

    /// Children of `parent_id` sorted by `order`, then insertion index
    pub fn children_of(&self, parent_id: &str) -> Vec<&Node> {
        let mut children: Vec<&Slot> = self
            .slots
            .values()
            .filter(|slot| self.effective_parent(&slot.node) == parent_id)
            .collect();
        children.sort_by_key(|slot| (slot.node.order, slot.seq));
        children.into_iter().map(|slot| &slot.node).collect()
    }

    pub fn child_count(&self, parent_id: &str) -> usize {
        self.slots
            .values()
            .filter(|slot| self.effective_parent(&slot.node) == parent_id)
            .count()
    }

    /// Order that sorts after every current child of `parent_id`: one past the
    /// largest sibling order, or 0 for an empty folder
    pub fn next_order(&self, parent_id: &str) -> i64 {
        self.slots
            .values()
            .filter(|slot| self.effective_parent(&slot.node) == parent_id)
            .map(|slot| slot.node.order)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }

    /// Effective-parent -> child ids, each list in sibling order.
    ///
    /// Computed once for whole-tree walks so they stay linear in store size.
    pub fn children_index(&self) -> HashMap<&str, Vec<&str>> {
        let mut ordered: Vec<&Slot> = self.slots.values().collect();
        ordered.sort_by_key(|slot| (slot.node.order, slot.seq));
        let mut index: HashMap<&str, Vec<&str>> = HashMap::new();
        for slot in ordered {
            index
                .entry(self.effective_parent(&slot.node))
                .or_default()
                .push(slot.node.id.as_str());
        }
        index
    }

    /// All nodes in insertion order
    pub fn all(&self) -> Vec<&Node> {
        let mut slots: Vec<&Slot> = self.slots.values().collect();
        slots.sort_by_key(|slot| slot.seq);
        slots.into_iter().map(|slot| &slot.node).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.slots.values().map(|slot| &slot.node)
    }

    /// Insert or replace. A replaced node keeps its original insertion index.
    pub fn upsert(&mut self, node: Node) {
        match self.slots.get_mut(&node.id) {
            Some(slot) => slot.node = node,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.slots.insert(node.id.clone(), Slot { seq, node });
            }
        }
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<Node> {
        self.slots.remove(id).map(|slot| slot.node)
    }

    /// Drop every node and load `nodes` in the given order.
    ///
    /// A later record with an id already seen replaces the earlier one.
    pub fn replace_all(&mut self, nodes: Vec<Node>) {
        self.slots.clear();
        self.next_seq = 0;
        for node in nodes {
            self.upsert(node);
        }
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.slots.get_mut(id).map(|slot| &mut slot.node)
    }
}
