//! Native interchange format: a JSON array of flat node records.
//!
//! Decoding only insists that the document is an array. Each record is read
//! with every field optional and gaps are filled with defaults; a record that
//! cannot be read at all is dropped with a warning.

use crate::error::{ApiError, StorageError};
use crate::store::NodeStore;
use crate::tree::node::{Node, NodeKind};
use crate::types::{generate_node_id, Millis, NodeId, ROOT};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    id: Option<String>,
    name: Option<String>,
    parent: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    url: Option<String>,
    #[serde(rename = "accessTime")]
    access_time: Option<Millis>,
    order: Option<i64>,
}

impl RawRecord {
    fn is_folder(&self) -> bool {
        match self.kind.as_deref() {
            Some("folder") => true,
            Some("bookmark") => false,
            _ => self.url.is_none(),
        }
    }
}

/// Decode a native document into nodes in document order.
///
/// Defaults: a missing id is generated, a missing name is empty, a missing
/// parent is root, a missing or unknown type is inferred from the presence of
/// `url`, and a missing order places the record after its explicitly ordered
/// siblings.
pub fn decode(text: &str) -> Result<Vec<Node>, ApiError> {
    let document: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))
        .map_err(|e| ApiError::FormatError(format!("not a JSON document: {}", e)))?;
    let Value::Array(items) = document else {
        return Err(ApiError::FormatError(
            "expected an array of node records".to_string(),
        ));
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(item) {
            Ok(record) => records.push(record),
            Err(e) => warn!(index, error = %e, "Skipping unreadable node record"),
        }
    }

    let mut next_order: HashMap<String, i64> = HashMap::new();
    for record in &records {
        if let Some(order) = record.order {
            let parent = record.parent.clone().unwrap_or_default();
            let slot = next_order.entry(parent).or_insert(0);
            *slot = (*slot).max(order.saturating_add(1));
        }
    }

    let mut ids: HashSet<NodeId> = records.iter().filter_map(|r| r.id.clone()).collect();
    let mut nodes = Vec::with_capacity(records.len());
    for record in records {
        let folder = record.is_folder();
        let parent = record.parent.unwrap_or_else(|| ROOT.to_string());
        let order = match record.order {
            Some(order) => order,
            None => {
                let slot = next_order.entry(parent.clone()).or_insert(0);
                let order = *slot;
                *slot += 1;
                order
            }
        };
        let id = match record.id {
            Some(id) => id,
            None => {
                let id = generate_node_id(|candidate| ids.contains(candidate));
                ids.insert(id.clone());
                id
            }
        };
        let kind = if folder {
            NodeKind::Folder
        } else {
            NodeKind::Bookmark {
                url: record.url.unwrap_or_default(),
                access_time: record.access_time.unwrap_or(0),
            }
        };
        nodes.push(Node {
            id,
            name: record.name.unwrap_or_default(),
            parent,
            kind,
            order,
        });
    }
    debug!(nodes = nodes.len(), "Decoded native node records");
    Ok(nodes)
}

/// Serialize every node in store insertion order
pub fn encode(store: &NodeStore) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(&store.all())?)
}
