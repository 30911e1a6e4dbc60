//! Search & Ranking
//!
//! Flat name search over the whole store, ranked by most recent access.

use crate::error::ApiError;
use crate::store::NodeStore;
use crate::tree::node::{Node, NodeKind};
use crate::types::Millis;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Nodes whose name contains `query`, case-insensitively.
///
/// Ordered by access time, most recent first (never visited last), then by
/// name with accents and case folded. A blank query matches nothing.
pub fn search<'a>(store: &'a NodeStore, query: &str) -> Vec<&'a Node> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let mut hits: Vec<(&Node, String)> = store
        .all()
        .into_iter()
        .filter(|node| node.name.to_lowercase().contains(&needle))
        .map(|node| (node, collation_key(&node.name)))
        .collect();
    hits.sort_by(|(a, a_key), (b, b_key)| rank(a, a_key, b, b_key));
    hits.into_iter().map(|(node, _)| node).collect()
}

fn rank(a: &Node, a_key: &str, b: &Node, b_key: &str) -> Ordering {
    b.access_time()
        .cmp(&a.access_time())
        .then_with(|| a_key.cmp(b_key))
        .then_with(|| a.name.cmp(&b.name))
}

/// Comparison key that ignores case and diacritics ("Éclair" sorts with "eclair")
pub fn collation_key(name: &str) -> String {
    name.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Set a link's access time. Folders have no access time to record.
pub fn touch(store: &mut NodeStore, id: &str, at: Millis) -> Result<Node, ApiError> {
    let node = store
        .get_mut(id)
        .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
    match &mut node.kind {
        NodeKind::Bookmark { access_time, .. } => {
            *access_time = at;
            Ok(node.clone())
        }
        NodeKind::Folder => Err(ApiError::InvalidNode(format!(
            "{} is a folder; only links record access",
            id
        ))),
    }
}
