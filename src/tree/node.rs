//! Bookmark node types

use crate::types::{Millis, NodeId, ROOT};
use serde::{Deserialize, Serialize};

/// Variant-specific payload of a node.
///
/// Serialized inline with the node envelope and discriminated by `type`
/// (`"folder"` or `"bookmark"`), matching the native interchange format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    Bookmark {
        url: String,
        /// Last visit, epoch milliseconds; 0 when never visited
        #[serde(rename = "accessTime", default)]
        access_time: Millis,
    },
}

/// A folder or link in the bookmark forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// Owning folder id, or [`ROOT`] for top-level nodes
    #[serde(default)]
    pub parent: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub order: i64,
}

impl Node {
    pub fn folder(id: impl Into<NodeId>, name: impl Into<String>, parent: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent: parent.into(),
            kind: NodeKind::Folder,
            order: 0,
        }
    }

    pub fn link(
        id: impl Into<NodeId>,
        name: impl Into<String>,
        url: impl Into<String>,
        parent: impl Into<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent: parent.into(),
            kind: NodeKind::Bookmark {
                url: url.into(),
                access_time: 0,
            },
            order: 0,
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder)
    }

    pub fn is_link(&self) -> bool {
        !self.is_folder()
    }

    pub fn is_top_level(&self) -> bool {
        self.parent == ROOT
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Bookmark { url, .. } => Some(url),
            NodeKind::Folder => None,
        }
    }

    /// Last access time; folders and never-visited links report 0
    pub fn access_time(&self) -> Millis {
        match &self.kind {
            NodeKind::Bookmark { access_time, .. } => *access_time,
            NodeKind::Folder => 0,
        }
    }

    pub fn type_label(&self) -> &'static str {
        match self.kind {
            NodeKind::Folder => "folder",
            NodeKind::Bookmark { .. } => "bookmark",
        }
    }
}

/// Payload for creating a node; the id, parent and order are assigned on add
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewNode {
    Folder { name: String },
    Link { name: String, url: String },
}

impl NewNode {
    pub fn folder(name: impl Into<String>) -> Self {
        NewNode::Folder { name: name.into() }
    }

    pub fn link(name: impl Into<String>, url: impl Into<String>) -> Self {
        NewNode::Link {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// In-place edit of a node. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditRequest {
    pub name: Option<String>,
    /// Only valid for links
    pub url: Option<String>,
    /// Reparent in the same call; `Some(ROOT)` moves to the top level
    pub parent: Option<NodeId>,
}

impl EditRequest {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.parent.is_none()
    }
}
