//! Error types for the bookmark tree engine.

use thiserror::Error;

/// Errors raised by a key-value backend or by (de)serializing its contents
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Value under key '{0}' is not valid UTF-8")]
    InvalidEncoding(String),

    #[error("Write rejected for key '{0}'")]
    WriteRejected(String),
}

/// Errors surfaced by tree, navigation, search and import operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// Lookup miss. Nothing was changed.
    #[error("Node not found: {0}")]
    NotFound(String),

    /// Self-parenting, cyclic or non-folder reparent. Nothing was changed.
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// Navigation or a structural change would exceed the maximum depth.
    #[error("Maximum depth {max_depth} exceeded: {message}")]
    DepthExceeded { max_depth: usize, message: String },

    /// Import text is not a recognizable bookmark document.
    #[error("Format error: {0}")]
    FormatError(String),

    /// Node fields fail validation (empty name, empty url, wrong variant).
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// The in-memory change happened but could not be written to the store.
    #[error("Change applied but not persisted: {0}")]
    PersistenceFailure(#[source] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

impl ApiError {
    pub(crate) fn depth(max_depth: usize, message: impl Into<String>) -> Self {
        ApiError::DepthExceeded {
            max_depth,
            message: message.into(),
        }
    }
}

/// Failures of the advisory title/favicon lookups. Never fatal to the caller.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No title found at {0}")]
    NoTitle(String),

    #[error("Timed out after {0} ms")]
    Timeout(u128),

    #[error("Superseded by a newer request")]
    Cancelled,
}
