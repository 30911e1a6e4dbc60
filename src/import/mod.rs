//! Import Parser
//!
//! Turns raw text into a replacement node sequence. Pure: nothing here touches
//! the store; the caller decides whether to apply the result.

pub mod markup;
pub mod native;
pub mod netscape;

use crate::error::ApiError;
use crate::tree::node::Node;
use crate::tree::TreeLimits;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Which of the two supported formats a document was read as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportFormat {
    Native,
    Netscape,
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportFormat::Native => write!(f, "native"),
            ImportFormat::Netscape => write!(f, "netscape"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImport {
    pub format: ImportFormat,
    pub nodes: Vec<Node>,
}

/// Result of a successful parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Nodes(ParsedImport),
    /// The document was recognized but yielded no nodes
    Empty(ImportFormat),
}

impl ImportOutcome {
    pub fn format(&self) -> ImportFormat {
        match self {
            ImportOutcome::Nodes(parsed) => parsed.format,
            ImportOutcome::Empty(format) => *format,
        }
    }
}

/// Cheap format sniff: a leading `[` means the native array, otherwise a
/// `<DL` tag anywhere means a Netscape export.
pub fn detect_format(text: &str) -> Option<ImportFormat> {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with('[') {
        Some(ImportFormat::Native)
    } else if trimmed.to_ascii_lowercase().contains("<dl") {
        Some(ImportFormat::Netscape)
    } else {
        None
    }
}

/// Detect the format of `text` and parse it.
pub fn parse_import(text: &str, limits: &TreeLimits) -> Result<ImportOutcome, ApiError> {
    let format = detect_format(text).ok_or_else(|| {
        ApiError::FormatError(
            "neither a native JSON array nor a Netscape bookmark file".to_string(),
        )
    })?;
    let nodes = match format {
        ImportFormat::Native => native::decode(text)?,
        ImportFormat::Netscape => netscape::parse(text, limits.max_depth)?,
    };
    info!(format = %format, nodes = nodes.len(), "Parsed import document");
    if nodes.is_empty() {
        return Ok(ImportOutcome::Empty(format));
    }
    Ok(ImportOutcome::Nodes(ParsedImport { format, nodes }))
}
