//! Linkshelf: Hierarchical Bookmark Tree Engine
//!
//! An ordered forest of folders and links with validated structural edits,
//! a persistent drill-down cursor, recency-ranked search and import from the
//! native JSON format or Netscape bookmark exports.

pub mod api;
pub mod config;
pub mod enrich;
pub mod error;
pub mod import;
pub mod logging;
pub mod navigation;
pub mod search;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;

pub use api::{Applied, BookmarkApi};
pub use error::{ApiError, StorageError};
