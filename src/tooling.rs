//! Tooling
//!
//! The `linkshelf` command-line front end and its text rendering.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
