//! Integration tests for the bookmark tree engine

mod cli_commands;
mod navigation_restore;
mod persistence;
mod properties;
mod search_ranking;
