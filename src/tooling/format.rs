//! Text rendering of nodes, trees, search hits and status for the CLI.

use crate::navigation::CursorEntry;
use crate::store::NodeStore;
use crate::tree::node::Node;
use crate::types::{Millis, ROOT};
use chrono::{TimeZone, Utc};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::collections::HashSet;

/// Bold, underlined section title
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// `never` for 0, otherwise UTC date and time
pub fn format_access_time(at: Millis) -> String {
    if at <= 0 {
        return "never".to_string();
    }
    match Utc.timestamp_millis_opt(at).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M").to_string(),
        None => at.to_string(),
    }
}

/// `/` for root, otherwise `/A/B`
pub fn format_path(entries: &[CursorEntry]) -> String {
    if entries.is_empty() {
        return "/".to_string();
    }
    entries.iter().fold(String::new(), |mut path, entry| {
        path.push('/');
        path.push_str(&entry.name);
        path
    })
}

fn target_column(node: &Node, store: &NodeStore) -> String {
    match node.url() {
        Some(url) => url.to_string(),
        None => format!("{} items", store.child_count(&node.id)),
    }
}

/// Children listing of one folder
pub fn format_children(title: &str, nodes: &[&Node], store: &NodeStore) -> String {
    let mut out = format!("{}\n\n", format_section_heading(title));
    if nodes.is_empty() {
        out.push_str("  (empty)\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Name", "Type", "Target", "Id"]);
    for (position, node) in nodes.iter().enumerate() {
        table.add_row(vec![
            position.to_string(),
            node.name.clone(),
            node.type_label().to_string(),
            target_column(node, store),
            node.id.clone(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Search hits in rank order
pub fn format_search_results(query: &str, hits: &[&Node]) -> String {
    let mut out = format!(
        "{}\n\n",
        format_section_heading(&format!("Results for \"{}\"", query.trim()))
    );
    if hits.is_empty() {
        out.push_str("  No matches\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Type", "Last visit", "Id"]);
    for node in hits {
        table.add_row(vec![
            node.name.clone(),
            node.type_label().to_string(),
            format_access_time(node.access_time()),
            node.id.clone(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Indented outline of the subtree under `start` ([`ROOT`] for everything)
pub fn format_tree(store: &NodeStore, start: &str) -> String {
    let index = store.children_index();
    let mut out = String::new();
    let mut seen: HashSet<&str> = HashSet::from([start]);
    // depth-first with an explicit stack; children pushed in reverse
    let mut stack: Vec<(&str, usize)> = index
        .get(start)
        .into_iter()
        .flatten()
        .rev()
        .map(|&id| (id, 0))
        .collect();
    while let Some((id, level)) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        let Some(node) = store.get_by_id(id) else {
            continue;
        };
        let indent = "  ".repeat(level);
        match node.url() {
            Some(url) => out.push_str(&format!("{}- {} <{}>\n", indent, node.name, url)),
            None => out.push_str(&format!("{}+ {}/\n", indent, node.name.bold())),
        }
        for &child in index.get(id).into_iter().flatten().rev() {
            stack.push((child, level + 1));
        }
    }
    if out.is_empty() {
        out.push_str("(empty)\n");
    }
    out
}

/// Store summary for `status`
pub fn format_status(
    store: &NodeStore,
    store_path: &str,
    max_depth: usize,
    cursor: &[CursorEntry],
) -> String {
    let folders = store.iter().filter(|n| n.is_folder()).count();
    let links = store.len() - folders;
    let top_level = store.child_count(ROOT);

    let mut out = format!("{}\n\n", format_section_heading("Bookmark Store"));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Property", "Value"]);
    table.add_row(vec!["Store path".to_string(), store_path.to_string()]);
    table.add_row(vec!["Folders".to_string(), folders.to_string()]);
    table.add_row(vec!["Links".to_string(), links.to_string()]);
    table.add_row(vec!["Top-level entries".to_string(), top_level.to_string()]);
    table.add_row(vec!["Max depth".to_string(), max_depth.to_string()]);
    table.add_row(vec!["Current folder".to_string(), format_path(cursor)]);
    out.push_str(&format!("{}\n", table));
    out
}
