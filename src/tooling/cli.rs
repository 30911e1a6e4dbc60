//! CLI Tooling
//!
//! Command-line interface over [`BookmarkApi`]. Every command renders to a
//! string; `main` prints it.

use super::format::{
    format_children, format_path, format_search_results, format_section_heading, format_status,
    format_tree,
};
use crate::api::{Applied, BookmarkApi};
use crate::config::ShelfConfig;
use crate::enrich::{HttpEnricher, TitleDebouncer};
use crate::error::{ApiError, StorageError};
use crate::import::{self, ImportOutcome};
use crate::logging::LoggingConfig;
use crate::navigation::CursorAutosave;
use crate::store::persistence::PersistenceGateway;
use crate::tree::{EditRequest, NewNode, ReorderTarget};
use crate::types::ROOT;
use clap::{ArgGroup, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Linkshelf - hierarchical bookmark manager
#[derive(Parser, Debug)]
#[command(name = "linkshelf")]
#[command(version, about = "Organize bookmarks in ordered, nested folders")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store directory (overrides storage.path)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// `base` with the command-line log flags applied on top
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a folder or link
    Add {
        #[command(subcommand)]
        command: AddCommands,
    },
    /// Rename a node, change a link's url, or move it in one step
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// New parent folder id ("" for top level)
        #[arg(long)]
        parent: Option<String>,
    },
    /// Move a node under another folder
    Move {
        id: String,
        /// Target folder id; omit for top level
        #[arg(long, default_value = "")]
        to: String,
    },
    /// Change a node's position among its siblings
    #[command(group(ArgGroup::new("position").required(true).args(["before", "end"])))]
    Reorder {
        id: String,
        /// Place immediately before this sibling
        #[arg(long)]
        before: Option<String>,
        /// Place after the last sibling
        #[arg(long)]
        end: bool,
    },
    /// Delete a node and everything under it
    Delete {
        id: String,
        /// Skip confirmation for non-empty folders
        #[arg(long)]
        force: bool,
    },
    /// List the children of a folder (default: current folder)
    List {
        folder: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the folder outline
    Tree {
        /// Start folder (default: top level)
        folder: Option<String>,
    },
    /// Search names, most recently visited first
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Record a visit to a link and print its url
    Open { id: String },
    /// Move the navigation cursor
    Nav {
        #[command(subcommand)]
        command: NavCommands,
    },
    /// Replace the store with a native JSON or Netscape HTML export
    Import {
        path: PathBuf,
        /// Replace a non-empty store without asking
        #[arg(long)]
        yes: bool,
    },
    /// Export the store as native JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show store statistics
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Interactive session with periodic cursor autosave
    Shell,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddCommands {
    Folder {
        name: String,
        /// Parent folder id (default: current folder)
        #[arg(long)]
        parent: Option<String>,
    },
    Link {
        url: String,
        /// Display name (default: fetched title or the url)
        #[arg(long)]
        name: Option<String>,
        /// Parent folder id (default: current folder)
        #[arg(long)]
        parent: Option<String>,
        /// Look up the page title when no name is given
        #[arg(long)]
        fetch_title: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum NavCommands {
    /// Descend into a child folder of the current folder
    Enter { folder: String },
    /// Go up one or more levels
    Up {
        #[arg(default_value = "1")]
        levels: usize,
    },
    /// Print the current path
    Show,
    /// Return to the top level
    Reset,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
}

/// One line typed into `linkshelf shell`
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Commands,
}

/// CLI context: the opened store plus the configuration it was opened with
pub struct CliContext {
    api: BookmarkApi,
    config: ShelfConfig,
    store_path: Option<PathBuf>,
}

impl CliContext {
    /// Open the sled store named by `store_override` or the configuration
    pub fn new(config: ShelfConfig, store_override: Option<PathBuf>) -> Result<Self, ApiError> {
        let store_path = match store_override {
            Some(path) => path,
            None => config.store_path()?,
        };
        let gateway = PersistenceGateway::sled(&store_path)?;
        let api = BookmarkApi::open(gateway, config.tree)?;
        info!(store = %store_path.display(), "CLI context ready");
        Ok(Self {
            api,
            config,
            store_path: Some(store_path),
        })
    }

    /// Context over an already opened API (tests, embedding)
    pub fn with_api(api: BookmarkApi, config: ShelfConfig) -> Self {
        Self {
            api,
            config,
            store_path: None,
        }
    }

    pub fn api(&self) -> &BookmarkApi {
        &self.api
    }

    /// Execute a CLI command
    pub fn execute(&mut self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Add { command } => self.handle_add(command),
            Commands::Edit {
                id,
                name,
                url,
                parent,
            } => {
                let request = EditRequest {
                    name: name.clone(),
                    url: url.clone(),
                    parent: parent.clone(),
                };
                let applied = self.api.edit(id, request)?;
                let message = format!("Updated {} ({})", applied.value.name, applied.value.id);
                Ok(with_warning(message, &applied))
            }
            Commands::Move { id, to } => {
                let applied = self.api.reparent(id, to)?;
                let destination = self.folder_label(to);
                let message = format!("Moved {} to {}", applied.value.name, destination);
                Ok(with_warning(message, &applied))
            }
            Commands::Reorder { id, before, .. } => {
                let target = match before {
                    Some(sibling) => ReorderTarget::Before(sibling.clone()),
                    None => ReorderTarget::End,
                };
                let applied = self.api.reorder(id, &target)?;
                let position = applied
                    .value
                    .iter()
                    .position(|sibling| sibling == id)
                    .unwrap_or_default();
                let message = format!("Moved {} to position {}", id, position);
                Ok(with_warning(message, &applied))
            }
            Commands::Delete { id, force } => self.handle_delete(id, *force),
            Commands::List { folder, format } => self.handle_list(folder.as_deref(), format),
            Commands::Tree { folder } => {
                let start = folder.clone().unwrap_or_else(|| ROOT.to_string());
                if start != ROOT && !self.api.store().is_folder(&start) {
                    return Err(ApiError::NotFound(start));
                }
                Ok(format_tree(self.api.store(), &start))
            }
            Commands::Search {
                query,
                limit,
                format,
            } => {
                let mut hits = self.api.search(query);
                if let Some(limit) = limit {
                    hits.truncate(*limit);
                }
                match format.as_str() {
                    "json" => to_json(&hits),
                    _ => Ok(format_search_results(query, &hits)),
                }
            }
            Commands::Open { id } => {
                let applied = self.api.record_access(id)?;
                let url = applied.value.url().unwrap_or_default().to_string();
                Ok(with_warning(url, &applied))
            }
            Commands::Nav { command } => self.handle_nav(command),
            Commands::Import { path, yes } => self.handle_import(path, *yes),
            Commands::Export { output } => {
                let text = self.api.export()?;
                match output {
                    Some(path) => {
                        std::fs::write(path, text).map_err(StorageError::from)?;
                        Ok(format!(
                            "Exported {} nodes to {}",
                            self.api.store().len(),
                            path.display()
                        ))
                    }
                    None => Ok(text),
                }
            }
            Commands::Status { format } => self.handle_status(format),
            Commands::Config { command } => match command {
                ConfigCommands::Show => self.config.to_toml(),
            },
            Commands::Shell => self.run_shell(),
        }
    }

    fn handle_add(&mut self, command: &AddCommands) -> Result<String, ApiError> {
        match command {
            AddCommands::Folder { name, parent } => {
                let parent = self.parent_or_current(parent.as_deref());
                let applied = self.api.add(&parent, NewNode::folder(name.clone()))?;
                let message = format!("Added folder {} ({})", applied.value.name, applied.value.id);
                Ok(with_warning(message, &applied))
            }
            AddCommands::Link {
                url,
                name,
                parent,
                fetch_title,
            } => {
                let parent = self.parent_or_current(parent.as_deref());
                let name = match name {
                    Some(name) => name.clone(),
                    None if *fetch_title => self.fetch_title(url).unwrap_or_else(|| url.clone()),
                    None => url.clone(),
                };
                let applied = self.api.add(&parent, NewNode::link(name, url.clone()))?;
                let message = format!("Added link {} ({})", applied.value.name, applied.value.id);
                Ok(with_warning(message, &applied))
            }
        }
    }

    /// Best-effort page title; any failure falls back to no title
    fn fetch_title(&self, url: &str) -> Option<String> {
        let settings = &self.config.enrichment;
        if !settings.enabled {
            return None;
        }
        let enricher = match HttpEnricher::new(settings) {
            Ok(enricher) => enricher,
            Err(e) => {
                warn!(error = %e, "Title lookup unavailable");
                return None;
            }
        };
        // single lookup, nothing to debounce against
        let debouncer = TitleDebouncer::new(Arc::new(enricher), Duration::ZERO, settings.timeout());
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "Failed to create runtime for title lookup");
                return None;
            }
        };
        runtime.block_on(debouncer.request(url)).ok()
    }

    fn handle_delete(&mut self, id: &str, force: bool) -> Result<String, ApiError> {
        let node = self
            .api
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        let children = self.api.children(id).len();
        if node.is_folder() && children > 0 && !force {
            use dialoguer::Confirm;
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Delete folder '{}' and everything in it?",
                    node.name
                ))
                .interact()
                .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))?;
            if !confirmed {
                return Ok("Deletion cancelled".to_string());
            }
        }
        let applied = self.api.delete(id)?;
        let message = format!("Deleted {} ({} nodes)", node.name, applied.value.len());
        Ok(with_warning(message, &applied))
    }

    fn handle_list(&self, folder: Option<&str>, format: &str) -> Result<String, ApiError> {
        let folder = match folder {
            Some(folder) => folder.to_string(),
            None => self.api.current_folder(),
        };
        if folder != ROOT && !self.api.store().is_folder(&folder) {
            return Err(ApiError::NotFound(folder));
        }
        let children = self.api.children(&folder);
        match format {
            "json" => to_json(&children),
            _ => Ok(format_children(
                &self.folder_label(&folder),
                &children,
                self.api.store(),
            )),
        }
    }

    fn handle_nav(&mut self, command: &NavCommands) -> Result<String, ApiError> {
        let (path, warning) = match command {
            NavCommands::Enter { folder } => {
                let applied = self.api.enter(folder)?;
                (applied.value, applied.warning)
            }
            NavCommands::Up { levels } => {
                let applied = self.api.ascend(*levels);
                (applied.value, applied.warning)
            }
            NavCommands::Show => (self.api.navigation_path(), None),
            NavCommands::Reset => {
                let applied = self.api.reset_navigation();
                (Vec::new(), applied.warning)
            }
        };
        let mut out = format_path(&path);
        if let Some(warning) = warning {
            out.push_str(&format!("\nWarning: {}", warning));
        }
        Ok(out)
    }

    fn handle_import(&mut self, path: &Path, yes: bool) -> Result<String, ApiError> {
        let text = std::fs::read_to_string(path).map_err(StorageError::from)?;
        let outcome = import::parse_import(&text, self.api.limits())?;
        let parsed = match outcome {
            ImportOutcome::Empty(format) => {
                return Ok(format!(
                    "No bookmarks found in {} ({} format); store left unchanged",
                    path.display(),
                    format
                ));
            }
            ImportOutcome::Nodes(parsed) => parsed,
        };
        let existing = self.api.store().len();
        if existing > 0 && !yes {
            use dialoguer::Confirm;
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Replace {} existing nodes with {} imported nodes?",
                    existing,
                    parsed.nodes.len()
                ))
                .interact()
                .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))?;
            if !confirmed {
                return Ok("Import cancelled".to_string());
            }
        }
        let applied = self.api.replace_all(parsed.nodes);
        let message = format!(
            "Imported {} nodes ({} format)",
            applied.value, parsed.format
        );
        Ok(with_warning(message, &applied))
    }

    fn handle_status(&self, format: &str) -> Result<String, ApiError> {
        let store = self.api.store();
        let store_path = self
            .store_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(memory)".to_string());
        let path = self.api.navigation_path();
        match format {
            "json" => {
                let folders = store.iter().filter(|n| n.is_folder()).count();
                to_json(&serde_json::json!({
                    "store_path": store_path,
                    "nodes": store.len(),
                    "folders": folders,
                    "links": store.len() - folders,
                    "max_depth": self.api.limits().max_depth,
                    "cursor": path,
                }))
            }
            _ => Ok(format_status(
                store,
                &store_path,
                self.api.limits().max_depth,
                &path,
            )),
        }
    }

    /// Read commands from stdin until EOF or `exit`
    fn run_shell(&mut self) -> Result<String, ApiError> {
        let mut autosave = self.config.navigation.autosave_interval().map(|interval| {
            CursorAutosave::spawn(
                self.api.cursor_handle(),
                self.api.gateway().clone(),
                interval,
            )
        });
        println!(
            "{}\nType a command (e.g. `list`, `nav enter <id>`), `exit` to leave.",
            format_section_heading("linkshelf shell")
        );

        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("{}> ", format_path(&self.api.navigation_path()));
            std::io::stdout().flush().map_err(StorageError::from)?;
            let Some(line) = lines.next() else {
                break;
            };
            let line = line.map_err(StorageError::from)?;
            let words = split_words(&line);
            match words.first().map(String::as_str) {
                None => continue,
                Some("exit") | Some("quit") => break,
                _ => {}
            }
            match ShellLine::try_parse_from(&words) {
                Ok(ShellLine {
                    command: Commands::Shell,
                }) => println!("Already in a shell"),
                Ok(parsed) => match self.execute(&parsed.command) {
                    Ok(output) => println!("{}", output),
                    Err(e) => println!("Error: {}", e),
                },
                Err(e) => println!("{}", e),
            }
        }

        if let Some(autosave) = autosave.as_mut() {
            autosave.stop();
        }
        let snapshot = self.api.navigation_path();
        self.api.gateway().save_cursor(&snapshot)?;
        Ok("Bye".to_string())
    }

    fn parent_or_current(&self, parent: Option<&str>) -> String {
        match parent {
            Some(parent) => parent.to_string(),
            None => self.api.current_folder(),
        }
    }

    fn folder_label(&self, id: &str) -> String {
        match self.api.get(id) {
            Some(node) if id != ROOT => node.name.clone(),
            _ => "Top level".to_string(),
        }
    }
}

fn with_warning<T>(message: String, applied: &Applied<T>) -> String {
    match &applied.warning {
        Some(warning) => format!("{}\nWarning: {}", message, warning),
        None => message,
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::StorageError(StorageError::Serialization(e)))
}

/// Whitespace-separated words; double quotes group words and are removed
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_word = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}
