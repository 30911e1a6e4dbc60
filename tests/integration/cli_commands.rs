//! CLI parsing and output contracts

use clap::{CommandFactory, Parser};
use linkshelf::config::ShelfConfig;
use linkshelf::tooling::cli::{AddCommands, Cli, CliContext, Commands, NavCommands};
use linkshelf::tree::TreeLimits;
use linkshelf::types::ROOT;
use linkshelf::BookmarkApi;
use std::fs;
use tempfile::TempDir;

fn memory_context() -> CliContext {
    CliContext::with_api(
        BookmarkApi::in_memory(TreeLimits::default()),
        ShelfConfig::default(),
    )
}

fn add_folder(ctx: &mut CliContext, name: &str) -> String {
    ctx.execute(&Commands::Add {
        command: AddCommands::Folder {
            name: name.to_string(),
            parent: None,
        },
    })
    .unwrap();
    ctx.api()
        .search(name)
        .first()
        .map(|n| n.id.clone())
        .unwrap()
}

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["linkshelf", "add", "folder", "Dev"],
        vec!["linkshelf", "add", "folder", "Dev", "--parent", "abc"],
        vec!["linkshelf", "add", "link", "https://x.test", "--name", "X"],
        vec!["linkshelf", "add", "link", "https://x.test", "--fetch-title"],
        vec!["linkshelf", "edit", "abc", "--name", "New", "--url", "https://y.test"],
        vec!["linkshelf", "move", "abc", "--to", "def"],
        vec!["linkshelf", "move", "abc"],
        vec!["linkshelf", "reorder", "abc", "--before", "def"],
        vec!["linkshelf", "reorder", "abc", "--end"],
        vec!["linkshelf", "delete", "abc", "--force"],
        vec!["linkshelf", "list", "--format", "json"],
        vec!["linkshelf", "tree"],
        vec!["linkshelf", "search", "rust", "--limit", "5"],
        vec!["linkshelf", "open", "abc"],
        vec!["linkshelf", "nav", "enter", "abc"],
        vec!["linkshelf", "nav", "up"],
        vec!["linkshelf", "nav", "show"],
        vec!["linkshelf", "nav", "reset"],
        vec!["linkshelf", "import", "bookmarks.html", "--yes"],
        vec!["linkshelf", "export", "--output", "out.json"],
        vec!["linkshelf", "status", "--format", "json"],
        vec!["linkshelf", "config", "show"],
        vec!["linkshelf", "--store", "/tmp/shelf", "--log-level", "debug", "tree"],
        vec!["linkshelf", "shell"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_commands() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["linkshelf"],
        vec!["linkshelf", "add"],
        vec!["linkshelf", "add", "link"],
        vec!["linkshelf", "reorder", "abc", "--before", "def", "--end"],
        vec!["linkshelf", "reorder", "abc"],
        vec!["linkshelf", "nav", "up", "many"],
        vec!["linkshelf", "search"],
    ];
    for args in cases {
        assert!(
            Cli::try_parse_from(args.clone()).is_err(),
            "expected parse failure for args: {args:?}"
        );
    }
}

#[test]
fn help_lists_every_top_level_command() {
    let help = Cli::command().render_help().to_string();
    for name in [
        "add", "edit", "move", "reorder", "delete", "list", "tree", "search", "open", "nav",
        "import", "export", "status", "config", "shell",
    ] {
        assert!(help.contains(name), "help should mention {name}");
    }
}

#[test]
fn list_json_contract_has_node_fields() {
    let mut ctx = memory_context();
    let dev = add_folder(&mut ctx, "Dev");
    ctx.execute(&Commands::Add {
        command: AddCommands::Link {
            url: "https://rust.test".to_string(),
            name: Some("Rust".to_string()),
            parent: Some(dev.clone()),
            fetch_title: false,
        },
    })
    .unwrap();

    let output = ctx
        .execute(&Commands::List {
            folder: Some(dev.clone()),
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let items = parsed.as_array().expect("list output should be an array");
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert!(item.get("id").and_then(|v| v.as_str()).is_some());
    assert_eq!(item.get("name").and_then(|v| v.as_str()), Some("Rust"));
    assert_eq!(item.get("parent").and_then(|v| v.as_str()), Some(dev.as_str()));
    assert_eq!(item.get("type").and_then(|v| v.as_str()), Some("bookmark"));
    assert_eq!(item.get("url").and_then(|v| v.as_str()), Some("https://rust.test"));
    assert_eq!(item.get("accessTime").and_then(|v| v.as_i64()), Some(0));
    assert_eq!(item.get("order").and_then(|v| v.as_i64()), Some(0));
}

#[test]
fn status_json_contract_has_required_fields() {
    let mut ctx = memory_context();
    let dev = add_folder(&mut ctx, "Dev");
    ctx.execute(&Commands::Nav {
        command: NavCommands::Enter { folder: dev },
    })
    .unwrap();

    let output = ctx
        .execute(&Commands::Status {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed.get("store_path").and_then(|v| v.as_str()), Some("(memory)"));
    assert_eq!(parsed.get("nodes").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(parsed.get("folders").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(parsed.get("links").and_then(|v| v.as_u64()), Some(0));
    assert_eq!(parsed.get("max_depth").and_then(|v| v.as_u64()), Some(8));
    let cursor = parsed
        .get("cursor")
        .and_then(|v| v.as_array())
        .expect("cursor array should exist");
    assert_eq!(cursor.len(), 1);
    assert_eq!(cursor[0].get("name").and_then(|v| v.as_str()), Some("Dev"));
}

#[test]
fn search_json_respects_limit() {
    let mut ctx = memory_context();
    for name in ["Doc one", "Doc two", "Doc three"] {
        add_folder(&mut ctx, name);
    }
    let output = ctx
        .execute(&Commands::Search {
            query: "doc".to_string(),
            limit: Some(2),
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));
}

#[test]
fn import_and_export_through_files() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("bookmarks.html");
    fs::write(
        &input,
        r#"<DL><DT><H3>Dev</H3><DL><DT><A HREF="https://x.test">X</A></DL></DL>"#,
    )
    .unwrap();

    let mut ctx = CliContext::new(ShelfConfig::default(), Some(temp.path().join("store"))).unwrap();
    add_folder(&mut ctx, "Replaced");
    let message = ctx
        .execute(&Commands::Import {
            path: input,
            yes: true,
        })
        .unwrap();
    assert!(message.contains("Imported 2 nodes"), "{message}");
    assert!(message.contains("netscape"));

    let output = temp.path().join("export.json");
    let message = ctx
        .execute(&Commands::Export {
            output: Some(output.clone()),
        })
        .unwrap();
    assert!(message.contains("Exported 2 nodes"));

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let records = exported.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .any(|r| r.get("name").and_then(|v| v.as_str()) == Some("Dev")));
    assert!(records
        .iter()
        .all(|r| r.get("name").and_then(|v| v.as_str()) != Some("Replaced")));
}

#[test]
fn empty_import_leaves_store_unchanged() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("empty.json");
    fs::write(&input, "[]").unwrap();

    let mut ctx = memory_context();
    add_folder(&mut ctx, "Keep");
    let message = ctx
        .execute(&Commands::Import {
            path: input,
            yes: true,
        })
        .unwrap();
    assert!(message.contains("store left unchanged"));
    assert_eq!(ctx.api().store().len(), 1);
}

#[test]
fn nav_commands_render_paths() {
    let mut ctx = memory_context();
    let dev = add_folder(&mut ctx, "Dev");
    let shown = ctx
        .execute(&Commands::Nav {
            command: NavCommands::Enter { folder: dev },
        })
        .unwrap();
    assert_eq!(shown, "/Dev");

    let up = ctx
        .execute(&Commands::Nav {
            command: NavCommands::Up { levels: 3 },
        })
        .unwrap();
    assert_eq!(up, "/");
    assert_eq!(ctx.api().current_folder(), ROOT);
}

#[test]
fn open_records_access_and_prints_url() {
    let mut ctx = memory_context();
    ctx.execute(&Commands::Add {
        command: AddCommands::Link {
            url: "https://open.test".to_string(),
            name: Some("Open me".to_string()),
            parent: None,
            fetch_title: false,
        },
    })
    .unwrap();
    let id = ctx.api().children(ROOT)[0].id.clone();
    let url = ctx.execute(&Commands::Open { id: id.clone() }).unwrap();
    assert_eq!(url, "https://open.test");
    assert!(ctx.api().get(&id).unwrap().access_time() > 0);
}

#[test]
fn config_show_renders_toml() {
    let mut ctx = memory_context();
    let output = ctx
        .execute(&Commands::Config {
            command: linkshelf::tooling::cli::ConfigCommands::Show,
        })
        .unwrap();
    let parsed: ShelfConfig = toml::from_str(&output).unwrap();
    assert_eq!(parsed, ShelfConfig::default());
}
