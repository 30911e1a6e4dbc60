//! Linkshelf CLI Binary

use anyhow::{Context, Result};
use clap::Parser;
use linkshelf::config::ConfigLoader;
use linkshelf::logging::init_logging;
use linkshelf::tooling::cli::{Cli, CliContext};
use std::process;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&cli.logging_config(&config.logging)).context("Failed to initialize logging")?;

    let mut context =
        CliContext::new(config, cli.store.clone()).context("Failed to open bookmark store")?;

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
