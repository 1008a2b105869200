//! `casedash` terminal dashboard
//!
//! Shows parsed and saved case counts and a filterable case table, reloading
//! whenever the backend pushes a `bot_update` event.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use anyhow::Context;
use casedash_core::Config;
use casedash_tui::report::{self, SnapshotFilters};
use casedash_tui::{Cli, Command, terminal};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Main entry point
///
/// # Errors
///
/// Returns error if configuration, logging or the terminal cannot be set up
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.selected_command();

    let mut config = cli
        .resolve_config()
        .context("failed to load configuration")?;

    // keep log lines off the alternate screen
    if command == Command::Tui && config.logging.file.is_none() {
        config.logging.file = Some(default_log_file());
    }

    let _guard = casedash_core::init_logging(&config.logging)
        .context("failed to initialize logging")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.base_url(),
        "casedash starting"
    );

    match command {
        Command::Tui => terminal::run(&config)
            .await
            .context("terminal dashboard failed"),
        Command::Snapshot {
            search,
            group,
            tpa,
            format,
        } => {
            let filters = SnapshotFilters { search, group, tpa };
            let output = report::snapshot(&config, &filters, format)
                .await
                .context("failed to load dashboard")?;
            print!("{output}");
            Ok(())
        }
        Command::Watch => report::watch(&config).await.context("watch failed"),
        Command::Config { show } => show_config(&config, show),
    }
}

fn show_config(config: &Config, show: bool) -> anyhow::Result<()> {
    if show {
        let rendered = toml::to_string_pretty(config).context("failed to render configuration")?;
        println!("{rendered}");
    }
    println!("Configuration is valid");
    Ok(())
}

fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("casedash.log")
}
