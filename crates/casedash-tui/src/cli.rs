//! Command line interface

use casedash_core::{Config, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command line interface for the casedash dashboard
#[derive(Debug, Parser)]
#[command(
    name = "casedash",
    version = env!("CARGO_PKG_VERSION"),
    about = "Terminal dashboard for bot case processing",
    long_about = "Shows parsed and saved case counts and a filterable case table, reloading whenever the backend announces an update."
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides configuration)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive terminal dashboard (default)
    Tui,

    /// Load once, optionally filter, print and exit
    Snapshot {
        /// Free-text search over patient name, AL number and policy number
        #[arg(short, long)]
        search: Option<String>,

        /// Hospital group
        #[arg(short, long)]
        group: Option<String>,

        /// TPA name
        #[arg(short, long)]
        tpa: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Stay subscribed and print counts after every reload
    Watch,

    /// Validate configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,
    },
}

/// Output format for `snapshot`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    Table,
    /// JSON document
    Json,
}

impl Cli {
    /// Subcommand to run
    #[must_use]
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Tui)
    }

    /// Load configuration and apply command line overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid
    /// after overrides.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }

        config.validate()?;
        Ok(config)
    }
}
