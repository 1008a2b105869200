//! Core types and derivations for the `casedash` case-processing dashboard
//!
//! Everything in this crate is synchronous and free of I/O apart from
//! configuration loading and logging setup: the case model, the filter
//! engine, option-set derivation, turnaround-time (TAT) derivation and the
//! [`DashboardView`] view model that ties them together.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod filter;
pub mod options;
pub mod tat;
pub mod types;
pub mod utils;
pub mod view;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use filter::{FilterCriteria, filter_cases, summarize};
pub use tat::{format_turnaround, turnaround_seconds};
pub use types::{CaseId, CaseRecord, DashboardCounts, DashboardSnapshot};
pub use view::DashboardView;

use config::{LogFormat, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level. When a log file is
/// configured, output is written through a non-blocking appender and the
/// returned guard must be kept alive for the lifetime of the process.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (writer, guard) = match &config.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().ok_or_else(|| Error::Configuration {
                message: format!("log file path has no file name: {}", path.display()),
            })?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer), Some(guard))
        }
        None => (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stderr),
            None,
        ),
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(config.file.is_none())
                    .with_writer(writer),
            )
            .try_init(),
    };

    result.map_err(|e| Error::Configuration {
        message: format!("failed to initialize logging: {e}"),
    })?;

    Ok(guard)
}
