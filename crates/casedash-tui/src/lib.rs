//! Terminal front end for the `casedash` dashboard
//!
//! The interactive view is built on ratatui; the headless `snapshot` and
//! `watch` commands share the same store and formatting helpers.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod app;
pub mod cli;
pub mod report;
pub mod terminal;
pub mod ui;

pub use app::{App, AppAction, Focus};
pub use cli::{Cli, Command, OutputFormat};
