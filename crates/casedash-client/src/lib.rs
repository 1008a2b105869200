//! Backend plumbing for the `casedash` dashboard
//!
//! This crate talks to the dashboard backend: an HTTP client for the counts
//! and cases endpoints, a loader that fetches both and applies them as one
//! snapshot, a Socket.IO push channel, and the session that reloads the
//! dashboard whenever the server announces an update.
//!
//! ```no_run
//! use casedash_client::DashboardSession;
//! use casedash_core::Config;
//!
//! # async fn run() -> casedash_core::Result<()> {
//! let config = Config::load(None)?;
//! let session = DashboardSession::mount(&config)?;
//! session.reload().await?;
//! println!("{} cases", session.store().read(|view| view.total()));
//! session.unmount().await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api_client;
pub mod listener;
pub mod loader;
pub mod protocol;
pub mod push;
pub mod session;
pub mod store;

pub use api_client::ApiClient;
pub use listener::{Backoff, LiveUpdateListener, Subscription};
pub use loader::DataLoader;
pub use push::{PushChannel, PushConnection, PushEvent};
pub use session::DashboardSession;
pub use store::{ApplyOutcome, DashboardStore, LoadTicket};
