//! Configuration management for the dashboard

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL shared by the API and the push channel
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Push channel configuration
    #[serde(default)]
    pub push: PushConfig,

    /// Reload behaviour
    #[serde(default)]
    pub reload: ReloadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Terminal view configuration
    #[serde(default)]
    pub ui: UiConfig,
}

/// Push channel transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Persistent websocket
    WebSocket,
    /// HTTP long polling
    Polling,
}

impl Transport {
    /// Engine.IO transport name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WebSocket => "websocket",
            Self::Polling => "polling",
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Push channel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushConfig {
    /// Event name that triggers a reload
    #[serde(default = "default_event")]
    pub event: String,

    /// Socket.IO endpoint path
    #[serde(default = "default_push_path")]
    pub path: String,

    /// Transports to try, in order
    #[serde(default = "default_transports")]
    pub transports: Vec<Transport>,

    /// Reconnect after the connection drops
    #[serde(default = "default_reconnect")]
    pub reconnect: bool,

    /// Initial reconnect delay in milliseconds
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Upper bound for the reconnect delay in milliseconds
    #[serde(default = "default_reconnect_delay_max_ms")]
    pub reconnect_delay_max_ms: u64,
}

/// How overlapping reloads are reconciled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Every completed load is applied in completion order
    #[default]
    LastWriterWins,
    /// A load is discarded if a later-issued load was already applied
    LatestRequest,
}

/// Reload behaviour
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadConfig {
    /// Ordering policy for overlapping reloads
    #[serde(default)]
    pub policy: ReloadPolicy,

    /// Re-run the current filters over freshly loaded cases
    #[serde(default)]
    pub reapply_filters: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON lines
    Json,
    /// Human-readable text
    #[default]
    Text,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format
    #[serde(default)]
    pub format: LogFormat,

    /// Log to file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Terminal view configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Redraw interval in milliseconds
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,

    /// Header title
    #[serde(default = "default_title")]
    pub title: String,
}

// Default value functions
fn default_base_url() -> String {
    std::env::var("CASEDASH_BASE_URL")
        .or_else(|_| std::env::var("API_BASE"))
        .unwrap_or_else(|_| "http://localhost:5000".to_string())
}

fn default_event() -> String {
    "bot_update".to_string()
}

fn default_push_path() -> String {
    "/socket.io/".to_string()
}

fn default_transports() -> Vec<Transport> {
    vec![Transport::WebSocket, Transport::Polling]
}

const fn default_reconnect() -> bool {
    true
}

const fn default_reconnect_delay_ms() -> u64 {
    1_000
}

const fn default_reconnect_delay_max_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_tick_rate_ms() -> u64 {
    250
}

fn default_title() -> String {
    "Bot Dashboard".to_string()
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            event: default_event(),
            path: default_push_path(),
            transports: default_transports(),
            reconnect: default_reconnect(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            reconnect_delay_max_ms: default_reconnect_delay_max_ms(),
        }
    }
}

impl PushConfig {
    /// Initial reconnect delay
    #[must_use]
    pub const fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Maximum reconnect delay
    #[must_use]
    pub const fn reconnect_delay_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_max_ms)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            title: default_title(),
        }
    }
}

impl UiConfig {
    /// Redraw interval
    #[must_use]
    pub const fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            push: PushConfig::default(),
            reload: ReloadConfig::default(),
            logging: LoggingConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from an optional file and the environment
    ///
    /// Without an explicit path, `casedash.{toml,json,yaml}` in the working
    /// directory is used when present. Environment variables prefixed with
    /// `CASEDASH_` override file values, with `__` separating nested keys
    /// (`CASEDASH_PUSH__EVENT`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("casedash").required(false),
        };

        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("CASEDASH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or validated.
    pub fn from_toml(text: &str) -> crate::Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid value.
    pub fn validate(&self) -> crate::Result<()> {
        let base = self.base_url.trim();
        let rest = base
            .strip_prefix("http://")
            .or_else(|| base.strip_prefix("https://"))
            .ok_or_else(|| {
                crate::Error::configuration(format!(
                    "base_url must start with http:// or https://, got '{base}'"
                ))
            })?;
        if rest.is_empty() || rest.starts_with('/') {
            return Err(crate::Error::configuration(format!(
                "base_url has no host: '{base}'"
            )));
        }

        if self.push.event.trim().is_empty() {
            return Err(crate::Error::configuration("push.event must not be empty"));
        }
        if !self.push.path.starts_with('/') {
            return Err(crate::Error::configuration(format!(
                "push.path must start with '/', got '{}'",
                self.push.path
            )));
        }
        if self.push.transports.is_empty() {
            return Err(crate::Error::configuration(
                "push.transports must list at least one transport",
            ));
        }
        if self.push.reconnect_delay_ms > self.push.reconnect_delay_max_ms {
            return Err(crate::Error::configuration(format!(
                "push.reconnect_delay_ms ({}) exceeds push.reconnect_delay_max_ms ({})",
                self.push.reconnect_delay_ms, self.push.reconnect_delay_max_ms
            )));
        }
        if self.ui.tick_rate_ms == 0 {
            return Err(crate::Error::configuration("ui.tick_rate_ms must be positive"));
        }

        Ok(())
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}
