//! Error types for the `casedash` dashboard

use thiserror::Error;

/// Main error type for the dashboard
#[derive(Debug, Error)]
pub enum Error {
    /// The backend could not be reached
    #[error("Transport error: {message}")]
    Transport {
        /// Error message
        message: String,
    },

    /// The backend answered with a non-success status
    #[error("API returned {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The backend answered with an unexpected body
    #[error("Malformed payload from {url}: {message}")]
    MalformedPayload {
        /// Requested URL
        url: String,
        /// Decoder message
        message: String,
    },

    /// Push channel connection or protocol failure
    #[error("Push channel error: {message}")]
    PushChannel {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Terminal setup or drawing failure
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new transport error
    #[must_use]
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new push channel error
    #[must_use]
    pub fn push_channel<S: Into<String>>(message: S) -> Self {
        Self::PushChannel {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the error came from talking to the backend API
    #[must_use]
    pub const fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::MalformedPayload { .. }
        )
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;
