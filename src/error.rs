//! Error types for the artist search client
//!
//! Fetch failures never escape the session controller: they are caught at
//! the fetch boundary and turned into a user-visible message. Stale
//! responses are not errors at all and are reported through
//! [`crate::session::SessionEvent::Discarded`].

use thiserror::Error;

use crate::token::FetchKind;

/// Failure of a call against the search endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Endpoint unreachable, connection reset, timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response or an undecodable payload
    #[error("Server error{}: {message}", status_suffix(.status))]
    Server {
        status: Option<u16>,
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Result type alias for search endpoint calls
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    pub fn network(message: impl Into<String>) -> Self {
        SearchError::Network(message.into())
    }

    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        SearchError::Server {
            status,
            message: message.into(),
        }
    }

    /// Message shown to the user when a fetch of `kind` fails.
    ///
    /// The underlying error only goes to the log.
    pub fn user_message(&self, kind: FetchKind) -> &'static str {
        match kind {
            FetchKind::Suggest | FetchKind::Submit => "Failed to search artists. Please try again.",
            FetchKind::Detail => "Failed to load artist details.",
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return SearchError::server(error.status().map(|s| s.as_u16()), error.to_string());
        }
        if let Some(status) = error.status() {
            return SearchError::server(Some(status.as_u16()), error.to_string());
        }
        SearchError::Network(error.to_string())
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid value for {var}: '{value}'")]
    InvalidEnv { var: String, value: String },

    #[error("Invalid config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}
