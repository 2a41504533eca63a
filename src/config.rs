//! Client configuration
//!
//! Loaded from defaults, a YAML file, and `ARTIST_SEARCH_*` environment
//! variables (a `.env` file is honored). The base endpoint URL is always
//! injected here and never hardcoded at call sites.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

const ENV_BASE_URL: &str = "ARTIST_SEARCH_BASE_URL";
const ENV_FETCH_LIMIT: &str = "ARTIST_SEARCH_FETCH_LIMIT";
const ENV_DISPLAY_LIMIT: &str = "ARTIST_SEARCH_DISPLAY_LIMIT";
const ENV_MIN_QUERY_LEN: &str = "ARTIST_SEARCH_MIN_QUERY_LEN";
const ENV_DEBOUNCE_MS: &str = "ARTIST_SEARCH_DEBOUNCE_MS";
const ENV_DETAIL_DEBOUNCE_MS: &str = "ARTIST_SEARCH_DETAIL_DEBOUNCE_MS";
const ENV_REQUEST_TIMEOUT_SECS: &str = "ARTIST_SEARCH_REQUEST_TIMEOUT_SECS";

/// Search client configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base endpoint, e.g. `http://localhost:3000/api`
    pub base_url: Url,
    /// Number of results requested from the server per search
    pub fetch_limit: usize,
    /// Maximum suggestion rows kept for display
    pub display_limit: usize,
    /// Queries shorter than this (in characters) never hit the network
    pub min_query_len: usize,
    /// Quiet period before a suggestion fetch fires
    pub debounce_ms: u64,
    /// Quiet period before a detail fetch fires; 0 dispatches on selection
    pub detail_debounce_ms: u64,
    /// Per-request timeout. Unset means a hung fetch stays loading until superseded.
    pub request_timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            fetch_limit: 20,
            display_limit: 8,
            min_query_len: 2,
            debounce_ms: 300,
            detail_debounce_ms: 0,
            request_timeout_secs: None,
        }
    }
}

fn default_base_url() -> Url {
    // A constant literal; parse cannot fail.
    Url::parse(DEFAULT_BASE_URL).unwrap_or_else(|_| unreachable!("DEFAULT_BASE_URL is valid"))
}

impl SearchConfig {
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn detail_debounce(&self) -> Duration {
        Duration::from_millis(self.detail_debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Parse a YAML document; absent fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: SearchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Defaults overridden by the environment (and `.env`, if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_BASE_URL) {
            self.base_url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidBaseUrl {
                url: raw.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(v) = parse_env(&lookup, ENV_FETCH_LIMIT)? {
            self.fetch_limit = v;
        }
        if let Some(v) = parse_env(&lookup, ENV_DISPLAY_LIMIT)? {
            self.display_limit = v;
        }
        if let Some(v) = parse_env(&lookup, ENV_MIN_QUERY_LEN)? {
            self.min_query_len = v;
        }
        if let Some(v) = parse_env(&lookup, ENV_DEBOUNCE_MS)? {
            self.debounce_ms = v;
        }
        if let Some(v) = parse_env(&lookup, ENV_DETAIL_DEBOUNCE_MS)? {
            self.detail_debounce_ms = v;
        }
        if let Some(v) = parse_env(&lookup, ENV_REQUEST_TIMEOUT_SECS)? {
            self.request_timeout_secs = Some(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry path segments".to_string(),
            });
        }
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: format!("unsupported scheme '{}'", self.base_url.scheme()),
            });
        }
        if self.fetch_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "fetch_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.display_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "display_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.min_query_len == 0 {
            return Err(ConfigError::Invalid {
                field: "min_query_len",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: "must be at least 1 when set".to_string(),
            });
        }
        Ok(())
    }

    /// `base_url` with `segments` appended as percent-encoded path segments
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ConfigError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConfigError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_env<F, T>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value: raw,
            }),
    }
}
