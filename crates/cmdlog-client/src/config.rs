//! Client configuration
//!
//! Defaults point at a local Elasticsearch node and the AOS64 log indices.
//! `CMDLOG_URL`, `CMDLOG_INDEX` and `CMDLOG_TIMEOUT_SECS` override them.

use crate::error::ClientError;

/// Default search endpoint
pub const DEFAULT_URL: &str = "http://localhost:9200";

/// Default index pattern searched
pub const DEFAULT_INDEX_PATTERN: &str = "aos64-*";

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const URL_ENV: &str = "CMDLOG_URL";
pub const INDEX_ENV: &str = "CMDLOG_INDEX";
pub const TIMEOUT_ENV: &str = "CMDLOG_TIMEOUT_SECS";

/// Where and how to send search requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the cluster, e.g. `http://localhost:9200`
    pub base_url: String,
    /// Index pattern appended to the base URL, e.g. `aos64-*`
    pub index_pattern: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            index_pattern: DEFAULT_INDEX_PATTERN.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = lookup(URL_ENV)
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.base_url);
        let index_pattern = lookup(INDEX_ENV)
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.index_pattern);
        let timeout_secs = lookup(TIMEOUT_ENV)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            base_url,
            index_pattern,
            timeout_secs,
        }
    }

    /// `<base-url>/<index-pattern>/_search`
    pub fn search_url(&self) -> String {
        format!(
            "{}/{}/_search",
            self.base_url.trim_end_matches('/'),
            self.index_pattern.trim_matches('/')
        )
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::InvalidConfig(format!(
                "base URL must start with http:// or https://: {}",
                self.base_url
            )));
        }
        if self.index_pattern.trim_matches('/').is_empty() {
            return Err(ClientError::InvalidConfig(
                "index pattern must not be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}
