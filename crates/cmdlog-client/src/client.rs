//! Search client
//!
//! One request, one reply. A request that gets no reply within the
//! configured timeout fails with [`ClientError::Timeout`] instead of
//! blocking the caller.

use crate::config::ClientConfig;
use crate::error::ClientError;
use cmdlog_core::{QueryRequest, QueryResponse};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, warn};

/// Content type sent with every search body
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Connect timeout, separate from the whole-request timeout
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Sends a search request and returns the decoded response
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn search(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError>;
}

/// HTTP transport backed by reqwest
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    config: ClientConfig,
}

impl SearchClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(
                CONNECT_TIMEOUT_SECS.min(config.timeout_secs),
            ))
            .build()?;

        debug!(
            "Search client ready: url={}, timeout={}s",
            config.search_url(),
            config.timeout_secs
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Map a reqwest failure onto the client error taxonomy
    fn classify(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.config.timeout_secs)
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else {
            ClientError::Http(err)
        }
    }
}

impl Transport for SearchClient {
    async fn search(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        let url = self.config.search_url();
        let body = request.to_json().map_err(ClientError::Encode)?;
        debug!("POST {} body={}", url, body);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        // Backend errors arrive as 4xx/5xx with a JSON body, decode those too
        let status = response.status();
        if !status.is_success() {
            warn!("Search endpoint returned {}", status);
        }

        let text = response.text().await.map_err(|e| self.classify(e))?;

        QueryResponse::from_json(&text).map_err(|source| ClientError::Decode {
            status: status.as_u16(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_config() {
        let config = ClientConfig {
            base_url: "ftp://logs".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            SearchClient::new(config),
            Err(ClientError::InvalidConfig(_))
        ));
    }

    #[test]
    fn new_keeps_config() {
        let client = SearchClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.config().index_pattern, "aos64-*");
    }
}
