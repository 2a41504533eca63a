//! HTTP search backend
//!
//! `GET {base}/search?q=..&limit=..` and `GET {base}/artist/{id}`.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::SearchBackend;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::model::{Entity, SearchResponse};

/// Longest slice of an error body kept in a [`SearchError::Server`] message
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
    client: Client,
    search_url: Url,
    config: SearchConfig,
}

impl HttpSearchBackend {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SearchError::network(format!("Failed to create HTTP client: {e}")))?;
        Self::with_client(client, config)
    }

    /// Use a preconfigured reqwest client (proxies, TLS roots, headers)
    pub fn with_client(client: Client, config: &SearchConfig) -> Result<Self> {
        let search_url = config
            .endpoint(&["search"])
            .map_err(|e| SearchError::network(e.to_string()))?;
        Ok(Self {
            client,
            search_url,
            config: config.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    fn detail_url(&self, id: &str) -> Result<Url> {
        self.config
            .endpoint(&["artist", id])
            .map_err(|e| SearchError::network(e.to_string()))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await.map_err(SearchError::from)?;

        if !status.is_success() {
            return Err(SearchError::server(
                Some(status.as_u16()),
                truncate(&body, MAX_ERROR_BODY),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            SearchError::server(Some(status.as_u16()), format!("Malformed payload: {e}"))
        })
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResponse> {
        tracing::debug!(query, limit, "GET {}", self.search_url);

        let limit = limit.to_string();
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(SearchError::from)?;

        Self::read_json(response).await
    }

    async fn get_details(&self, id: &str) -> Result<Entity> {
        let url = self.detail_url(id)?;
        tracing::debug!(id, "GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(SearchError::from)?;

        Self::read_json(response).await
    }
}

fn truncate(body: &str, max: usize) -> String {
    let body = body.trim();
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
