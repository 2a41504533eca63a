//! Search backend: the sole boundary between the session controller and
//! the remote search service.
//!
//! The controller only ever talks to `dyn SearchBackend`; the HTTP client
//! is one implementation, tests supply scripted ones.

pub mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Entity, SearchResponse};

pub use http::HttpSearchBackend;

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Ranked suggestions and full results for `query`.
    ///
    /// Missing lists in the payload come back empty, not as an error.
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResponse>;

    /// Enriched detail for one entity by external id
    async fn get_details(&self, id: &str) -> Result<Entity>;
}
