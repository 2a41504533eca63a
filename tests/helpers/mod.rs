//! Scripted search backend for session tests
//!
//! Each call pops the next scripted reply for its key (query or id) and
//! sleeps for the scripted delay before answering, so tests choose the
//! completion order. Unscripted calls answer at once with an empty result.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use artist_search::{Entity, SearchBackend, SearchConfig, SearchError, SearchResponse, SearchSession};

struct Reply<T> {
    delay: Duration,
    outcome: Result<T, SearchError>,
}

#[derive(Default)]
pub struct ScriptedBackend {
    searches: Mutex<HashMap<String, VecDeque<Reply<SearchResponse>>>>,
    details: Mutex<HashMap<String, VecDeque<Reply<Entity>>>>,
    search_calls: Mutex<Vec<(String, usize)>>,
    detail_calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_search(&self, query: &str, delay_ms: u64, outcome: Result<SearchResponse, SearchError>) {
        self.searches
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default()
            .push_back(Reply {
                delay: Duration::from_millis(delay_ms),
                outcome,
            });
    }

    pub fn on_details(&self, id: &str, delay_ms: u64, outcome: Result<Entity, SearchError>) {
        self.details
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default()
            .push_back(Reply {
                delay: Duration::from_millis(delay_ms),
                outcome,
            });
    }

    pub fn search_calls(&self) -> Vec<(String, usize)> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn searched_queries(&self) -> Vec<String> {
        self.search_calls().into_iter().map(|(q, _)| q).collect()
    }

    pub fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResponse, SearchError> {
        self.search_calls
            .lock()
            .unwrap()
            .push((query.to_string(), limit));
        let reply = self
            .searches
            .lock()
            .unwrap()
            .get_mut(query)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(reply) => {
                tokio::time::sleep(reply.delay).await;
                reply.outcome
            }
            None => Ok(SearchResponse::default()),
        }
    }

    async fn get_details(&self, id: &str) -> Result<Entity, SearchError> {
        self.detail_calls.lock().unwrap().push(id.to_string());
        let reply = self
            .details
            .lock()
            .unwrap()
            .get_mut(id)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(reply) => {
                tokio::time::sleep(reply.delay).await;
                reply.outcome
            }
            None => Err(SearchError::server(Some(404), "not scripted")),
        }
    }
}

pub fn session_with(backend: &Arc<ScriptedBackend>, config: SearchConfig) -> SearchSession {
    artist_search::telemetry::init_tracing("artist_search=debug");
    SearchSession::new(backend.clone(), config)
}

pub fn session(backend: &Arc<ScriptedBackend>) -> SearchSession {
    session_with(backend, SearchConfig::default())
}

pub fn suggestions(entities: Vec<Entity>) -> SearchResponse {
    SearchResponse {
        suggestions: entities,
        results: Vec::new(),
    }
}

pub fn results(entities: Vec<Entity>) -> SearchResponse {
    SearchResponse {
        suggestions: Vec::new(),
        results: entities,
    }
}

pub fn taylor() -> Entity {
    Entity::new("1", "Taylor Swift", 100)
}

pub fn enriched(id: &str, name: &str) -> Entity {
    Entity::new(id, name, 100)
        .with_genres(["pop"])
        .with_image_url(format!("https://img/{id}.jpg"))
}
