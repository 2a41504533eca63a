//! Entity detail resolver
//!
//! Bookkeeping for the "detail" fetch stream. Selecting an entity shows its
//! summary right away and hands back a [`DetailRequest`] for the caller to
//! dispatch; the response is fed back through [`DetailResolver::resolve`].
//! Only the response to the latest pick may replace the displayed entity,
//! and a failure keeps the summary on screen.

use std::time::Duration;

use crate::debounce::Debouncer;
use crate::error::SearchError;
use crate::model::Entity;
use crate::token::{FetchKind, RequestToken, TokenLedger};

/// A detail fetch to dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub token: RequestToken,
    pub id: String,
}

/// Outcome of feeding a detail response back to the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The enriched entity replaced the summary
    Applied,
    /// The fetch failed; the summary stays displayed
    Failed(SearchError),
    /// A later pick superseded this fetch; nothing changed
    Stale,
}

#[derive(Debug)]
pub struct DetailResolver {
    tokens: TokenLedger,
    debounce: Debouncer<Entity>,
    selected: Option<Entity>,
    loading: bool,
}

impl DetailResolver {
    /// `delay` of zero dispatches on selection; otherwise rapid picks are
    /// coalesced and only the last one is fetched.
    pub fn new(delay: Duration) -> Self {
        Self {
            tokens: TokenLedger::new(),
            debounce: Debouncer::new(delay),
            selected: None,
            loading: false,
        }
    }

    /// Entity currently displayed: the optimistic summary or its enrichment
    pub fn selected(&self) -> Option<&Entity> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// A pick is waiting out the debounce delay
    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Show `summary` and start resolving its detail
    pub fn select(&mut self, summary: Entity) -> Option<DetailRequest> {
        self.selected = Some(summary.clone());
        self.loading = true;

        if self.debounce.delay().is_zero() {
            return Some(self.begin(&summary));
        }

        // Anything already in flight belongs to an earlier pick
        self.tokens.invalidate(FetchKind::Detail);
        self.debounce.trigger(summary);
        None
    }

    /// Wait for a debounced pick to come due and mint its request
    pub async fn fired(&mut self) -> DetailRequest {
        let summary = self.debounce.fired().await;
        self.begin(&summary)
    }

    fn begin(&mut self, summary: &Entity) -> DetailRequest {
        DetailRequest {
            token: self.tokens.mint(FetchKind::Detail),
            id: summary.id.clone(),
        }
    }

    /// Apply a detail response if `token` is still the latest detail fetch
    pub fn resolve(&mut self, token: RequestToken, outcome: Result<Entity, SearchError>) -> Resolution {
        if token.kind() != FetchKind::Detail || !self.tokens.is_current(token) {
            return Resolution::Stale;
        }
        let Some(summary_id) = self.selected.as_ref().map(|s| s.id.clone()) else {
            return Resolution::Stale;
        };
        self.loading = false;

        match outcome {
            Ok(mut enriched) => {
                if enriched.id.is_empty() {
                    enriched.id = summary_id;
                } else if enriched.id != summary_id {
                    return Resolution::Failed(SearchError::server(
                        None,
                        format!(
                            "Detail for '{}' came back with id '{}'",
                            summary_id, enriched.id
                        ),
                    ));
                }
                self.selected = Some(enriched);
                Resolution::Applied
            }
            Err(error) => Resolution::Failed(error),
        }
    }
}
