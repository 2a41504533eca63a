//! Search session controller
//!
//! Owns the query and everything derived from it. UI intents
//! (`on_query_changed`, `on_submit`, `on_suggestion_selected`) mutate state
//! synchronously and may dispatch fetches; fetch results come back through
//! [`SearchSession::next_event`], which the owner pumps from its event loop.
//!
//! STALENESS:
//! - Every fetch mints a [`RequestToken`] before it starts
//! - A completion is applied only if its token is still the newest of its kind
//! - Suggest, submit and detail are tracked independently
//! - Superseded completions are dropped silently ([`SessionEvent::Discarded`])
//!
//! Fetches run as spawned tasks and are never aborted; the controller itself
//! is only ever touched from the task that owns it, so it needs no locks.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::backend::{HttpSearchBackend, SearchBackend};
use crate::config::SearchConfig;
use crate::debounce::Debouncer;
use crate::detail::{DetailRequest, DetailResolver, Resolution};
use crate::error::SearchError;
use crate::model::{Entity, SearchResponse};
use crate::token::{FetchKind, RequestToken, TokenLedger};

// =============================================================================
// PUBLIC STATE
// =============================================================================

/// Session state as the presentation layer sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Query too short for suggestions, nothing submitted or selected
    Idle,
    Suggesting {
        loading: bool,
        error: Option<String>,
    },
    Submitted {
        loading: bool,
        error: Option<String>,
    },
    /// Summary shown, enriched detail on its way
    DetailLoading {
        selected: Entity,
        error: Option<String>,
    },
    DetailReady {
        selected: Entity,
        error: Option<String>,
    },
}

/// Everything a renderer needs, as one comparable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub query: String,
    /// Capped at the display limit, in server order
    pub suggestions: Vec<Entity>,
    pub suggestions_visible: bool,
    /// Keyboard highlight into `suggestions`
    pub highlighted: Option<usize>,
    pub results: Vec<Entity>,
    pub selected: Option<Entity>,
    pub error: Option<String>,
    pub suggest_loading: bool,
    pub submit_loading: bool,
    pub detail_loading: bool,
}

impl SessionView {
    /// Spinner: any fetch kind is loading
    pub fn is_loading(&self) -> bool {
        self.suggest_loading || self.submit_loading || self.detail_loading
    }
}

/// What one turn of the event pump did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A debounced fetch left the quiet period and was dispatched
    FetchStarted(RequestToken),
    /// A current response was applied to visible state
    Applied(RequestToken),
    /// A current fetch failed; `message` is now the visible error
    Failed { token: RequestToken, message: String },
    /// A superseded response was ignored
    Discarded(RequestToken),
}

// =============================================================================
// INTERNALS
// =============================================================================

/// Which flow last claimed the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Idle,
    Suggesting,
    Submitted,
    Detail,
}

#[derive(Debug)]
enum Completion {
    Search {
        token: RequestToken,
        outcome: Result<SearchResponse, SearchError>,
    },
    Detail {
        token: RequestToken,
        outcome: Result<Entity, SearchError>,
    },
}

enum Wake {
    Suggest(String),
    Detail(DetailRequest),
    Done(Completion),
}

// =============================================================================
// CONTROLLER
// =============================================================================

pub struct SearchSession {
    backend: Arc<dyn SearchBackend>,
    config: SearchConfig,

    query: String,
    flow: Flow,
    suggestions: Vec<Entity>,
    suggestions_visible: bool,
    highlighted: Option<usize>,
    results: Vec<Entity>,
    error: Option<String>,
    suggest_loading: bool,
    submit_loading: bool,

    tokens: TokenLedger,
    suggest_debounce: Debouncer<String>,
    detail: DetailResolver,

    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl SearchSession {
    pub fn new(backend: Arc<dyn SearchBackend>, config: SearchConfig) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            suggest_debounce: Debouncer::new(config.debounce()),
            detail: DetailResolver::new(config.detail_debounce()),
            config,
            query: String::new(),
            flow: Flow::Idle,
            suggestions: Vec::new(),
            suggestions_visible: false,
            highlighted: None,
            results: Vec::new(),
            error: None,
            suggest_loading: false,
            submit_loading: false,
            tokens: TokenLedger::new(),
            completions_tx,
            completions_rx,
            in_flight: 0,
        }
    }

    /// Session backed by the HTTP search endpoint in `config`
    pub fn connect(config: SearchConfig) -> Result<Self, SearchError> {
        let backend = HttpSearchBackend::new(&config)?;
        tracing::info!(base_url = %config.base_url, "search session connected");
        Ok(Self::new(Arc::new(backend), config))
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.suggest_loading || self.submit_loading || self.detail.is_loading()
    }

    /// Fetches dispatched whose completion has not been pumped yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            query: self.query.clone(),
            suggestions: self.suggestions.clone(),
            suggestions_visible: self.suggestions_visible,
            highlighted: self.highlighted,
            results: self.results.clone(),
            selected: self.detail.selected().cloned(),
            error: self.error.clone(),
            suggest_loading: self.suggest_loading,
            submit_loading: self.submit_loading,
            detail_loading: self.detail.is_loading(),
        }
    }

    pub fn state(&self) -> SessionState {
        let error = self.error.clone();
        match (self.flow, self.detail.selected()) {
            (Flow::Idle, _) => SessionState::Idle,
            (Flow::Suggesting, _) => SessionState::Suggesting {
                loading: self.suggest_loading,
                error,
            },
            (Flow::Submitted, _) => SessionState::Submitted {
                loading: self.submit_loading,
                error,
            },
            (Flow::Detail, Some(selected)) if self.detail.is_loading() => {
                SessionState::DetailLoading {
                    selected: selected.clone(),
                    error,
                }
            }
            (Flow::Detail, Some(selected)) => SessionState::DetailReady {
                selected: selected.clone(),
                error,
            },
            (Flow::Detail, None) => SessionState::Idle,
        }
    }

    // -------------------------------------------------------------------------
    // Intents
    // -------------------------------------------------------------------------

    /// Keystroke. Must be called from within a Tokio runtime.
    pub fn on_query_changed(&mut self, text: impl Into<String>) {
        self.query = text.into();
        self.error = None;

        if self.query.chars().count() < self.config.min_query_len {
            self.abandon_suggestions();
            if self.flow == Flow::Suggesting {
                self.flow = Flow::Idle;
            }
            return;
        }

        self.suggest_debounce.trigger(self.query.clone());
        self.flow = Flow::Suggesting;
    }

    /// Full search for the current query, bypassing the debounce.
    ///
    /// Returns `None` (and changes nothing) for an empty or whitespace query.
    pub fn on_submit(&mut self) -> Option<RequestToken> {
        if self.query.trim().is_empty() {
            return None;
        }

        self.error = None;
        self.abandon_suggestions();

        let token = self.tokens.mint(FetchKind::Submit);
        self.submit_loading = true;
        self.flow = Flow::Submitted;
        self.dispatch_search(token, self.query.clone());
        Some(token)
    }

    /// Pick a suggestion: show its summary now, fetch its detail.
    ///
    /// Returns the detail token when the fetch was dispatched immediately.
    pub fn on_suggestion_selected(&mut self, entity: Entity) -> Option<RequestToken> {
        self.query = entity.name.clone();
        self.error = None;
        self.abandon_suggestions();
        self.flow = Flow::Detail;

        tracing::debug!(id = %entity.id, name = %entity.name, "suggestion selected");
        let request = self.detail.select(entity)?;
        let token = request.token;
        self.dispatch_detail(request);
        Some(token)
    }

    pub fn highlighted(&self) -> Option<&Entity> {
        self.highlighted.and_then(|i| self.suggestions.get(i))
    }

    pub fn highlight_next(&mut self) {
        if !self.suggestions_visible || self.suggestions.is_empty() {
            return;
        }
        let last = self.suggestions.len() - 1;
        self.highlighted = Some(match self.highlighted {
            Some(idx) => (idx + 1).min(last),
            None => 0,
        });
    }

    pub fn highlight_prev(&mut self) {
        if let Some(idx) = self.highlighted {
            if idx > 0 {
                self.highlighted = Some(idx - 1);
            }
        }
    }

    /// Select the highlighted suggestion, if the panel is showing one
    pub fn pick_highlighted(&mut self) -> Option<RequestToken> {
        if !self.suggestions_visible {
            return None;
        }
        let entity = self.highlighted()?.clone();
        self.on_suggestion_selected(entity)
    }

    // -------------------------------------------------------------------------
    // Event pump
    // -------------------------------------------------------------------------

    /// Wait for the next debounce deadline or fetch completion and apply it.
    ///
    /// Returns `None` once nothing is pending or in flight.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let suggest_armed = self.suggest_debounce.is_pending();
        let detail_armed = self.detail.is_pending();
        let awaiting = self.in_flight > 0;
        if !suggest_armed && !detail_armed && !awaiting {
            return None;
        }

        let wake = tokio::select! {
            query = self.suggest_debounce.fired(), if suggest_armed => Wake::Suggest(query),
            request = self.detail.fired(), if detail_armed => Wake::Detail(request),
            Some(done) = self.completions_rx.recv(), if awaiting => Wake::Done(done),
            else => return None,
        };

        Some(match wake {
            Wake::Suggest(query) => self.start_suggest(query),
            Wake::Detail(request) => {
                let token = request.token;
                self.dispatch_detail(request);
                SessionEvent::FetchStarted(token)
            }
            Wake::Done(done) => {
                self.in_flight -= 1;
                self.apply(done)
            }
        })
    }

    /// Pump until nothing is pending, returning what happened
    pub async fn settle(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    // -------------------------------------------------------------------------
    // Fetch call-sites
    // -------------------------------------------------------------------------

    fn start_suggest(&mut self, query: String) -> SessionEvent {
        let token = self.tokens.mint(FetchKind::Suggest);

        if query.trim().is_empty() {
            tracing::debug!(%token, "blank query, no suggestion fetch");
            self.show_suggestions(Vec::new());
            return SessionEvent::Applied(token);
        }

        self.suggest_loading = true;
        self.dispatch_search(token, query);
        SessionEvent::FetchStarted(token)
    }

    fn dispatch_search(&mut self, token: RequestToken, query: String) {
        let backend = Arc::clone(&self.backend);
        let tx = self.completions_tx.clone();
        let limit = self.config.fetch_limit;
        self.in_flight += 1;

        tracing::debug!(%token, query = %query, limit, "dispatching search");
        tokio::spawn(async move {
            let outcome = backend.search(&query, limit).await;
            // Receiver gone means the session was dropped; nothing to report to.
            let _ = tx.send(Completion::Search { token, outcome });
        });
    }

    fn dispatch_detail(&mut self, request: DetailRequest) {
        let backend = Arc::clone(&self.backend);
        let tx = self.completions_tx.clone();
        self.in_flight += 1;

        tracing::debug!(token = %request.token, id = %request.id, "dispatching detail fetch");
        tokio::spawn(async move {
            let outcome = backend.get_details(&request.id).await;
            let _ = tx.send(Completion::Detail {
                token: request.token,
                outcome,
            });
        });
    }

    fn apply(&mut self, done: Completion) -> SessionEvent {
        match done {
            Completion::Search { token, outcome } => self.apply_search(token, outcome),
            Completion::Detail { token, outcome } => match self.detail.resolve(token, outcome) {
                Resolution::Applied => {
                    tracing::debug!(%token, "detail applied");
                    self.error = None;
                    SessionEvent::Applied(token)
                }
                Resolution::Failed(error) => self.fail(token, &error),
                Resolution::Stale => {
                    tracing::debug!(%token, "discarding stale detail response");
                    SessionEvent::Discarded(token)
                }
            },
        }
    }

    fn apply_search(
        &mut self,
        token: RequestToken,
        outcome: Result<SearchResponse, SearchError>,
    ) -> SessionEvent {
        if !self.tokens.is_current(token) {
            tracing::debug!(%token, latest = self.tokens.latest(token.kind()), "discarding stale search response");
            return SessionEvent::Discarded(token);
        }

        match (token.kind(), outcome) {
            (FetchKind::Suggest, Ok(response)) => {
                self.error = None;
                tracing::debug!(%token, count = response.suggestions.len(), "suggestions applied");
                self.show_suggestions(response.suggestions);
                SessionEvent::Applied(token)
            }
            (FetchKind::Suggest, Err(error)) => {
                self.show_suggestions(Vec::new());
                self.fail(token, &error)
            }
            (FetchKind::Submit, Ok(response)) => {
                self.submit_loading = false;
                self.error = None;
                tracing::debug!(%token, count = response.results.len(), "results applied");
                self.results = response.results;
                SessionEvent::Applied(token)
            }
            (FetchKind::Submit, Err(error)) => {
                self.submit_loading = false;
                self.results.clear();
                self.fail(token, &error)
            }
            // Detail completions never carry a search payload
            (FetchKind::Detail, _) => SessionEvent::Discarded(token),
        }
    }

    fn fail(&mut self, token: RequestToken, error: &SearchError) -> SessionEvent {
        let message = error.user_message(token.kind()).to_string();
        tracing::warn!(%token, %error, "fetch failed");
        self.error = Some(message.clone());
        SessionEvent::Failed { token, message }
    }

    /// Replace the suggestion list; the current suggest fetch, if any, is done
    fn show_suggestions(&mut self, mut suggestions: Vec<Entity>) {
        self.suggest_loading = false;
        suggestions.truncate(self.config.display_limit);
        self.suggestions_visible = !suggestions.is_empty();
        self.suggestions = suggestions;
        self.highlighted = None;
    }

    /// Drop the suggestion flow: pending debounce, in-flight fetch, panel
    fn abandon_suggestions(&mut self) {
        self.suggest_debounce.cancel();
        self.tokens.invalidate(FetchKind::Suggest);
        self.suggest_loading = false;
        self.suggestions.clear();
        self.suggestions_visible = false;
        self.highlighted = None;
    }
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("query", &self.query)
            .field("flow", &self.flow)
            .field("in_flight", &self.in_flight)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
