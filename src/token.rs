//! Request tokens
//!
//! Every fetch mints a [`RequestToken`] before the async call starts. When
//! the response comes back it is applied only if its token is still the
//! newest one of its [`FetchKind`]. Completion order is irrelevant; issuance
//! order, recorded by the per-kind counter, is the only ordering that counts.

use std::fmt;

/// The independent fetch streams of a search session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    /// Debounced incremental suggestions
    Suggest,
    /// Explicit full-search submission
    Submit,
    /// Detail lookup for a selected entity
    Detail,
}

impl FetchKind {
    pub const ALL: [FetchKind; 3] = [FetchKind::Suggest, FetchKind::Submit, FetchKind::Detail];

    pub fn as_str(&self) -> &'static str {
        match self {
            FetchKind::Suggest => "suggest",
            FetchKind::Submit => "submit",
            FetchKind::Detail => "detail",
        }
    }
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one issued fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    kind: FetchKind,
    seq: u64,
}

impl RequestToken {
    pub fn kind(&self) -> FetchKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.seq)
    }
}

/// Per-kind monotonic counters
#[derive(Debug, Default, Clone)]
pub struct TokenLedger {
    suggest: u64,
    submit: u64,
    detail: u64,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, kind: FetchKind) -> &mut u64 {
        match kind {
            FetchKind::Suggest => &mut self.suggest,
            FetchKind::Submit => &mut self.submit,
            FetchKind::Detail => &mut self.detail,
        }
    }

    /// Latest sequence number issued (or burned) for `kind`
    pub fn latest(&self, kind: FetchKind) -> u64 {
        match kind {
            FetchKind::Suggest => self.suggest,
            FetchKind::Submit => self.submit,
            FetchKind::Detail => self.detail,
        }
    }

    /// Mint a new token for `kind`, superseding every earlier token of that kind
    pub fn mint(&mut self, kind: FetchKind) -> RequestToken {
        let slot = self.slot(kind);
        *slot += 1;
        RequestToken { kind, seq: *slot }
    }

    /// Supersede all outstanding tokens of `kind` without issuing a new fetch
    pub fn invalidate(&mut self, kind: FetchKind) {
        *self.slot(kind) += 1;
    }

    /// True if `token` is the newest of its kind
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest(token.kind) == token.seq
    }
}
