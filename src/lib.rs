//! artist-search - incremental artist search client
//!
//! As the user types, suggestions are fetched from a remote search endpoint
//! after a quiet period; a submit fetches the full result set at once, and
//! picking a suggestion shows it immediately while its detail loads.
//!
//! The interesting part is the request lifecycle: responses come back in any
//! order, and only the newest request of each kind (suggest, submit, detail)
//! may change what the user sees.
//!
//! # Example
//!
//! ```no_run
//! use artist_search::{SearchConfig, SearchSession};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = SearchSession::connect(SearchConfig::from_env()?)?;
//!
//! session.on_query_changed("Tay");
//! session.settle().await;
//!
//! for entity in &session.view().suggestions {
//!     println!("{} — {}", entity.name, entity.followers_label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod debounce;
pub mod detail;
pub mod error;
pub mod image;
pub mod model;
pub mod session;
pub mod telemetry;
pub mod token;
pub mod view;

pub use backend::{HttpSearchBackend, SearchBackend};
pub use config::SearchConfig;
pub use debounce::Debouncer;
pub use detail::{DetailRequest, DetailResolver, Resolution};
pub use error::{ConfigError, Result, SearchError};
pub use image::{resolve_image_url, BrokenImages, DisplayContext, ImageSlot, Placeholder};
pub use model::{format_count, Entity, ImageRef, SearchResponse};
pub use session::{SearchSession, SessionEvent, SessionState, SessionView};
pub use token::{FetchKind, RequestToken, TokenLedger};
pub use view::{suggestion_rows, result_cards, selected_card, EntityCard, SuggestionRow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
