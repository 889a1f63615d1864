//! Report of flashcard decks that have no unseen cards left.
//!
//! Counters are read from a host deck/card store, memoized per reference
//! time, and aggregated over the deck tree so only the topmost fully-seen
//! deck of each branch is reported.

pub mod cache;
pub mod clock;
pub mod db;
pub mod host;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use cache::counter_cache::{
    CacheSlot, CounterCache, CounterMetric, CounterResult, CounterScope, StaleComputationError,
};
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use host::menu::{
    HostMenu, MenuAction, MenuCommand, MenuError, MenuRegistry, EMPTY_DECKS_ACTION_ID,
    EMPTY_DECKS_ACTION_LABEL,
};
pub use host::{run_empty_decks_action, HostUi};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::card::{Card, CardId, CardQueue, Count};
pub use model::deck::{Deck, DeckId, DeckNameError, DEFAULT_DECK_ID, DEFAULT_DECK_NAME};
pub use repo::card_repo::{CardFilter, CardRepository, SqliteCardRepository};
pub use repo::deck_repo::{DeckRepository, RepoError, RepoResult, SqliteDeckRepository};
pub use service::counter_service::CounterService;
pub use service::report_service::{
    EmptyDeckReport, ReportConfig, ReportError, ReportService, REPORT_HEADER,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
