//! Report of decks with no unseen cards left.
//!
//! # Responsibility
//! - Walk every deck once per pass with a single reference time.
//! - Surface only the topmost deck of each fully-seen branch.
//!
//! # Invariants
//! - Excluded decks (the default deck unless configured otherwise) are never
//!   reported.
//! - Reported names are sorted lexicographically.

use crate::cache::counter_cache::StaleComputationError;
use crate::clock::{Clock, Timestamp};
use crate::model::deck::{Deck, DeckId, DEFAULT_DECK_ID};
use crate::repo::card_repo::CardRepository;
use crate::repo::deck_repo::{DeckRepository, RepoError};
use crate::service::counter_service::CounterService;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Header line of the rendered report.
pub const REPORT_HEADER: &str = "Decks without unseen cards are: ";

/// Report pass settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Decks skipped by the walk.
    pub excluded_deck_ids: Vec<DeckId>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            excluded_deck_ids: vec![DEFAULT_DECK_ID],
        }
    }
}

impl ReportConfig {
    /// Excludes `deck_ids`, plus the default deck unless `include_default`.
    pub fn excluding(deck_ids: impl IntoIterator<Item = DeckId>, include_default: bool) -> Self {
        let mut excluded_deck_ids = deck_ids
            .into_iter()
            .filter(|id| *id != DEFAULT_DECK_ID)
            .collect::<Vec<_>>();
        if !include_default {
            excluded_deck_ids.insert(0, DEFAULT_DECK_ID);
        }
        Self { excluded_deck_ids }
    }

    pub fn is_excluded(&self, deck_id: DeckId) -> bool {
        self.excluded_deck_ids.contains(&deck_id)
    }
}

/// Result of one report pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyDeckReport {
    pub reference_time: Timestamp,
    pub deck_names: Vec<String>,
}

impl EmptyDeckReport {
    /// Renders the modal message: header followed by one name per line.
    pub fn render(&self) -> String {
        let mut message = REPORT_HEADER.to_string();
        for name in &self.deck_names {
            message.push('\n');
            message.push_str(name);
        }
        message
    }

    pub fn is_empty(&self) -> bool {
        self.deck_names.is_empty()
    }
}

/// Errors from a report pass.
#[derive(Debug)]
pub enum ReportError {
    Counter(StaleComputationError),
    Repo(RepoError),
    /// A deck's parent name did not resolve to a deck.
    ParentNotFound(String),
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Counter(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::ParentNotFound(name) => write!(f, "parent deck not found: `{name}`"),
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Counter(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::ParentNotFound(_) => None,
        }
    }
}

impl From<StaleComputationError> for ReportError {
    fn from(value: StaleComputationError) -> Self {
        Self::Counter(value)
    }
}

impl From<RepoError> for ReportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Report builder over a counter service and a clock.
pub struct ReportService<D: DeckRepository, C: CardRepository, K: Clock> {
    counters: CounterService<D, C>,
    clock: K,
    config: ReportConfig,
}

impl<D: DeckRepository, C: CardRepository, K: Clock> ReportService<D, C, K> {
    pub fn new(decks: D, cards: C, clock: K) -> Self {
        Self::with_config(decks, cards, clock, ReportConfig::default())
    }

    pub fn with_config(decks: D, cards: C, clock: K, config: ReportConfig) -> Self {
        Self {
            counters: CounterService::new(decks, cards),
            clock,
            config,
        }
    }

    /// Builds the sorted list of topmost decks without unseen cards.
    ///
    /// # Errors
    /// - Any counter failure aborts the whole pass.
    /// - `ParentNotFound` when a deck's parent name does not resolve.
    pub fn build_report(&mut self) -> Result<EmptyDeckReport, ReportError> {
        let started_at = Instant::now();
        let reference_time = self.clock.now();
        info!("event=report_build module=report status=start reference_time={reference_time}");

        match self.collect_empty_decks(reference_time) {
            Ok(mut deck_names) => {
                deck_names.sort();
                info!(
                    "event=report_build module=report status=ok duration_ms={} reported={}",
                    started_at.elapsed().as_millis(),
                    deck_names.len()
                );
                Ok(EmptyDeckReport {
                    reference_time,
                    deck_names,
                })
            }
            Err(err) => {
                error!(
                    "event=report_build module=report status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    fn collect_empty_decks(
        &mut self,
        reference_time: Timestamp,
    ) -> Result<Vec<String>, ReportError> {
        let decks = self.counters.decks().list_decks()?;
        let mut reported = Vec::new();
        for deck in decks {
            if self.config.is_excluded(deck.id) {
                continue;
            }
            if self.is_topmost_empty(&deck, reference_time)? {
                reported.push(deck.name);
            }
        }
        Ok(reported)
    }

    fn is_topmost_empty(
        &mut self,
        deck: &Deck,
        reference_time: Timestamp,
    ) -> Result<bool, ReportError> {
        debug!("event=deck_considered module=report deck_id={}", deck.id);
        if !self.counters.has_no_unseen(deck.id, reference_time)? {
            return Ok(false);
        }

        let Some(parent_name) = deck.parent_name() else {
            return Ok(true);
        };
        let parent_id = self
            .counters
            .decks()
            .deck_id_by_name(parent_name)?
            .ok_or_else(|| ReportError::ParentNotFound(parent_name.to_string()))?;

        Ok(!self.counters.has_no_unseen(parent_id, reference_time)?)
    }
}
