//! Timestamped memo table keyed by `(deck, metric)`.

use crate::clock::Timestamp;
use crate::model::card::Count;
use crate::model::deck::DeckId;
use crate::repo::card_repo::CardFilter;
use crate::repo::deck_repo::RepoError;
use log::trace;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CounterResult<T> = Result<T, StaleComputationError>;

/// Which decks a counter aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CounterScope {
    /// The deck's own cards only.
    Deck,
    /// The deck and all of its descendants.
    Subtree,
}

/// Named counter: a scope plus a card predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CounterMetric {
    pub scope: CounterScope,
    pub filter: CardFilter,
}

impl CounterMetric {
    pub const UNSEEN_IN_DECK: Self = Self::new(CounterScope::Deck, CardFilter::UNSEEN);
    pub const UNSEEN_IN_SUBTREE: Self = Self::new(CounterScope::Subtree, CardFilter::UNSEEN);

    pub const fn new(scope: CounterScope, filter: CardFilter) -> Self {
        Self { scope, filter }
    }
}

impl Display for CounterMetric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let scope = match self.scope {
            CounterScope::Deck => "deck",
            CounterScope::Subtree => "subtree",
        };
        write!(f, "{scope}:{}", self.filter.label())
    }
}

/// Counter computation failures.
#[derive(Debug)]
pub enum StaleComputationError {
    /// The producer ran but yielded no value.
    MissingValue {
        metric: CounterMetric,
        deck_id: DeckId,
    },
    Repo(RepoError),
}

impl Display for StaleComputationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingValue { metric, deck_id } => {
                write!(f, "counter `{metric}` produced no value for deck {deck_id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StaleComputationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingValue { .. } => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for StaleComputationError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// One memoized value and the reference time it was computed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheSlot {
    pub value: Option<Count>,
    pub as_of: Option<Timestamp>,
}

impl CacheSlot {
    /// Whether the slot can be trusted for a pass started at `reference_time`.
    pub fn is_fresh(&self, reference_time: Timestamp) -> bool {
        self.as_of.is_some_and(|as_of| as_of >= reference_time)
    }
}

/// Side table of counter slots and leaf flags.
#[derive(Debug, Default)]
pub struct CounterCache {
    slots: HashMap<(DeckId, CounterMetric), CacheSlot>,
    leaves: HashMap<DeckId, bool>,
}

impl CounterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized value, recomputing it first when stale.
    ///
    /// `produce` receives the cache so nested counters can memoize too.
    ///
    /// # Errors
    /// - `MissingValue` when `produce` yields `None`.
    /// - Any error `produce` returns; the slot is left untouched.
    pub fn compute_if_stale<F>(
        &mut self,
        metric: CounterMetric,
        deck_id: DeckId,
        reference_time: Timestamp,
        produce: F,
    ) -> CounterResult<Count>
    where
        F: FnOnce(&mut Self) -> CounterResult<Option<Count>>,
    {
        let key = (deck_id, metric);
        if let Some(slot) = self.slots.get(&key) {
            if slot.is_fresh(reference_time) {
                return slot
                    .value
                    .ok_or(StaleComputationError::MissingValue { metric, deck_id });
            }
        }

        trace!(
            "event=counter_recompute module=cache status=start metric={metric} deck_id={deck_id} reference_time={reference_time}"
        );
        let value = produce(self)?.ok_or(StaleComputationError::MissingValue { metric, deck_id })?;
        self.slots.insert(
            key,
            CacheSlot {
                value: Some(value),
                as_of: Some(reference_time),
            },
        );
        Ok(value)
    }

    pub fn slot(&self, deck_id: DeckId, metric: CounterMetric) -> Option<&CacheSlot> {
        self.slots.get(&(deck_id, metric))
    }

    /// Leaf flag recorded by the last subtree traversal of `deck_id`.
    pub fn is_leaf(&self, deck_id: DeckId) -> Option<bool> {
        self.leaves.get(&deck_id).copied()
    }

    pub fn record_leaf(&mut self, deck_id: DeckId, is_leaf: bool) {
        self.leaves.insert(deck_id, is_leaf);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheSlot, CounterCache, CounterMetric, StaleComputationError};

    #[test]
    fn fresh_slot_is_returned_without_recomputing() {
        let mut cache = CounterCache::new();
        let mut calls = 0;

        for _ in 0..2 {
            let value = cache
                .compute_if_stale(CounterMetric::UNSEEN_IN_DECK, 5, 100, |_| {
                    calls += 1;
                    Ok(Some(3))
                })
                .unwrap();
            assert_eq!(value, 3);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn later_reference_time_recomputes() {
        let mut cache = CounterCache::new();
        cache
            .compute_if_stale(CounterMetric::UNSEEN_IN_DECK, 5, 100, |_| Ok(Some(3)))
            .unwrap();
        let value = cache
            .compute_if_stale(CounterMetric::UNSEEN_IN_DECK, 5, 101, |_| Ok(Some(0)))
            .unwrap();

        assert_eq!(value, 0);
        assert_eq!(
            cache.slot(5, CounterMetric::UNSEEN_IN_DECK),
            Some(&CacheSlot {
                value: Some(0),
                as_of: Some(101),
            })
        );
    }

    #[test]
    fn earlier_reference_time_reuses_newer_slot() {
        let mut cache = CounterCache::new();
        cache
            .compute_if_stale(CounterMetric::UNSEEN_IN_DECK, 5, 100, |_| Ok(Some(3)))
            .unwrap();
        let value = cache
            .compute_if_stale(CounterMetric::UNSEEN_IN_DECK, 5, 50, |_| Ok(Some(9)))
            .unwrap();
        assert_eq!(value, 3);
    }

    #[test]
    fn metrics_are_independent_slots() {
        let mut cache = CounterCache::new();
        cache
            .compute_if_stale(CounterMetric::UNSEEN_IN_DECK, 5, 100, |_| Ok(Some(1)))
            .unwrap();
        let subtree = cache
            .compute_if_stale(CounterMetric::UNSEEN_IN_SUBTREE, 5, 100, |_| Ok(Some(4)))
            .unwrap();
        assert_eq!(subtree, 4);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn missing_value_is_an_error_and_leaves_slot_empty() {
        let mut cache = CounterCache::new();
        let err = cache
            .compute_if_stale(CounterMetric::UNSEEN_IN_SUBTREE, 9, 100, |_| Ok(None))
            .unwrap_err();

        assert!(matches!(
            err,
            StaleComputationError::MissingValue { deck_id: 9, .. }
        ));
        assert!(cache.slot(9, CounterMetric::UNSEEN_IN_SUBTREE).is_none());
    }

    #[test]
    fn metric_display_names_scope_and_filter() {
        assert_eq!(CounterMetric::UNSEEN_IN_SUBTREE.to_string(), "subtree:new");
    }
}
