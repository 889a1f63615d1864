//! Per-deck and subtree card counters.
//!
//! # Responsibility
//! - Answer "how many cards match in this deck / this subtree" through the
//!   memo table, querying the card store only for stale slots.
//! - Record each deck's leaf flag while walking subtrees.
//!
//! # Invariants
//! - Subtree counts cover the deck and every transitive child.
//! - All lookups in one pass share the caller's reference time.

use crate::cache::counter_cache::{CounterCache, CounterMetric, CounterResult, CounterScope};
use crate::clock::{Clock, Timestamp};
use crate::model::card::Count;
use crate::model::deck::DeckId;
use crate::repo::card_repo::{CardFilter, CardRepository};
use crate::repo::deck_repo::DeckRepository;

/// Counter facade over host deck/card stores.
pub struct CounterService<D: DeckRepository, C: CardRepository> {
    decks: D,
    cards: C,
    cache: CounterCache,
}

impl<D: DeckRepository, C: CardRepository> CounterService<D, C> {
    pub fn new(decks: D, cards: C) -> Self {
        Self {
            decks,
            cards,
            cache: CounterCache::new(),
        }
    }

    /// Cards owned directly by `deck_id` that match `filter`.
    pub fn count_in_deck(
        &mut self,
        deck_id: DeckId,
        filter: CardFilter,
        reference_time: Timestamp,
    ) -> CounterResult<Count> {
        count_in_deck(&self.cards, &mut self.cache, deck_id, filter, reference_time)
    }

    /// Cards in `deck_id` and all of its descendants that match `filter`.
    pub fn count_in_subtree(
        &mut self,
        deck_id: DeckId,
        filter: CardFilter,
        reference_time: Timestamp,
    ) -> CounterResult<Count> {
        count_in_subtree(
            &self.decks,
            &self.cards,
            &mut self.cache,
            deck_id,
            filter,
            reference_time,
        )
    }

    pub fn unseen_in_deck(
        &mut self,
        deck_id: DeckId,
        reference_time: Timestamp,
    ) -> CounterResult<Count> {
        self.count_in_deck(deck_id, CardFilter::UNSEEN, reference_time)
    }

    pub fn unseen_in_subtree(
        &mut self,
        deck_id: DeckId,
        reference_time: Timestamp,
    ) -> CounterResult<Count> {
        self.count_in_subtree(deck_id, CardFilter::UNSEEN, reference_time)
    }

    /// Whether neither the deck nor any descendant holds an unseen card.
    pub fn has_no_unseen(
        &mut self,
        deck_id: DeckId,
        reference_time: Timestamp,
    ) -> CounterResult<bool> {
        Ok(self.unseen_in_subtree(deck_id, reference_time)? == 0)
    }

    /// [`Self::has_no_unseen`] evaluated at the clock's current time.
    pub fn has_no_unseen_now(
        &mut self,
        deck_id: DeckId,
        clock: &impl Clock,
    ) -> CounterResult<bool> {
        self.has_no_unseen(deck_id, clock.now())
    }

    /// Leaf flag recorded by the last subtree walk over `deck_id`.
    pub fn is_leaf(&self, deck_id: DeckId) -> Option<bool> {
        self.cache.is_leaf(deck_id)
    }

    pub fn cache(&self) -> &CounterCache {
        &self.cache
    }

    pub fn decks(&self) -> &D {
        &self.decks
    }

    pub fn cards(&self) -> &C {
        &self.cards
    }
}

fn count_in_deck<C: CardRepository>(
    cards: &C,
    cache: &mut CounterCache,
    deck_id: DeckId,
    filter: CardFilter,
    reference_time: Timestamp,
) -> CounterResult<Count> {
    let metric = CounterMetric::new(CounterScope::Deck, filter);
    cache.compute_if_stale(metric, deck_id, reference_time, |_| {
        Ok(cards.count_cards(deck_id, filter)?)
    })
}

fn count_in_subtree<D: DeckRepository, C: CardRepository>(
    decks: &D,
    cards: &C,
    cache: &mut CounterCache,
    deck_id: DeckId,
    filter: CardFilter,
    reference_time: Timestamp,
) -> CounterResult<Count> {
    let metric = CounterMetric::new(CounterScope::Subtree, filter);
    cache.compute_if_stale(metric, deck_id, reference_time, |cache| {
        let children = decks.children(deck_id)?;
        cache.record_leaf(deck_id, children.is_empty());

        let mut total = count_in_deck(cards, cache, deck_id, filter, reference_time)?;
        for (_, child_id) in children {
            total += count_in_subtree(decks, cards, cache, child_id, filter, reference_time)?;
        }
        Ok(Some(total))
    })
}
