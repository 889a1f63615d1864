//! Card store contract and SQLite implementation.
//!
//! # Invariants
//! - Counting matches cards by current deck or original deck, never by
//!   descendant decks.
//! - Read paths reject unknown queue values instead of masking them.

use crate::model::card::{Card, CardId, CardQueue, Count};
use crate::model::deck::DeckId;
use crate::repo::deck_repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const CARD_COUNT_SQL: &str = "SELECT COUNT(*) FROM cards WHERE (did = ?1 OR odid = ?1)";

/// Card predicate applied on top of the deck match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardFilter {
    Any,
    Queue(CardQueue),
}

impl CardFilter {
    /// Cards never presented to the user.
    pub const UNSEEN: Self = Self::Queue(CardQueue::New);

    /// Short label used in cache keys and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Queue(queue) => queue.as_str(),
        }
    }
}

/// Host card store.
pub trait CardRepository {
    /// Adds one card; `original_deck_id` marks a card borrowed by a filtered deck.
    fn add_card(
        &self,
        deck_id: DeckId,
        original_deck_id: Option<DeckId>,
        queue: CardQueue,
    ) -> RepoResult<Card>;
    fn get_card(&self, id: CardId) -> RepoResult<Option<Card>>;
    fn set_queue(&self, id: CardId, queue: CardQueue) -> RepoResult<()>;
    /// Counts cards owned by `deck_id` matching `filter`.
    ///
    /// `None` means the store produced no scalar at all.
    fn count_cards(&self, deck_id: DeckId, filter: CardFilter) -> RepoResult<Option<Count>>;
}

/// SQLite-backed card store.
pub struct SqliteCardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCardRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CardRepository for SqliteCardRepository<'_> {
    fn add_card(
        &self,
        deck_id: DeckId,
        original_deck_id: Option<DeckId>,
        queue: CardQueue,
    ) -> RepoResult<Card> {
        for id in std::iter::once(deck_id).chain(original_deck_id) {
            if !deck_exists(self.conn, id)? {
                return Err(RepoError::DeckNotFound(id));
            }
        }

        self.conn.execute(
            "INSERT INTO cards (did, odid, queue) VALUES (?1, ?2, ?3);",
            params![deck_id, original_deck_id.unwrap_or(0), queue.to_db()],
        )?;

        Ok(Card {
            id: self.conn.last_insert_rowid(),
            deck_id,
            original_deck_id,
            queue,
        })
    }

    fn get_card(&self, id: CardId) -> RepoResult<Option<Card>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, did, odid, queue FROM cards WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_card_row(row)?)),
            None => Ok(None),
        }
    }

    fn set_queue(&self, id: CardId, queue: CardQueue) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE cards SET queue = ?1 WHERE id = ?2;",
            params![queue.to_db(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::CardNotFound(id));
        }
        Ok(())
    }

    fn count_cards(&self, deck_id: DeckId, filter: CardFilter) -> RepoResult<Option<Count>> {
        let mut sql = CARD_COUNT_SQL.to_string();
        let mut bind_values = vec![Value::Integer(deck_id)];
        if let CardFilter::Queue(queue) = filter {
            sql.push_str(" AND queue = ?2");
            bind_values.push(Value::Integer(queue.to_db()));
        }

        let count = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| {
                row.get::<_, Option<i64>>(0)
            })
            .optional()?
            .flatten();

        count
            .map(|value| {
                Count::try_from(value).map_err(|_| {
                    RepoError::InvalidData(format!(
                        "negative card count `{value}` for deck {deck_id}"
                    ))
                })
            })
            .transpose()
    }
}

fn deck_exists(conn: &Connection, id: DeckId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM decks WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_card_row(row: &Row<'_>) -> RepoResult<Card> {
    let queue_value: i64 = row.get("queue")?;
    let queue = CardQueue::from_db(queue_value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid queue value `{queue_value}` in cards.queue"))
    })?;
    let original_deck_id = match row.get::<_, i64>("odid")? {
        0 => None,
        id => Some(id),
    };

    Ok(Card {
        id: row.get("id")?,
        deck_id: row.get("did")?,
        original_deck_id,
        queue,
    })
}
