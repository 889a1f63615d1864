//! Deck store contract and SQLite implementation.
//!
//! # Responsibility
//! - Expose the host deck lookups the counters need: list, by id, by name,
//!   and immediate children.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Creating a deck creates every missing ancestor first, so a deck's
//!   parent name always resolves.
//! - Child listing is deterministic: ordered by name.

use crate::db::DbError;
use crate::model::card::CardId;
use crate::model::deck::{
    ancestor_names, is_direct_child_name, normalize_deck_name, Deck, DeckId, DeckNameError,
    DECK_NAME_SEPARATOR,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from deck/card store operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    DeckNotFound(DeckId),
    CardNotFound(CardId),
    DuplicateDeckName(String),
    InvalidDeckName(DeckNameError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DeckNotFound(id) => write!(f, "deck not found: {id}"),
            Self::CardNotFound(id) => write!(f, "card not found: {id}"),
            Self::DuplicateDeckName(name) => write!(f, "deck already exists: `{name}`"),
            Self::InvalidDeckName(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted collection data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidDeckName(err) => Some(err),
            Self::DeckNotFound(_)
            | Self::CardNotFound(_)
            | Self::DuplicateDeckName(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<DeckNameError> for RepoError {
    fn from(value: DeckNameError) -> Self {
        Self::InvalidDeckName(value)
    }
}

/// Host deck store.
pub trait DeckRepository {
    /// Creates a deck and any missing ancestors.
    fn create_deck(&self, name: &str) -> RepoResult<Deck>;
    fn get_deck(&self, id: DeckId) -> RepoResult<Option<Deck>>;
    fn deck_id_by_name(&self, name: &str) -> RepoResult<Option<DeckId>>;
    /// Lists every deck, default deck included, ordered by id.
    fn list_decks(&self) -> RepoResult<Vec<Deck>>;
    /// Immediate children of one deck as `(name, id)` pairs.
    fn children(&self, id: DeckId) -> RepoResult<Vec<(String, DeckId)>>;
}

/// SQLite-backed deck store.
pub struct SqliteDeckRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDeckRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DeckRepository for SqliteDeckRepository<'_> {
    fn create_deck(&self, name: &str) -> RepoResult<Deck> {
        let name = normalize_deck_name(name)?;
        if self.deck_id_by_name(&name)?.is_some() {
            return Err(RepoError::DuplicateDeckName(name));
        }

        let tx = self.conn.unchecked_transaction()?;
        for ancestor in ancestor_names(&name) {
            if lookup_id(&tx, ancestor)?.is_none() {
                insert_deck(&tx, ancestor)?;
            }
        }
        let id = insert_deck(&tx, &name)?;
        tx.commit()?;

        Ok(Deck { id, name })
    }

    fn get_deck(&self, id: DeckId) -> RepoResult<Option<Deck>> {
        let deck = self
            .conn
            .query_row(
                "SELECT id, name FROM decks WHERE id = ?1;",
                [id],
                |row| Ok(Deck::new(row.get(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(deck)
    }

    fn deck_id_by_name(&self, name: &str) -> RepoResult<Option<DeckId>> {
        lookup_id(self.conn, name)
    }

    fn list_decks(&self) -> RepoResult<Vec<Deck>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM decks ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut decks = Vec::new();
        while let Some(row) = rows.next()? {
            decks.push(Deck::new(row.get(0)?, row.get::<_, String>(1)?));
        }
        Ok(decks)
    }

    fn children(&self, id: DeckId) -> RepoResult<Vec<(String, DeckId)>> {
        let parent = self.get_deck(id)?.ok_or(RepoError::DeckNotFound(id))?;
        let prefix = format!("{}{DECK_NAME_SEPARATOR}", parent.name);

        let mut stmt = self.conn.prepare(
            "SELECT id, name
             FROM decks
             WHERE substr(name, 1, length(?1)) = ?1
             ORDER BY name ASC;",
        )?;
        let mut rows = stmt.query([prefix.as_str()])?;
        let mut children = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(1)?;
            if is_direct_child_name(&parent.name, &name) {
                children.push((name, row.get(0)?));
            }
        }
        Ok(children)
    }
}

fn lookup_id(conn: &Connection, name: &str) -> RepoResult<Option<DeckId>> {
    let id = conn
        .query_row("SELECT id FROM decks WHERE name = ?1;", [name], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(id)
}

fn insert_deck(conn: &Connection, name: &str) -> RepoResult<DeckId> {
    conn.execute(
        "INSERT INTO decks (id, name)
         VALUES ((SELECT COALESCE(MAX(id), 1) + 1 FROM decks), ?1);",
        params![name],
    )?;
    Ok(conn.last_insert_rowid())
}
