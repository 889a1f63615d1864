//! Collection database bootstrap.
//!
//! A collection is one SQLite file holding the host's `decks` and `cards`
//! tables. Opening one configures the connection, brings the schema up to
//! date and checks that the reserved default deck is present before any
//! repository touches it.

use crate::model::deck::DeckId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Collection bootstrap failures.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The collection was written by a newer schema than this build knows.
    SchemaTooNew {
        collection_version: u32,
        supported_version: u32,
    },
    /// The reserved default deck row is gone.
    MissingDefaultDeck(DeckId),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "collection storage error: {err}"),
            Self::SchemaTooNew {
                collection_version,
                supported_version,
            } => write!(
                f,
                "collection schema v{collection_version} is newer than supported v{supported_version}"
            ),
            Self::MissingDefaultDeck(id) => {
                write!(f, "collection has no default deck (id {id})")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } | Self::MissingDefaultDeck(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
