//! Collection schema versions.
//!
//! # Invariants
//! - Schema steps are listed in strictly increasing version order and the
//!   applied version is mirrored to `PRAGMA user_version`.
//! - Version 1 seeds the reserved default deck (`id = 1`, `Default`); every
//!   opened collection must still contain it.
//! - A collection newer than [`latest_version`] is never modified.

use crate::db::{DbError, DbResult};
use crate::model::deck::DEFAULT_DECK_ID;
use rusqlite::Connection;

/// `(version, sql)` schema steps.
const SCHEMA_STEPS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Returns the newest schema version this build can open.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings the collection schema up to date, then checks collection invariants.
///
/// All pending steps run in one transaction.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let collection_version =
        conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let supported_version = latest_version();
    if collection_version > supported_version {
        return Err(DbError::SchemaTooNew {
            collection_version,
            supported_version,
        });
    }

    if collection_version < supported_version {
        let tx = conn.transaction()?;
        for (version, sql) in pending_steps(collection_version) {
            tx.execute_batch(sql)?;
            tx.pragma_update(None, "user_version", version)?;
        }
        tx.commit()?;
    }

    ensure_default_deck(conn)
}

fn pending_steps(applied: u32) -> impl Iterator<Item = (u32, &'static str)> {
    SCHEMA_STEPS
        .iter()
        .copied()
        .filter(move |(version, _)| *version > applied)
}

fn ensure_default_deck(conn: &Connection) -> DbResult<()> {
    let present: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM decks WHERE id = ?1);",
        [DEFAULT_DECK_ID],
        |row| row.get(0),
    )?;
    if !present {
        return Err(DbError::MissingDefaultDeck(DEFAULT_DECK_ID));
    }
    Ok(())
}
