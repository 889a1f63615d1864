use rusqlite::Connection;
use seendeck_core::db::migrations::latest_version;
use seendeck_core::db::{open_db, open_db_in_memory, DbError};
use seendeck_core::{DeckRepository, SqliteDeckRepository, DEFAULT_DECK_ID, DEFAULT_DECK_NAME};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "decks");
    assert_table_exists(&conn, "cards");
}

#[test]
fn fresh_collection_has_only_the_default_deck() {
    let conn = open_db_in_memory().unwrap();
    let decks = SqliteDeckRepository::new(&conn).list_decks().unwrap();

    assert_eq!(decks.len(), 1);
    assert_eq!(decks[0].id, DEFAULT_DECK_ID);
    assert_eq!(decks[0].name, DEFAULT_DECK_NAME);
}

#[test]
fn reopening_file_keeps_data_and_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collection.sqlite3");

    let conn = open_db(&path).unwrap();
    SqliteDeckRepository::new(&conn)
        .create_deck("Lang::Japanese")
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let repo = SqliteDeckRepository::new(&conn);
    assert!(repo.deck_id_by_name("Lang::Japanese").unwrap().is_some());
    assert_eq!(repo.list_decks().unwrap().len(), 3);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew {
            collection_version,
            supported_version,
        } => {
            assert_eq!(collection_version, 999);
            assert_eq!(supported_version, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn opening_collection_without_default_deck_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-default.sqlite3");

    let conn = open_db(&path).unwrap();
    conn.execute("DELETE FROM decks WHERE id = ?1;", [DEFAULT_DECK_ID])
        .unwrap();
    drop(conn);

    assert!(matches!(
        open_db(&path).unwrap_err(),
        DbError::MissingDefaultDeck(DEFAULT_DECK_ID)
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
