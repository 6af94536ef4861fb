use cafegram_core::db::migrations::latest_version;
use cafegram_core::db::{open_db, open_db_in_memory, DbError};
use cafegram_core::{CafeRepository, SqliteCafeRepository};
use rusqlite::Connection;

const V1_SCHEMA: &str = include_str!("../src/db/migrations/0001_init.sql");

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "cafes");
    assert_column_exists(&conn, "cafes", "rating");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cafegram.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "cafes");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_rejects_blank_names() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO cafes (id, name) VALUES ('11111111-2222-4333-8444-555555555555', '  ');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn v1_database_upgrades_with_rows_unrated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v1.db");
    let id = "11111111-2222-4333-8444-555555555555";

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(V1_SCHEMA).unwrap();
    conn.execute_batch("PRAGMA user_version = 1;").unwrap();
    conn.execute(
        "INSERT INTO cafes (id, name, location, is_visited) VALUES (?1, 'Cafe Deadend', 'Hong Kong', 1);",
        [id],
    )
    .unwrap();
    drop(conn);

    let mut conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_column_exists(&conn, "cafes", "rating");

    let repo = SqliteCafeRepository::new(&mut conn);
    let records = repo.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.to_string(), id);
    assert_eq!(records[0].location, "Hong Kong");
    assert!(records[0].is_visited);
    assert_eq!(records[0].rating, None);
}

#[test]
fn failed_migration_reports_version_and_keeps_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.db");

    // Claims v1 but has no cafes table, so the rating column cannot be added.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 1;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::Migration { version: 2, .. }));
    assert!(err.to_string().contains("migration 2"));

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 1);
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

fn assert_column_exists(conn: &Connection, table_name: &str, column: &str) {
    let exists: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM pragma_table_info('{table_name}') WHERE name = ?1;"),
            [column],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "column {table_name}.{column} does not exist");
}
