use einkauf_core::db::migrations::latest_version;
use einkauf_core::db::{open_db, open_db_in_memory, open_db_with, DbError};
use rusqlite::Connection;
use std::time::Duration;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "item_table");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("einkauf.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO item_table (id, name, amount, price, active) VALUES (1, 'Milk', 2, 150, 1);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db_with(&path, Duration::from_millis(250)).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM item_table;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
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
fn schema_rejects_negative_amount() {
    let conn = open_db_in_memory().unwrap();

    let result = conn.execute(
        "INSERT INTO item_table (id, name, amount, price, active) VALUES (1, 'Milk', -1, 0, 1);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn schema_defaults_match_item_defaults() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO item_table (id) VALUES (4);", [])
        .unwrap();

    let (name, amount, price, active): (Option<String>, i64, i64, i64) = conn
        .query_row(
            "SELECT name, amount, price, active FROM item_table WHERE id = 4;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!((name, amount, price, active), (None, 0, 0, 1));
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
