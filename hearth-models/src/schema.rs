//! Database schema definitions and table creation.
//!
//! Entities are stored as JSON documents keyed by (collection, id), which
//! keeps the SQLite store shape-compatible with a hosted document database.
//! Uploaded images live in a separate blob table.

use rusqlite::Connection;
use hearth_core::error::{HearthError, HearthResult};
use tracing::info;

/// Create all database tables if they do not exist.
pub fn create_tables(conn: &Connection) -> HearthResult<()> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| HearthError::Database(format!("failed to create schema: {e}")))?;
    info!("database schema verified");
    Ok(())
}

/// Drop all tables (used for database reset).
pub fn drop_tables(conn: &Connection) -> HearthResult<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS documents;
         DROP TABLE IF EXISTS blobs;
         DROP TABLE IF EXISTS schema_version;",
    )
    .map_err(|e| HearthError::Database(format!("failed to drop tables: {e}")))?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

-- Entity documents, one row per (collection, id)
CREATE TABLE IF NOT EXISTS documents (
    collection      TEXT NOT NULL,
    id              TEXT NOT NULL,
    body            TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);

-- Uploaded blobs (residence and vehicle images)
CREATE TABLE IF NOT EXISTS blobs (
    key             TEXT PRIMARY KEY,
    bytes           BLOB NOT NULL,
    size            INTEGER NOT NULL,
    created_at      TEXT NOT NULL
);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn test_create_tables_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
        assert!(table_exists(&conn, "documents"));
        assert!(table_exists(&conn, "blobs"));
    }

    #[test]
    fn test_drop_and_recreate() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        drop_tables(&conn).unwrap();
        assert!(!table_exists(&conn, "documents"));
        create_tables(&conn).unwrap();
        assert!(table_exists(&conn, "documents"));
    }
}
