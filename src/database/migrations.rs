//! Schema migrations for the bookmarkd SQLite database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;
use uuid::Uuid;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Name given to the root topic when a fresh store is seeded.
pub const ROOT_TOPIC_NAME: &str = "My Collections";

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// Migrations are versioned; each runs exactly once and is recorded in
/// the `schema_version` table. Safe to call on every startup.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    // Enable WAL and foreign keys (always, not versioned)
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: topics, bookmarks, root seed")?;
    }

    Ok(())
}

fn record_version(
    conn: &Connection,
    version: i32,
    description: &str,
) -> Result<(), rusqlite::Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// V1: Create the topic tree and bookmark tables, and seed the root topic.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS topics (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            parent_id TEXT,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (parent_id) REFERENCES topics(id)
        );

        CREATE INDEX IF NOT EXISTS idx_topics_parent_id ON topics(parent_id);

        CREATE TABLE IF NOT EXISTS bookmarks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            url TEXT NOT NULL,
            notes TEXT,
            topic_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (topic_id) REFERENCES topics(id)
        );

        CREATE INDEX IF NOT EXISTS idx_bookmarks_topic_id ON bookmarks(topic_id);
        CREATE INDEX IF NOT EXISTS idx_bookmarks_url ON bookmarks(url);
        ",
    )?;

    seed_root(conn)
}

/// Inserts the root topic if no topic with a NULL parent exists yet.
///
/// Also called after a restore, so an uploaded store that somehow lost its
/// root gets one back.
pub fn seed_root(conn: &Connection) -> Result<(), rusqlite::Error> {
    let roots: i64 = conn.query_row(
        "SELECT COUNT(*) FROM topics WHERE parent_id IS NULL",
        [],
        |row| row.get(0),
    )?;
    if roots == 0 {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        conn.execute(
            "INSERT INTO topics (id, name, parent_id, created_at) VALUES (?1, ?2, NULL, ?3)",
            rusqlite::params![Uuid::new_v4().to_string(), ROOT_TOPIC_NAME, now],
        )?;
    }
    Ok(())
}
