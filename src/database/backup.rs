//! Whole-store snapshot and restore via the SQLite online backup API.
//!
//! `snapshot` serializes the live store into SQLite file bytes suitable for
//! download; `restore_from` replaces the live store's contents with an
//! uploaded snapshot, then re-runs migrations so the restored store is
//! always usable.

use rusqlite::backup::Backup;
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use super::connection::Database;
use super::migrations;
use crate::types::errors::BackupError;

/// First 16 bytes of every SQLite database file.
const SQLITE_MAGIC: &[u8] = b"SQLite format 3\0";

fn staging_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bookmarkd-{}-{}.db", label, Uuid::new_v4()))
}

/// Copies the whole live store into a SQLite file and returns its bytes.
///
/// Uses the online backup API so a consistent snapshot is produced even in
/// WAL mode with the store open.
///
/// # Errors
/// Returns [`BackupError`] if the backup or the staging file I/O fails.
pub fn snapshot(db: &Database) -> Result<Vec<u8>, BackupError> {
    let path = staging_path("snapshot");

    let result = (|| {
        let mut dst = Connection::open(&path)
            .map_err(|e| BackupError::DatabaseError(e.to_string()))?;
        let backup = Backup::new(db.connection(), &mut dst)
            .map_err(|e| BackupError::DatabaseError(e.to_string()))?;
        backup
            .run_to_completion(100, Duration::ZERO, None)
            .map_err(|e| BackupError::DatabaseError(e.to_string()))?;
        drop(backup);
        drop(dst);
        std::fs::read(&path).map_err(|e| BackupError::IoError(e.to_string()))
    })();

    let _ = std::fs::remove_file(&path);
    result
}

/// Replaces the live store's contents with the uploaded snapshot bytes.
///
/// The bytes must start with the SQLite file header. After the copy,
/// migrations are re-run against the live connection so a snapshot taken by
/// an older version is upgraded and a missing root topic is re-seeded.
///
/// # Errors
/// Returns [`BackupError::NotASqliteFile`] if the header check fails, or a
/// database/I/O variant if the copy fails. On error the live store is
/// untouched.
pub fn restore_from(db: &mut Database, bytes: &[u8]) -> Result<(), BackupError> {
    if bytes.len() < SQLITE_MAGIC.len() || &bytes[..SQLITE_MAGIC.len()] != SQLITE_MAGIC {
        return Err(BackupError::NotASqliteFile);
    }

    let path = staging_path("restore");
    std::fs::write(&path, bytes).map_err(|e| BackupError::IoError(e.to_string()))?;

    let result = (|| {
        let src = Connection::open(&path)
            .map_err(|e| BackupError::DatabaseError(e.to_string()))?;
        // Reject files that carry the magic but are not usable databases
        src.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|_| BackupError::NotASqliteFile)?;

        let backup = Backup::new(&src, db.connection_mut())
            .map_err(|e| BackupError::DatabaseError(e.to_string()))?;
        backup
            .run_to_completion(100, Duration::ZERO, None)
            .map_err(|e| BackupError::DatabaseError(e.to_string()))?;
        drop(backup);

        migrations::run_all(db.connection())
            .map_err(|e| BackupError::DatabaseError(e.to_string()))?;
        migrations::seed_root(db.connection())
            .map_err(|e| BackupError::DatabaseError(e.to_string()))
    })();

    let _ = std::fs::remove_file(&path);
    result
}
