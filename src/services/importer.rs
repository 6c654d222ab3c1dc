//! Applies a decoded bookmark file to the store.
//!
//! The whole import runs in one transaction. Folder path resolution is
//! idempotent, and entries already present in the store, or earlier in the
//! same batch, count as skipped, so re-importing the same file changes
//! nothing.

use rusqlite::Connection;
use std::collections::HashSet;

use crate::codecs::Decoded;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::topic_manager::{TopicManager, TopicManagerTrait};
use crate::types::errors::ImportError;
use crate::types::summary::ImportSummary;

/// Imports a decoded bookmark document into the store.
///
/// # Errors
/// Returns [`ImportError::DatabaseError`] if any statement fails; the
/// transaction is rolled back and the store is unchanged.
pub fn import(conn: &Connection, decoded: &Decoded) -> Result<ImportSummary, ImportError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| ImportError::DatabaseError(e.to_string()))?;

    let mut summary = ImportSummary {
        bookmarks_skipped: decoded.skipped,
        ..ImportSummary::default()
    };

    {
        let mut topics = TopicManager::new(&tx);
        let mut bookmarks = BookmarkManager::new(&tx);
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for path in &decoded.folders {
            let (_, created) = topics
                .ensure_path(path)
                .map_err(|e| ImportError::DatabaseError(e.to_string()))?;
            summary.topics_created += created;
        }

        for entry in &decoded.entries {
            let (topic_id, created) = topics
                .ensure_path(&entry.path)
                .map_err(|e| ImportError::DatabaseError(e.to_string()))?;
            summary.topics_created += created;

            let key = (topic_id.clone(), entry.url.clone());
            if seen.contains(&key)
                || bookmarks
                    .exists_in_topic(&topic_id, &entry.url)
                    .map_err(|e| ImportError::DatabaseError(e.to_string()))?
            {
                summary.bookmarks_skipped += 1;
                continue;
            }
            bookmarks
                .add(&entry.title, &entry.url, &topic_id)
                .map_err(|e| ImportError::DatabaseError(e.to_string()))?;
            seen.insert(key);
            summary.bookmarks_imported += 1;
        }
    }

    tx.commit()
        .map_err(|e| ImportError::DatabaseError(e.to_string()))?;
    Ok(summary)
}
