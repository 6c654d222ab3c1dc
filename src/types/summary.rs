use serde::{Deserialize, Serialize};

/// Counters reported back to the user after a bookmark-file import.
///
/// `bookmarks_skipped` counts entries dropped by the decoder (missing url)
/// plus entries deduplicated against the store or the same batch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub topics_created: usize,
    pub bookmarks_imported: usize,
    pub bookmarks_skipped: usize,
}
