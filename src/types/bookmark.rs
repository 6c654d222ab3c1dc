use serde::{Deserialize, Serialize};

/// A saved bookmark. Always belongs to exactly one topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub notes: Option<String>,
    pub topic_id: String,
    pub created_at: i64,
}

/// A group of bookmarks sharing the same URL, as reported by the
/// duplicates review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub url: String,
    pub bookmarks: Vec<Bookmark>,
}
