//! Bookmark-file codecs.
//!
//! All three decoders produce the same [`Decoded`] shape so the importer
//! can apply any format the same way. Folder paths are relative to the
//! root topic; an empty path means the root itself.

pub mod csv;
pub mod json;
pub mod netscape;

/// One bookmark entry pulled out of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Folder path below the root, outermost first.
    pub path: Vec<String>,
    pub title: String,
    pub url: String,
}

/// The format-independent result of decoding a bookmark file.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    /// Every folder path seen, so empty folders import as topics.
    pub folders: Vec<Vec<String>>,
    pub entries: Vec<Entry>,
    /// Entries dropped for a missing or empty url.
    pub skipped: usize,
}
