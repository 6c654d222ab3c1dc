use std::fmt;

// === TopicError ===

/// Errors related to topic tree operations.
#[derive(Debug)]
pub enum TopicError {
    /// Topic with the given ID was not found.
    NotFound(String),
    /// The requested name is empty or whitespace-only.
    EmptyName,
    /// The operation is not allowed on the root topic.
    RootProtected,
    /// Reparenting would place a topic inside its own subtree.
    CycleDetected(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for TopicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicError::NotFound(id) => write!(f, "Topic not found: {}", id),
            TopicError::EmptyName => write!(f, "Topic name must not be empty"),
            TopicError::RootProtected => {
                write!(f, "The root topic cannot be deleted or moved")
            }
            TopicError::CycleDetected(id) => {
                write!(f, "Cannot move topic into its own subtree: {}", id)
            }
            TopicError::DatabaseError(msg) => write!(f, "Topic database error: {}", msg),
        }
    }
}

impl std::error::Error for TopicError {}

// === BookmarkError ===

/// Errors related to bookmark operations.
#[derive(Debug)]
pub enum BookmarkError {
    /// Bookmark with the given ID was not found.
    NotFound(String),
    /// The provided URL is empty.
    EmptyUrl,
    /// The target topic was not found.
    TopicNotFound(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::EmptyUrl => write!(f, "Bookmark URL must not be empty"),
            BookmarkError::TopicNotFound(id) => {
                write!(f, "Bookmark topic not found: {}", id)
            }
            BookmarkError::DatabaseError(msg) => {
                write!(f, "Bookmark database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

// === CodecError ===

/// Errors related to bookmark-file decoding.
#[derive(Debug)]
pub enum CodecError {
    /// The input is not recognizable as the expected format.
    UnrecognizedFormat(String),
    /// The input is the right format but malformed beyond recovery.
    Malformed(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::UnrecognizedFormat(msg) => {
                write!(f, "Unrecognized bookmark file format: {}", msg)
            }
            CodecError::Malformed(msg) => write!(f, "Malformed bookmark file: {}", msg),
        }
    }
}

impl std::error::Error for CodecError {}

// === ImportError ===

/// Errors related to applying a decoded bookmark file to the store.
#[derive(Debug)]
pub enum ImportError {
    /// The file could not be decoded.
    Codec(CodecError),
    /// Database operation failed; the whole import was rolled back.
    DatabaseError(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Codec(err) => write!(f, "Import decode failed: {}", err),
            ImportError::DatabaseError(msg) => write!(f, "Import database error: {}", msg),
        }
    }
}

impl std::error::Error for ImportError {}

impl From<CodecError> for ImportError {
    fn from(err: CodecError) -> Self {
        ImportError::Codec(err)
    }
}

// === BackupError ===

/// Errors related to whole-store snapshot and restore.
#[derive(Debug)]
pub enum BackupError {
    /// The uploaded file is not a SQLite database.
    NotASqliteFile,
    /// An I/O error occurred while staging the snapshot.
    IoError(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupError::NotASqliteFile => {
                write!(f, "Uploaded file is not a SQLite database")
            }
            BackupError::IoError(msg) => write!(f, "Backup I/O error: {}", msg),
            BackupError::DatabaseError(msg) => write!(f, "Backup database error: {}", msg),
        }
    }
}

impl std::error::Error for BackupError {}
