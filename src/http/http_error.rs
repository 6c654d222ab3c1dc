//! Uniform JSON error body for the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::types::errors::{BackupError, BookmarkError, CodecError, ImportError, TopicError};

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HttpError {
    /// User-facing error message.
    pub message: String,
    /// Machine-readable error code.
    pub code: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "TOPIC_NOT_FOUND" | "BOOKMARK_NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" | "ROOT_PROTECTED" | "CYCLE_DETECTED" | "UNRECOGNIZED_FORMAT"
            | "MALFORMED_FILE" | "NOT_A_SQLITE_FILE" | "MISSING_FILE" | "UPLOAD_ERROR" => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<TopicError> for HttpError {
    fn from(err: TopicError) -> Self {
        let code = match &err {
            TopicError::NotFound(_) => "TOPIC_NOT_FOUND",
            TopicError::EmptyName => "VALIDATION_ERROR",
            TopicError::RootProtected => "ROOT_PROTECTED",
            TopicError::CycleDetected(_) => "CYCLE_DETECTED",
            TopicError::DatabaseError(_) => "DATABASE_ERROR",
        };
        HttpError::new(err.to_string(), code)
    }
}

impl From<BookmarkError> for HttpError {
    fn from(err: BookmarkError) -> Self {
        let code = match &err {
            BookmarkError::NotFound(_) => "BOOKMARK_NOT_FOUND",
            BookmarkError::EmptyUrl => "VALIDATION_ERROR",
            BookmarkError::TopicNotFound(_) => "TOPIC_NOT_FOUND",
            BookmarkError::DatabaseError(_) => "DATABASE_ERROR",
        };
        HttpError::new(err.to_string(), code)
    }
}

impl From<CodecError> for HttpError {
    fn from(err: CodecError) -> Self {
        let code = match &err {
            CodecError::UnrecognizedFormat(_) => "UNRECOGNIZED_FORMAT",
            CodecError::Malformed(_) => "MALFORMED_FILE",
        };
        HttpError::new(err.to_string(), code)
    }
}

impl From<ImportError> for HttpError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Codec(codec) => HttpError::from(codec),
            ImportError::DatabaseError(_) => HttpError::new(err.to_string(), "DATABASE_ERROR"),
        }
    }
}

impl From<BackupError> for HttpError {
    fn from(err: BackupError) -> Self {
        let code = match &err {
            BackupError::NotASqliteFile => "NOT_A_SQLITE_FILE",
            BackupError::IoError(_) => "IO_ERROR",
            BackupError::DatabaseError(_) => "DATABASE_ERROR",
        };
        HttpError::new(err.to_string(), code)
    }
}
