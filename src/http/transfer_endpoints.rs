//! Import, export, backup and restore endpoints.
//!
//! Uploads are read to completion before the store lock is taken, so a slow
//! client never stalls other requests.
//!
//! # Endpoints
//!
//! - `POST /api/import/html` - Netscape bookmark file upload
//! - `POST /api/import/csv` - CSV upload
//! - `POST /api/import/json` - JSON upload
//! - `GET /api/export.html` - download as a Netscape bookmark file
//! - `GET /api/export.csv` - download as CSV
//! - `GET /api/export.json` - download as JSON
//! - `GET /api/backup` - download a SQLite snapshot of the whole store
//! - `POST /api/restore` - replace the whole store from a snapshot upload

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};

use crate::codecs::{csv, json, netscape, Decoded};
use crate::database::backup;
use crate::http::{AppState, HttpError};
use crate::managers::topic_manager::{TopicManager, TopicManagerTrait};
use crate::services::importer;
use crate::types::errors::CodecError;
use crate::types::summary::ImportSummary;
use crate::types::topic::TopicNode;

/// Reads the first file-bearing part of the upload into memory.
async fn file_bytes(mut multipart: Multipart) -> Result<Vec<u8>, HttpError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::new(e.to_string(), "UPLOAD_ERROR"))?
    {
        if field.file_name().is_some() || field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| HttpError::new(e.to_string(), "UPLOAD_ERROR"))?;
            return Ok(bytes.to_vec());
        }
    }
    Err(HttpError::new(
        "The upload contains no file part",
        "MISSING_FILE",
    ))
}

async fn import_upload(
    state: AppState,
    multipart: Multipart,
    decode: fn(&str) -> Result<Decoded, CodecError>,
) -> Result<Json<ImportSummary>, HttpError> {
    let bytes = file_bytes(multipart).await?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let decoded = decode(&text)?;

    let db = state.db.lock().unwrap();
    let summary = importer::import(db.connection(), &decoded)?;
    tracing::info!(
        imported = summary.bookmarks_imported,
        skipped = summary.bookmarks_skipped,
        topics_created = summary.topics_created,
        "Import applied"
    );
    Ok(Json(summary))
}

async fn import_html(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ImportSummary>, HttpError> {
    import_upload(state, multipart, netscape::decode).await
}

async fn import_csv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ImportSummary>, HttpError> {
    import_upload(state, multipart, csv::decode).await
}

async fn import_json(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ImportSummary>, HttpError> {
    import_upload(state, multipart, json::decode).await
}

fn load_tree(state: &AppState) -> Result<TopicNode, HttpError> {
    let db = state.db.lock().unwrap();
    let topics = TopicManager::new(db.connection());
    Ok(topics.tree()?)
}

/// Wraps a body in download headers.
fn attachment(content_type: &'static str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

async fn export_html(State(state): State<AppState>) -> Result<Response, HttpError> {
    let tree = load_tree(&state)?;
    let body = netscape::encode(&tree);
    Ok(attachment(
        "text/html; charset=utf-8",
        "bookmarks.html",
        body.into_bytes(),
    ))
}

async fn export_csv(State(state): State<AppState>) -> Result<Response, HttpError> {
    let tree = load_tree(&state)?;
    let body = csv::encode(&tree)?;
    Ok(attachment(
        "text/csv; charset=utf-8",
        "bookmarks.csv",
        body.into_bytes(),
    ))
}

async fn export_json(State(state): State<AppState>) -> Result<Response, HttpError> {
    let tree = load_tree(&state)?;
    let body = json::encode(&tree)?;
    Ok(attachment(
        "application/json",
        "bookmarks.json",
        body.into_bytes(),
    ))
}

/// Streams out a consistent snapshot of the live store.
async fn download_backup(State(state): State<AppState>) -> Result<Response, HttpError> {
    let bytes = {
        let db = state.db.lock().unwrap();
        backup::snapshot(&db)?
    };
    Ok(attachment(
        "application/octet-stream",
        "bookmarkd.sqlite3",
        bytes,
    ))
}

/// Replaces the whole store with the uploaded snapshot.
async fn restore(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<StatusCode, HttpError> {
    let bytes = file_bytes(multipart).await?;
    let mut db = state.db.lock().unwrap();
    backup::restore_from(&mut db, &bytes)?;
    tracing::info!(bytes = bytes.len(), "Store restored from uploaded snapshot");
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/import/html", post(import_html))
        .route("/api/import/csv", post(import_csv))
        .route("/api/import/json", post(import_json))
        .route("/api/export.html", get(export_html))
        .route("/api/export.csv", get(export_csv))
        .route("/api/export.json", get(export_json))
        .route("/api/backup", get(download_backup))
        .route("/api/restore", post(restore))
        .with_state(state)
}
