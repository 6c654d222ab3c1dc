//! Bookmark endpoints.
//!
//! # Endpoints
//!
//! - `POST /api/bookmarks` - create a bookmark
//! - `PATCH /api/bookmarks/:id` - edit title, url or notes
//! - `POST /api/bookmarks/:id/move` - move to another topic
//! - `DELETE /api/bookmarks/:id` - delete one bookmark
//! - `POST /api/bookmarks/bulk-delete` - all-or-nothing batch delete
//! - `POST /api/bookmarks/bulk-move` - all-or-nothing batch move
//! - `GET /api/search` - search over title, url and domain
//! - `GET /api/duplicates` - URLs stored more than once

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::http::{AppState, HttpError};
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::topic_manager::{TopicManager, TopicManagerTrait};
use crate::types::bookmark::{Bookmark, DuplicateGroup};

#[derive(Debug, Deserialize)]
pub struct CreateBookmarkBody {
    #[serde(default)]
    title: String,
    url: String,
    topic_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookmarkBody {
    title: Option<String>,
    url: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveBookmarkBody {
    topic_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteBody {
    ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkMoveBody {
    ids: Vec<String>,
    topic_id: String,
}

/// Number of bookmarks a bulk operation touched.
#[derive(Debug, Serialize)]
pub struct BulkOutcome {
    pub affected: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
    topic_id: Option<String>,
    #[serde(default)]
    include_sub: bool,
    domain: Option<String>,
}

/// Creates a bookmark. A missing `topic_id` files it under the root, and an
/// empty title falls back to the url.
async fn create_bookmark(
    State(state): State<AppState>,
    Json(body): Json<CreateBookmarkBody>,
) -> Result<(StatusCode, Json<Bookmark>), HttpError> {
    let db = state.db.lock().unwrap();
    let topic_id = match body.topic_id {
        Some(id) => id,
        None => {
            let mut topics = TopicManager::new(db.connection());
            topics.root()?.id
        }
    };
    let mut bookmarks = BookmarkManager::new(db.connection());
    let id = bookmarks.add(&body.title, &body.url, &topic_id)?;
    let bookmark = bookmarks.get(&id)?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

/// Partial edit; absent fields keep their stored value.
async fn update_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBookmarkBody>,
) -> Result<Json<Bookmark>, HttpError> {
    let db = state.db.lock().unwrap();
    let mut bookmarks = BookmarkManager::new(db.connection());
    bookmarks.update(
        &id,
        body.title.as_deref(),
        body.url.as_deref(),
        body.notes.as_deref(),
    )?;
    Ok(Json(bookmarks.get(&id)?))
}

async fn move_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MoveBookmarkBody>,
) -> Result<Json<Bookmark>, HttpError> {
    let db = state.db.lock().unwrap();
    let mut bookmarks = BookmarkManager::new(db.connection());
    bookmarks.move_to(&id, &body.topic_id)?;
    Ok(Json(bookmarks.get(&id)?))
}

async fn delete_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    let db = state.db.lock().unwrap();
    let mut bookmarks = BookmarkManager::new(db.connection());
    bookmarks.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes every listed bookmark, or none if any id is unknown.
async fn bulk_delete(
    State(state): State<AppState>,
    Json(body): Json<BulkDeleteBody>,
) -> Result<Json<BulkOutcome>, HttpError> {
    let db = state.db.lock().unwrap();
    let mut bookmarks = BookmarkManager::new(db.connection());
    bookmarks.bulk_delete(&body.ids)?;
    Ok(Json(BulkOutcome {
        affected: body.ids.len(),
    }))
}

/// Moves every listed bookmark into the topic, or none if any id is unknown.
async fn bulk_move(
    State(state): State<AppState>,
    Json(body): Json<BulkMoveBody>,
) -> Result<Json<BulkOutcome>, HttpError> {
    let db = state.db.lock().unwrap();
    let mut bookmarks = BookmarkManager::new(db.connection());
    bookmarks.bulk_move(&body.ids, &body.topic_id)?;
    Ok(Json(BulkOutcome {
        affected: body.ids.len(),
    }))
}

/// Case-insensitive substring search, optionally scoped to a topic or its
/// subtree and filtered by url host.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Bookmark>>, HttpError> {
    let db = state.db.lock().unwrap();
    let bookmarks = BookmarkManager::new(db.connection());
    let hits = bookmarks.search(
        &query.q,
        query.topic_id.as_deref(),
        query.include_sub,
        query.domain.as_deref(),
    )?;
    Ok(Json(hits))
}

async fn duplicates(
    State(state): State<AppState>,
) -> Result<Json<Vec<DuplicateGroup>>, HttpError> {
    let db = state.db.lock().unwrap();
    let bookmarks = BookmarkManager::new(db.connection());
    Ok(Json(bookmarks.duplicates()?))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/bookmarks", post(create_bookmark))
        .route("/api/bookmarks/:id", patch(update_bookmark))
        .route("/api/bookmarks/:id", delete(delete_bookmark))
        .route("/api/bookmarks/:id/move", post(move_bookmark))
        .route("/api/bookmarks/bulk-delete", post(bulk_delete))
        .route("/api/bookmarks/bulk-move", post(bulk_move))
        .route("/api/search", get(search))
        .route("/api/duplicates", get(duplicates))
        .with_state(state)
}
