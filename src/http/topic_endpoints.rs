//! Topic tree endpoints.
//!
//! # Endpoints
//!
//! - `GET /api/tree` - full topic/bookmark tree
//! - `POST /api/topics` - create a topic
//! - `PATCH /api/topics/:id` - rename a topic
//! - `POST /api/topics/:id/move` - reparent a topic
//! - `DELETE /api/topics/:id` - cascade-delete a topic and its bookmarks
//! - `GET /api/topics/:id/bookmarks` - list bookmarks in a topic

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use serde::Deserialize;

use crate::http::{AppState, HttpError};
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::topic_manager::{TopicManager, TopicManagerTrait};
use crate::types::bookmark::Bookmark;
use crate::types::topic::{Topic, TopicNode};

#[derive(Debug, Deserialize)]
pub struct CreateTopicBody {
    name: String,
    parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameTopicBody {
    name: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveTopicBody {
    parent_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListBookmarksQuery {
    #[serde(default)]
    include_sub: bool,
}

/// Returns the whole topic tree with bookmarks attached to each node.
async fn get_tree(State(state): State<AppState>) -> Result<Json<TopicNode>, HttpError> {
    let db = state.db.lock().unwrap();
    let topics = TopicManager::new(db.connection());
    Ok(Json(topics.tree()?))
}

/// Creates a topic. A missing `parent_id` places it under the root.
async fn create_topic(
    State(state): State<AppState>,
    Json(body): Json<CreateTopicBody>,
) -> Result<(StatusCode, Json<Topic>), HttpError> {
    let db = state.db.lock().unwrap();
    let mut topics = TopicManager::new(db.connection());
    let parent_id = match body.parent_id {
        Some(id) => id,
        None => topics.root()?.id,
    };
    let id = topics.create(&body.name, &parent_id)?;
    let topic = topics.get(&id)?;
    Ok((StatusCode::CREATED, Json(topic)))
}

async fn rename_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RenameTopicBody>,
) -> Result<Json<Topic>, HttpError> {
    let db = state.db.lock().unwrap();
    let mut topics = TopicManager::new(db.connection());
    topics.rename(&id, &body.name)?;
    Ok(Json(topics.get(&id)?))
}

async fn move_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MoveTopicBody>,
) -> Result<Json<Topic>, HttpError> {
    let db = state.db.lock().unwrap();
    let mut topics = TopicManager::new(db.connection());
    topics.reparent(&id, &body.parent_id)?;
    Ok(Json(topics.get(&id)?))
}

async fn delete_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    let db = state.db.lock().unwrap();
    let mut topics = TopicManager::new(db.connection());
    topics.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists the bookmarks of one topic, optionally including its subtree.
async fn list_bookmarks(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ListBookmarksQuery>,
) -> Result<Json<Vec<Bookmark>>, HttpError> {
    let db = state.db.lock().unwrap();
    let bookmarks = BookmarkManager::new(db.connection());
    Ok(Json(bookmarks.list(&id, query.include_sub)?))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/tree", get(get_tree))
        .route("/api/topics", post(create_topic))
        .route("/api/topics/:id", patch(rename_topic))
        .route("/api/topics/:id", delete(delete_topic))
        .route("/api/topics/:id/move", post(move_topic))
        .route("/api/topics/:id/bookmarks", get(list_bookmarks))
        .with_state(state)
}
