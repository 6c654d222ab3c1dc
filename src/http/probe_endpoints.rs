//! Outbound probe endpoints and the liveness check.
//!
//! The probes always answer 200; an unreachable target is a result, not an
//! error. Neither touches the store lock.
//!
//! # Endpoints
//!
//! - `GET /api/check?url=` - link health probe, JSON status
//! - `GET /api/preview?url=` - server-side preview rendition, HTML
//! - `GET /api/health` - liveness and version probe

use axum::{
    extract::{Query, State},
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::http::AppState;
use crate::services::link_checker::LinkStatus;

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    url: String,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

async fn check_link(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Json<LinkStatus> {
    Json(state.checker.check(&query.url).await)
}

async fn preview(State(state): State<AppState>, Query(query): Query<UrlQuery>) -> Html<String> {
    Html(state.preview.render(&query.url).await)
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/check", get(check_link))
        .route("/api/preview", get(preview))
        .route("/api/health", get(health))
        .with_state(state)
}
