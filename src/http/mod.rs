//! HTTP surface of the bookmark store.
//!
//! One endpoint module per resource group, merged into a single router.
//! Every handler takes the store lock at most once and releases it before
//! any await point; outbound probes never hold it at all.

use std::sync::{Arc, Mutex};

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::database::Database;
use crate::services::link_checker::LinkChecker;
use crate::services::preview::PreviewService;

mod bookmark_endpoints;
mod http_error;
mod probe_endpoints;
mod topic_endpoints;
mod transfer_endpoints;

pub use http_error::HttpError;

/// Application state shared across all endpoints.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub checker: LinkChecker,
    pub preview: PreviewService,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            checker: LinkChecker::new(),
            preview: PreviewService::new(),
        }
    }
}

/// Builds the application router from the per-resource endpoint modules.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(topic_endpoints::routes(state.clone()))
        .merge(bookmark_endpoints::routes(state.clone()))
        .merge(transfer_endpoints::routes(state.clone()))
        .merge(probe_endpoints::routes(state))
        .layer(TraceLayer::new_for_http())
}
