pub mod health;
pub mod next_race;

use axum::http::{header, HeaderMap, HeaderValue};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::services::schedule::ScheduleCache;

/// Shared application state for API endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) schedule: Arc<ScheduleCache>,
    pub(crate) expose_error_details: bool,
}

/// Headers sent with every API JSON response.
pub(crate) fn api_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers
}

/// API routes, without docs or middleware layers.
pub(crate) fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/next-race", get(next_race::get_next_race))
        .route("/api/health", get(health::health_check))
        .with_state(state)
}
