use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use super::{api_headers, AppState};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status (always "ok" while the process serves requests)
    pub status: String,
    /// API version
    pub version: String,
    /// Whether a schedule answer (including "no upcoming race") is cached
    pub cache_populated: bool,
}

/// Health check endpoint.
///
/// Never contacts the schedule feed; an empty cache is not a failure.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (HeaderMap, Json<HealthResponse>) {
    let cache_populated = state.schedule.state().await.is_populated();

    (
        api_headers(),
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cache_populated,
        }),
    )
}
