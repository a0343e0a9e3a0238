//! Next race HTTP endpoint.
//!
//! GET /api/next-race?refresh=1

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{api_headers, AppState};
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::to_iso_millis;
use crate::models::NormalizedRaceWeekend;

const NO_UPCOMING_RACE: &str = "No upcoming race weekend found for current season.";
const SCHEDULE_FETCH_FAILED: &str = "Failed to fetch F1 schedule data.";

#[derive(Debug, Deserialize, IntoParams)]
pub struct NextRaceQuery {
    /// Set to "1" to bypass the cache and re-fetch the schedule
    pub refresh: Option<String>,
}

impl NextRaceQuery {
    fn force_refresh(&self) -> bool {
        self.refresh.as_deref() == Some("1")
    }
}

/// Successful next race response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextRaceResponse {
    /// When this response was produced (ISO 8601 UTC)
    pub fetched_at_utc: String,
    /// The next race weekend
    pub data: NormalizedRaceWeekend,
}

/// Get the next (or current) race weekend with session start times in UTC.
///
/// Schedule data is cached for 15 minutes; `refresh=1` forces a re-fetch.
#[utoipa::path(
    get,
    path = "/api/next-race",
    tag = "Schedule",
    params(NextRaceQuery),
    responses(
        (status = 200, description = "Next race weekend", body = NextRaceResponse),
        (status = 404, description = "No upcoming race this season", body = ErrorResponse),
        (status = 502, description = "Schedule feed unavailable or malformed", body = ErrorResponse),
    )
)]
pub async fn get_next_race(
    State(state): State<AppState>,
    Query(params): Query<NextRaceQuery>,
) -> Result<(HeaderMap, Json<NextRaceResponse>), AppError> {
    let next = state
        .schedule
        .fetch_next_race(params.force_refresh())
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve next race: {}", e);
            AppError::ExternalServiceError {
                message: SCHEDULE_FETCH_FAILED.to_string(),
                details: state.expose_error_details.then(|| e.to_string()),
            }
        })?
        .ok_or_else(|| AppError::NotFound(NO_UPCOMING_RACE.to_string()))?;

    Ok((
        api_headers(),
        Json(NextRaceResponse {
            fetched_at_utc: to_iso_millis(Utc::now()),
            data: (*next).clone(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::api_router;
    use crate::services::schedule::testing::*;
    use crate::services::schedule::{ScheduleCache, ScheduleSettings};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(fetcher: Arc<ScriptedFetcher>, expose_error_details: bool) -> Router {
        api_router(AppState {
            schedule: Arc::new(ScheduleCache::new(fetcher, ScheduleSettings::default())),
            expose_error_details,
        })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, HeaderMap, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_returns_200_with_race_payload() {
        let app = app(ScriptedFetcher::always(schedule_payload(future_race())), true);

        let (status, headers, body) = get(app, "/api/next-race").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["cache-control"], "no-store");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert!(headers["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json"));
        assert!(body["fetchedAtUtc"].is_string());
        assert_eq!(body["data"]["raceName"], "Future GP");
        assert_eq!(body["data"]["circuitName"], "Future Circuit");
        assert_eq!(body["data"]["sessions"][0]["key"], "FirstPractice");
        assert_eq!(
            body["data"]["sessions"][1]["utcTime"],
            "2099-04-20T12:00:00.000Z"
        );
    }

    #[tokio::test]
    async fn test_returns_404_when_no_upcoming_race() {
        let app = app(ScriptedFetcher::always(schedule_payload(past_race())), true);

        let (status, _, body) = get(app, "/api/next-race").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("No upcoming race weekend"));
    }

    #[tokio::test]
    async fn test_returns_502_with_details_outside_production() {
        let fetcher = ScriptedFetcher::new(vec![Scripted::Respond(json_response(
            503,
            serde_json::json!({}),
        ))]);
        let app = app(fetcher, true);

        let (status, _, body) = get(app, "/api/next-race").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], SCHEDULE_FETCH_FAILED);
        assert!(body["details"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_returns_502_without_details_in_production() {
        let fetcher = ScriptedFetcher::new(vec![Scripted::Fail("dns failure".to_string())]);
        let app = app(fetcher, false);

        let (status, _, body) = get(app, "/api/next-race").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], SCHEDULE_FETCH_FAILED);
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_refresh_flag_forces_refetch() {
        let fetcher = ScriptedFetcher::always(schedule_payload(future_race()));
        let app = app(fetcher.clone(), true);

        get(app.clone(), "/api/next-race").await;
        get(app.clone(), "/api/next-race").await;
        assert_eq!(fetcher.calls(), 1);

        get(app.clone(), "/api/next-race?refresh=1").await;
        assert_eq!(fetcher.calls(), 2);

        // Any other value is a normal cached read.
        get(app, "/api/next-race?refresh=true").await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_health_reports_cache_population() {
        let app = app(ScriptedFetcher::always(schedule_payload(future_race())), true);

        let (status, _, body) = get(app.clone(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cachePopulated"], false);

        get(app.clone(), "/api/next-race").await;
        let (_, _, body) = get(app, "/api/health").await;
        assert_eq!(body["cachePopulated"], true);
    }
}
