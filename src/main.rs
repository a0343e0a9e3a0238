// Next Race API v0.1
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod models;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::jolpica::JolpicaClient;
use services::schedule::{ScheduleCache, ScheduleSettings};

/// Next Race API OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Next Race API",
        version = "0.1.0",
        description = "Answers \"when is the next race weekend?\". Fetches the current \
            F1 season schedule, selects the next race weekend that has not finished yet, \
            and returns its sessions as UTC instants for client-side timezone display. \
            Results are cached for 15 minutes.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Schedule", description = "Next race weekend and its sessions"),
    ),
    paths(
        routes::health::health_check,
        routes::next_race::get_next_race,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::next_race::NextRaceResponse,
            models::NormalizedRaceWeekend,
            models::Session,
            models::SessionKind,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "next_race_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    let client = JolpicaClient::new(&config.schedule_url, &config.schedule_user_agent);
    tracing::info!("Schedule feed: {}", config.schedule_url);

    let state = AppState {
        schedule: Arc::new(ScheduleCache::new(
            Arc::new(client),
            ScheduleSettings::default(),
        )),
        expose_error_details: config.expose_error_details,
    };

    // CORS: read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::api_router(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_endpoints() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/next-race"));
        assert!(doc.paths.paths.contains_key("/api/health"));
    }
}
