//! Smart City API Server
//!
//! REST API for the environmental dashboard: latest readings and history,
//! alerts, statistics, zones, forecasts and downloadable reports.

use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod config;
mod error;
mod logging;
mod rate_limit;
mod routes;
mod state;

pub use config::{
    AppConfig, CollectorConfig, ConfigError, DatabaseConfig, ForecastConfig, LoggingConfig,
    ServerConfig, ZoneEntry, ZonesConfig,
};
pub use error::{ApiError, ApiResult};
pub use logging::init_logging;
pub use rate_limit::{create_governor_config, RateLimitConfig};
pub use state::{AppState, SharedState};

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/dashboard", get(routes::dashboard::get_dashboard))
        .route("/api/alerts", get(routes::alerts::get_alerts))
        .route("/api/alerts/:id/status", post(routes::alerts::update_status))
        .route("/api/sensors/current", get(routes::sensors::get_current))
        .route("/api/statistics", get(routes::statistics::get_statistics))
        .route("/api/predictions", get(routes::predictions::get_predictions))
        .route("/api/zones", get(routes::zones::get_zones))
        .route("/api/report/generate", post(routes::reports::generate_report))
        .route("/metrics", get(routes::health::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the rate-limited router until `shutdown` resolves
pub async fn run_server<F>(
    addr: SocketAddr,
    state: SharedState,
    rate_limit: &RateLimitConfig,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let governor = create_governor_config(rate_limit)?;
    let app = create_router(state).layer(GovernorLayer { config: governor });

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("API server stopped");
    Ok(())
}
