//! Health and Metrics Routes

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use storage::RecordCounts;
use tracing::warn;

use crate::SharedState;

/// Response for the health endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
    /// Absent when the database cannot be queried
    pub counts: Option<RecordCounts>,
}

/// Health check handler
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let state = state.read().await;

    let counts = match state.repository.counts().await {
        Ok(c) => Some(c),
        Err(e) => {
            warn!("Health check could not count records: {}", e);
            None
        }
    };

    Json(HealthResponse {
        success: true,
        status: if counts.is_some() { "healthy" } else { "degraded" }.to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp: Utc::now(),
        counts,
    })
}

/// Prometheus exposition
pub async fn metrics(State(state): State<SharedState>) -> String {
    state
        .read()
        .await
        .metrics
        .as_ref()
        .map(|h| h.render())
        .unwrap_or_default()
}
