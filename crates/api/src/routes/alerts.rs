//! Alert Routes

use alerting::{Alert, AlertStatus};
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiError, ApiResult, SharedState};

/// Active alerts shown on the dashboard
pub const ACTIVE_ALERT_LIMIT: usize = 50;

/// Response for the alerts endpoint
#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub success: bool,
    pub count: usize,
    pub alerts: Vec<Alert>,
}

/// Active alerts, newest first
pub async fn get_alerts(State(state): State<SharedState>) -> ApiResult<Json<AlertResponse>> {
    let repo = state.read().await.repository.clone();
    let alerts = repo.active_alerts(ACTIVE_ALERT_LIMIT).await?;

    Ok(Json(AlertResponse {
        success: true,
        count: alerts.len(),
        alerts,
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub alert: Alert,
}

/// Operator status transition
pub async fn update_status(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdate>,
) -> ApiResult<Json<StatusResponse>> {
    let status: AlertStatus = body
        .status
        .parse()
        .map_err(|e: alerting::AlertingError| ApiError::BadRequest(e.to_string()))?;

    let repo = state.read().await.repository.clone();
    let alert = repo.set_alert_status(id, status).await?;
    info!("Alert {} marked {}", id, status.as_str());

    Ok(Json(StatusResponse {
        success: true,
        alert,
    }))
}
