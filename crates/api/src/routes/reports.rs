//! Report Route

use aggregation::ReportPeriod;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use metrics::counter;
use reporting::{file_name, ReportData, ReportFormat, ReportRequest};
use serde::Deserialize;
use tracing::info;

use crate::{ApiResult, SharedState};

/// Report request body; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportBody {
    pub period: String,
    pub format: String,
    pub zone: Option<String>,
}

/// Render a report and return it as an attachment
pub async fn generate_report(
    State(state): State<SharedState>,
    Json(body): Json<ReportBody>,
) -> ApiResult<impl IntoResponse> {
    let request = ReportRequest::new(
        ReportPeriod::parse_or_default(&body.period),
        ReportFormat::parse_or_default(&body.format),
        body.zone.unwrap_or_else(|| "toutes".to_string()),
    );
    let now = Utc::now();
    let since = request.period.since(now);

    let state = state.read().await;
    let readings = state.repository.air_quality_since(since).await?;
    let alert_count = state.repository.count_active_alerts_since(since).await?;
    let forecast = state.forecast.read().await.clone();

    let data = ReportData::assemble(request, &readings, alert_count, &forecast, now);
    let document = state.renderer.render(&data)?;
    let name = file_name(&data, state.renderer.file_extension());
    counter!("reports_generated_total", "format" => data.request.format.as_str()).increment(1);
    info!("Generated report {} ({} bytes)", name, document.len());

    Ok((
        [
            (header::CONTENT_TYPE, state.renderer.content_type().to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", name)),
        ],
        document,
    ))
}
