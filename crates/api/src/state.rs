//! Shared handler state

use alerting::ZonePopulations;
use forecast::Forecaster;
use ingest::ForecastSlot;
use metrics_exporter_prometheus::PrometheusHandle;
use reporting::{ReportRenderer, TextReportRenderer};
use std::sync::Arc;
use std::time::Instant;
use storage::Repository;
use tokio::sync::RwLock;

pub type SharedState = Arc<RwLock<AppState>>;

/// Application state shared across handlers
pub struct AppState {
    pub repository: Repository,
    pub populations: ZonePopulations,
    /// Used on demand while the collector has not published yet
    pub forecaster: Forecaster,
    pub forecast: ForecastSlot,
    pub renderer: Arc<dyn ReportRenderer>,
    pub version: String,
    pub start_time: Instant,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            populations: ZonePopulations::default(),
            forecaster: Forecaster::new(0),
            forecast: ForecastSlot::default(),
            renderer: Arc::new(TextReportRenderer),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    pub fn with_populations(mut self, populations: ZonePopulations) -> Self {
        self.populations = populations;
        self
    }

    /// Share the collector's forecast slot
    pub fn with_forecast(mut self, forecaster: Forecaster, slot: ForecastSlot) -> Self {
        self.forecaster = forecaster;
        self.forecast = slot;
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }
}
