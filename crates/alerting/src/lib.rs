//! Alerting System
//!
//! Threshold table, zone population lookup, and tiered severity evaluation
//! of pollutant readings.

mod alert;
mod evaluator;
mod thresholds;

pub use alert::{Alert, AlertStatus, Severity};
pub use evaluator::{classify, AlertEvaluator, CRITICAL_RATIO, MODERATE_RATIO};
pub use thresholds::{ThresholdTable, ZonePopulations, DEFAULT_POPULATION};

use thiserror::Error;

/// Alerting configuration errors
#[derive(Debug, Error)]
pub enum AlertingError {
    #[error("Unknown pollutant in threshold table: {0}")]
    UnknownPollutant(String),
    #[error("Invalid threshold for {pollutant}: {value}")]
    InvalidThreshold { pollutant: String, value: f64 },
    #[error("Unknown alert severity: {0}")]
    UnknownSeverity(String),
    #[error("Unknown alert status: {0}")]
    UnknownStatus(String),
}
