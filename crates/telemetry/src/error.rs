//! Validation Error Types

use thiserror::Error;

use crate::Metric;

/// Errors raised while validating a measured value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value is NaN or infinite
    #[error("{metric} value is not a finite number")]
    NonFinite { metric: Metric },

    /// Value out of plausible physical range
    #[error("{metric} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        metric: Metric,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Unknown metric or pollutant name
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}
