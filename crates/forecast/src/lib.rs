//! AQI Forecast
//!
//! Produces a 24-point hourly outlook by perturbing the latest station
//! reading with hour-of-day factors. This is a heuristic, not a trained
//! model; the interface is kept narrow so a real model can replace it.

mod model;
mod summary;

pub use model::{ForecastBase, ForecastLevel, ForecastPoint, Forecaster, HORIZON_HOURS};
pub use summary::{trend, ForecastSummary, Trend};
