//! Environmental Telemetry Model
//!
//! Typed reading records for the air-quality station, the weather feed and
//! the IoT sensor network, plus value validation shared by the ingestion
//! adapters.

mod error;
mod metric;
mod reading;
mod validator;

pub use error::ValidationError;
pub use metric::{Metric, Pollutant, PollutantLevels};
pub use reading::{AirQualityReading, Reading, SensorReading, WeatherObservation};
pub use validator::{sanitize, ValidationConfig, Validator};
