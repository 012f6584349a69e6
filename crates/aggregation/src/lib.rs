//! Reading Aggregation
//!
//! Pure functions over reading snapshots: the latest reading per source,
//! per-metric statistics over a time window, and the derived AQI estimate.

mod aqi;
mod latest;
mod period;
mod window;

pub use aqi::{estimate_aqi, AqiStatus};
pub use latest::{latest_by, latest_in_zone, latest_per_source};
pub use period::{Period, ReportPeriod};
pub use window::{aggregate, aggregate_by, ColumnStats, WindowStats};
