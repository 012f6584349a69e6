//! Report Generation
//!
//! Assembles period statistics, alert totals and the forecast summary into
//! a [`ReportData`] snapshot, and renders it through a [`ReportRenderer`].

mod data;
mod render;

pub use data::{ReportData, ReportFormat, ReportRequest, ReportStats, RECOMMENDATIONS};
pub use render::{file_name, ReportRenderer, TextReportRenderer};

use thiserror::Error;

/// Report errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Render failed: {0}")]
    Render(#[from] std::fmt::Error),
}
