//! Report Rendering

use std::fmt::Write;

use crate::{ReportData, ReportError, RECOMMENDATIONS};

/// Turns assembled report data into a downloadable document
pub trait ReportRenderer: Send + Sync {
    /// MIME type of the rendered document
    fn content_type(&self) -> &'static str;
    /// Extension used in the attachment file name
    fn file_extension(&self) -> &'static str;
    fn render(&self, data: &ReportData) -> Result<Vec<u8>, ReportError>;
}

/// Attachment name: `smartcity_report_{format}_{period}_{YYYYmmdd_HHMM}.{ext}`
pub fn file_name(data: &ReportData, extension: &str) -> String {
    format!(
        "smartcity_report_{}_{}_{}.{}",
        data.request.format.as_str(),
        data.request.period.as_str(),
        data.generated_at.format("%Y%m%d_%H%M"),
        extension
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn figure(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.1}{}", v, unit),
        None => "n/a".to_string(),
    }
}

/// Plain-text report, one labelled value per line
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReportRenderer;

impl TextReportRenderer {
    const LABEL_WIDTH: usize = 24;

    fn row(out: &mut String, label: &str, value: &str) -> std::fmt::Result {
        writeln!(out, "  {:<width$}{}", label, value, width = Self::LABEL_WIDTH)
    }
}

impl ReportRenderer for TextReportRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, data: &ReportData) -> Result<Vec<u8>, ReportError> {
        let mut out = String::new();
        let generated = data.generated_at.format("%d/%m/%Y %H:%M").to_string();
        let ug = " µg/m³";

        writeln!(out, "SMART CITY AIR QUALITY REPORT")?;
        writeln!(out, "=============================")?;
        writeln!(out, "Period:       {}", capitalize(data.request.period.as_str()))?;
        writeln!(out, "Zone:         {}", capitalize(&data.request.zone))?;
        writeln!(out, "Format:       {}", capitalize(data.request.format.as_str()))?;
        writeln!(out, "Generated at: {}", generated)?;
        writeln!(out)?;

        let s = &data.stats;
        writeln!(out, "Air quality statistics")?;
        writeln!(out, "----------------------")?;
        Self::row(&mut out, "Average AQI:", &figure(s.avg_aqi, ""))?;
        Self::row(&mut out, "Maximum AQI:", &figure(s.max_aqi, ""))?;
        Self::row(&mut out, "Minimum AQI:", &figure(s.min_aqi, ""))?;
        Self::row(&mut out, "Average PM2.5:", &figure(s.avg_pm25, ug))?;
        Self::row(&mut out, "Average PM10:", &figure(s.avg_pm10, ug))?;
        Self::row(&mut out, "Average NO2:", &figure(s.avg_no2, ug))?;
        Self::row(&mut out, "Average O3:", &figure(s.avg_o3, ug))?;
        Self::row(&mut out, "Measurements:", &s.count.to_string())?;
        writeln!(out)?;

        writeln!(out, "Alerts")?;
        writeln!(out, "------")?;
        Self::row(&mut out, "Active alerts:", &data.alert_count.to_string())?;
        writeln!(out)?;

        if let Some(f) = &data.forecast {
            writeln!(out, "24h forecast")?;
            writeln!(out, "------------")?;
            Self::row(&mut out, "Forecast points:", &f.count.to_string())?;
            Self::row(&mut out, "Average AQI:", &format!("{:.1}", f.avg_aqi))?;
            Self::row(&mut out, "Maximum AQI:", &f.max_aqi.to_string())?;
            Self::row(&mut out, "Minimum AQI:", &f.min_aqi.to_string())?;
            Self::row(&mut out, "Trend:", f.trend.as_str())?;
            writeln!(out)?;
        }

        writeln!(out, "Recommendations")?;
        writeln!(out, "---------------")?;
        for rec in RECOMMENDATIONS {
            writeln!(out, "  - {}", rec)?;
        }
        writeln!(out)?;

        write!(
            out,
            "Smart City Platform - {} report - {}",
            data.request.format.as_str(),
            generated
        )?;
        writeln!(out)?;

        Ok(out.into_bytes())
    }
}
