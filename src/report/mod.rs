// Downloadable reports: the current snapshot re-encoded as JSON, CSV or PDF

mod csv_report;
mod pdf_report;
mod summary;

pub use summary::{SummaryRow, summary_rows};

use crate::error::ReportError;
use crate::models::Snapshot;
use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
    Pdf,
}

impl ReportFormat {
    /// Unknown or missing formats fall back to JSON.
    pub fn parse_lenient(s: Option<&str>) -> Self {
        match s.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("csv") => ReportFormat::Csv,
            Some("pdf") => ReportFormat::Pdf,
            _ => ReportFormat::Json,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Csv => "text/csv",
            ReportFormat::Pdf => "application/pdf",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub format: ReportFormat,
    pub filename: String,
    pub body: Vec<u8>,
}

impl Report {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.filename)
    }
}

/// `sysmon-report-2024-05-01-134501.csv`
pub fn report_filename(format: ReportFormat, generated_at: DateTime<Local>) -> String {
    format!(
        "sysmon-report-{}.{}",
        generated_at.format("%Y-%m-%d-%H%M%S"),
        format.extension()
    )
}

pub fn render(
    snapshot: &Snapshot,
    format: ReportFormat,
    generated_at: DateTime<Local>,
) -> Result<Report, ReportError> {
    let body = match format {
        ReportFormat::Json => serde_json::to_vec_pretty(snapshot)?,
        ReportFormat::Csv => csv_report::render(snapshot)?,
        ReportFormat::Pdf => pdf_report::render(snapshot, generated_at)?,
    };
    Ok(Report {
        format,
        filename: report_filename(format, generated_at),
        body,
    })
}
