// Report generation from batch results

use crate::table::escape_csv_field;
use chrono::{DateTime, Local, Utc};
use linkvet_scanner::{BatchResult, Outcome, ProbeStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output table columns, in order.
pub const CSV_HEADER: [&str; 5] = [
    "Original_request",
    "Final_request",
    "Status_Code",
    "Error_Message",
    "Response_Time_Ms",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}

pub fn generate_report(results: &BatchResult, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(results)),
        ReportFormat::Json => generate_json_report(results),
        ReportFormat::Csv => Ok(generate_csv_report(results)),
    }
}

pub fn generate_text_report(results: &BatchResult) -> String {
    let summary = results.summary();
    let mut report = String::new();

    report.push_str("═══════════════════════════════════════════════════════════════════════════════\n");
    report.push_str("                          ADDRESS VALIDATION RESULTS\n");
    report.push_str("═══════════════════════════════════════════════════════════════════════════════\n\n");

    report.push_str(&format!("Addresses checked:  {}\n", summary.total));
    report.push_str(&format!("Responded:          {}\n", summary.succeeded));
    if summary.timed_out > 0 {
        report.push_str(&format!("Timed out:          {}\n", summary.timed_out));
    }
    if summary.connection_failed > 0 {
        report.push_str(&format!("Connection errors:  {}\n", summary.connection_failed));
    }
    if summary.request_failed > 0 {
        report.push_str(&format!("Request errors:     {}\n", summary.request_failed));
    }
    if summary.execution_failed > 0 {
        report.push_str(&format!("Execution errors:   {}\n", summary.execution_failed));
    }
    report.push('\n');

    // Status codes first in numeric order, then failure kinds
    let mut by_status: BTreeMap<StatusKey, Vec<&Outcome>> = BTreeMap::new();
    for outcome in results {
        by_status.entry(StatusKey::from(outcome.status)).or_default().push(outcome);
    }

    for (key, outcomes) in &by_status {
        report.push_str(&format!("{} ({} addresses)\n", key.heading(), outcomes.len()));
        report.push_str("───────────────────────────────────────────────────────────────────────────────\n");

        for outcome in outcomes {
            if outcome.status.is_success() {
                if outcome.resolved == outcome.original {
                    report.push_str(&format!("  {}\n", outcome.original));
                } else {
                    report.push_str(&format!("  {} -> {}\n", outcome.original, outcome.resolved));
                }
            } else {
                report.push_str(&format!("  {}  ({})\n", outcome.original, outcome.error));
            }
        }
        report.push('\n');
    }

    report.push_str("═══════════════════════════════════════════════════════════════════════════════\n");
    report.push_str("                                End of Report\n");
    report.push_str("═══════════════════════════════════════════════════════════════════════════════\n");

    report
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum StatusKey {
    Code(u16),
    Timeout,
    Connection,
    Request,
    Execution,
}

impl From<ProbeStatus> for StatusKey {
    fn from(status: ProbeStatus) -> Self {
        match status {
            ProbeStatus::Success(code) => StatusKey::Code(code),
            ProbeStatus::Timeout => StatusKey::Timeout,
            ProbeStatus::ConnectionFailure => StatusKey::Connection,
            ProbeStatus::RequestFailure => StatusKey::Request,
            ProbeStatus::ExecutionFailure => StatusKey::Execution,
        }
    }
}

impl StatusKey {
    fn heading(&self) -> String {
        match self {
            StatusKey::Code(code) => match code {
                100..=199 => format!("[{}] Informational", code),
                200..=299 => format!("[{}] Success", code),
                300..=399 => format!("[{}] Redirect", code),
                400..=499 => format!("[{}] Client Error", code),
                500..=599 => format!("[{}] Server Error", code),
                _ => format!("[{}]", code),
            },
            StatusKey::Timeout => "[Request Timeout]".to_string(),
            StatusKey::Connection => "[Connection Error]".to_string(),
            StatusKey::Request => "[Request Error]".to_string(),
            StatusKey::Execution => "[Execution Error]".to_string(),
        }
    }
}

pub fn generate_json_report(results: &BatchResult) -> Result<String, serde_json::Error> {
    let summary = results.summary();
    let outcomes: Vec<serde_json::Value> = results
        .iter()
        .map(|outcome| {
            serde_json::json!({
                "original": outcome.original,
                "resolved": outcome.resolved,
                "status": outcome.status.label(),
                "status_code": outcome.status.status_code(),
                "error": outcome.error,
                "response_time_ms": outcome.response_time.as_millis() as u64,
            })
        })
        .collect();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Linkvet",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": summary,
            "outcomes": outcomes
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// One row per outcome, in completion order.
pub fn generate_csv_report(results: &BatchResult) -> String {
    let mut csv = CSV_HEADER.join(",");
    csv.push('\n');

    for outcome in results {
        let row = [
            escape_csv_field(&outcome.original),
            escape_csv_field(&outcome.resolved),
            escape_csv_field(&outcome.status.label()),
            escape_csv_field(&outcome.error),
            outcome.response_time.as_millis().to_string(),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    csv
}

/// `<timestamp>_<input stem>_results.<ext>`, next to the input file.
pub fn default_output_path(input: &Path, format: ReportFormat, now: DateTime<Local>) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("addresses");
    let file_name = format!(
        "{}_{}_results.{}",
        now.format("%Y%m%d%H%M%S"),
        stem,
        format.extension()
    );

    match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
