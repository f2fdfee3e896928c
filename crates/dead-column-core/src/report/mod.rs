pub mod csv;
pub mod json;

use crate::config::{OutputTarget, ReportFormat};
use crate::error::{Error, SinkError};
use crate::model::{DeadColumnFinding, ScanReport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

/// One report line: a dead column and what it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub distinct_values: u64,
    pub value: String,
}

impl From<&DeadColumnFinding> for ReportRow {
    fn from(finding: &DeadColumnFinding) -> Self {
        ReportRow {
            schema: finding.table.schema.to_string(),
            table: finding.table.name.to_string(),
            column: finding.column.to_string(),
            distinct_values: finding.distinct_count,
            value: finding.display_value.clone(),
        }
    }
}

/// Rows in report order: schema by schema, table by table.
pub fn rows(report: &ScanReport) -> Vec<ReportRow> {
    report
        .groups()
        .iter()
        .flat_map(|schema| schema.tables.iter())
        .flat_map(|table| table.findings.iter().map(|finding| ReportRow::from(*finding)))
        .collect()
}

/// Render the whole report in memory.
pub fn render(report: &ScanReport, format: ReportFormat) -> Result<Vec<u8>, SinkError> {
    let mut buffer = Vec::new();
    match format {
        ReportFormat::Csv => csv::write_csv(report, &mut buffer)?,
        ReportFormat::Json => json::write_json(report, &mut buffer)?,
    }
    Ok(buffer)
}

/// Write the report to its target. The report is rendered fully before the
/// file is created, so a failed render leaves no file behind.
///
/// Returns the path written, or `None` for stdout.
pub fn write_report(report: &ScanReport, target: &OutputTarget) -> Result<Option<PathBuf>, Error> {
    let sink_error = |source: SinkError| Error::OutputSink {
        target: target.to_string(),
        source,
    };

    let bytes = render(report, target.format).map_err(sink_error)?;

    match target.path() {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| sink_error(e.into()))?;
            }
            fs::write(&path, &bytes).map_err(|e| sink_error(e.into()))?;
            info!(
                "Wrote {} dead columns to {}",
                report.len(),
                path.display()
            );
            Ok(Some(path))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&bytes)
                .and_then(|_| stdout.flush())
                .map_err(|e| sink_error(e.into()))?;
            Ok(None)
        }
    }
}
