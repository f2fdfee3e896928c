use super::{rows, ReportRow};
use crate::error::SinkError;
use crate::model::ScanReport;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct JsonReport<'a> {
    window: &'a str,
    tables_scanned: usize,
    columns_probed: usize,
    findings: Vec<ReportRow>,
}

pub fn write_json<W: Write>(report: &ScanReport, mut writer: W) -> Result<(), SinkError> {
    let document = JsonReport {
        window: &report.window_label,
        tables_scanned: report.tables_scanned,
        columns_probed: report.columns_probed,
        findings: rows(report),
    };
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.write_all(b"\n")?;
    Ok(())
}
