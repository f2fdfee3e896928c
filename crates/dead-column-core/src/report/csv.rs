use super::{rows, ReportRow};
use crate::error::SinkError;
use crate::model::ScanReport;
use std::io::{Read, Write};

pub const HEADER: [&str; 5] = ["Database", "Table", "Column", "Distinct Values", "Value"];

/// Header row followed by one five-cell row per finding. The header carries
/// a sixth cell, the window label, so records are written flexibly.
pub fn write_csv<W: Write>(report: &ScanReport, writer: W) -> Result<(), SinkError> {
    let mut wtr = ::csv::WriterBuilder::new().flexible(true).from_writer(writer);

    let mut header: Vec<&str> = HEADER.to_vec();
    header.push(&report.window_label);
    wtr.write_record(&header)?;

    for row in rows(report) {
        wtr.write_record([
            row.schema.as_str(),
            row.table.as_str(),
            row.column.as_str(),
            row.distinct_values.to_string().as_str(),
            row.value.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Parse a report written by [`write_csv`] back into rows.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ReportRow>, SinkError> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let mut parsed = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let field = |index: usize| record.get(index).unwrap_or_default().to_string();
        let distinct_values = record
            .get(3)
            .unwrap_or_default()
            .trim()
            .parse::<u64>()
            .map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("bad distinct count on line {}: {}", parsed.len() + 2, e),
                )
            })?;
        parsed.push(ReportRow {
            schema: field(0),
            table: field(1),
            column: field(2),
            distinct_values,
            value: field(4),
        });
    }
    Ok(parsed)
}

/// The window label stored in the header's last cell.
pub fn read_window_label<R: Read>(reader: R) -> Result<Option<String>, SinkError> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);
    Ok(rdr.headers()?.get(HEADER.len()).map(str::to_string))
}
