use crate::catalog::DataProbe;
use crate::error::Error;
use crate::model::{ColumnsByTable, DeadColumnFinding, ScanReport};
use crate::progress::ProgressReporter;
use crate::window::ScanWindow;
use tracing::{debug, info};

/// Probe every column, in discovery order, and keep the dead ones.
///
/// A column is dead when it has zero or one distinct non-null value inside
/// `window`. Live columns are dropped without a trace. The first probe error
/// aborts the pass.
pub fn classify<P>(
    probe: &mut P,
    columns: &ColumnsByTable,
    window: &ScanWindow,
    reporter: &dyn ProgressReporter,
) -> Result<ScanReport, Error>
where
    P: DataProbe + ?Sized,
{
    let total = columns.total_columns();
    if let Some(cutoff) = window.cutoff() {
        info!("Probing {} columns for rows created since {}", total, cutoff);
    } else {
        info!("Probing {} columns across all rows", total);
    }
    reporter.on_probe_start(total);

    let mut findings = Vec::new();
    for (index, column) in columns.columns().enumerate() {
        let stats = probe
            .probe(&column, window)
            .map_err(|source| Error::ProbeQuery {
                schema: column.table.schema.to_string(),
                table: column.table.name.to_string(),
                column: column.name.to_string(),
                source,
            })?;

        if stats.is_dead() {
            let finding = DeadColumnFinding::new(&column, &stats);
            debug!(
                "Dead column {}: {} distinct, value {}",
                column, finding.distinct_count, finding.display_value
            );
            findings.push(finding);
        }
        reporter.on_probe_progress(index + 1, total, &column);
    }

    Ok(ScanReport::new(
        window.label(),
        columns.table_count(),
        total,
        findings,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fake::FakeCatalog;
    use crate::model::{test_table, ColumnStats, Identifier};
    use crate::progress::SilentReporter;
    use chrono::NaiveDate;

    fn stats(distinct_count: u64, value: Option<&str>) -> ColumnStats {
        ColumnStats {
            distinct_count,
            is_null: value.is_none(),
            sample_value: value.map(str::to_string),
        }
    }

    fn orders() -> ColumnsByTable {
        let mut grouped = ColumnsByTable::default();
        grouped.push(
            test_table("shop", "orders"),
            ["status", "legacy_flag", "amount"]
                .into_iter()
                .map(Identifier::from_catalog)
                .collect(),
        );
        grouped
    }

    fn probe() -> FakeCatalog {
        let mut probe = FakeCatalog::default();
        probe
            .stats
            .insert("shop.orders.status".to_string(), stats(1, Some("paid")));
        probe
            .stats
            .insert("shop.orders.legacy_flag".to_string(), stats(0, None));
        probe
            .stats
            .insert("shop.orders.amount".to_string(), stats(2, Some("10")));
        probe
    }

    fn window() -> ScanWindow {
        let cutoff = NaiveDate::from_ymd_opt(2024, 2, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ScanWindow::Since { cutoff, months: 6 }
    }

    #[test]
    fn test_classify_keeps_dead_columns_in_order() {
        let mut probe = probe();
        let report = classify(&mut probe, &orders(), &window(), &SilentReporter).unwrap();

        let rows: Vec<(&str, &str, u64, &str)> = report
            .findings()
            .iter()
            .map(|f| {
                (
                    f.table.name.as_str(),
                    f.column.as_str(),
                    f.distinct_count,
                    f.display_value.as_str(),
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                ("orders", "status", 1, "paid"),
                ("orders", "legacy_flag", 0, "Null"),
            ]
        );
        assert_eq!(report.window_label, "In the past 6 months");
        assert_eq!(report.tables_scanned, 1);
        assert_eq!(report.columns_probed, 3);
    }

    #[test]
    fn test_window_is_passed_to_every_probe() {
        let mut probe = probe();
        classify(&mut probe, &orders(), &window(), &SilentReporter).unwrap();
        assert_eq!(probe.probes.len(), 3);
        assert!(probe.probes.iter().all(|(_, w)| *w == window()));
    }

    #[test]
    fn test_probe_failure_aborts_with_context() {
        let mut probe = probe();
        probe.failing_column = Some("shop.orders.legacy_flag".to_string());

        let err = classify(&mut probe, &orders(), &ScanWindow::AllRows, &SilentReporter)
            .unwrap_err();
        match err {
            Error::ProbeQuery {
                schema,
                table,
                column,
                ..
            } => {
                assert_eq!(schema, "shop");
                assert_eq!(table, "orders");
                assert_eq!(column, "legacy_flag");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // Nothing after the failing column was probed.
        assert_eq!(probe.probes.len(), 2);
    }
}
