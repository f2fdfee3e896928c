use crate::catalog::{DataProbe, SchemaCatalog};
use crate::classifier;
use crate::config::ScanConfig;
use crate::enumerator;
use crate::error::Error;
use crate::model::{ColumnsByTable, ScanReport};
use crate::progress::ProgressReporter;
use crate::selector;
use crate::window::ScanWindow;
use chrono::{Local, NaiveDate};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct DeadColumnScanner {
    config: ScanConfig,
    today: NaiveDate,
}

#[derive(Debug)]
pub struct ScanResult {
    pub report: ScanReport,
    pub select_duration: Duration,
    pub enumerate_duration: Duration,
    pub probe_duration: Duration,
}

impl DeadColumnScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            today: Local::now().date_naive(),
        }
    }

    /// Pin the date the lookback window is measured from.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn window(&self) -> Result<ScanWindow, Error> {
        ScanWindow::resolve(&self.config, self.today)
    }

    /// Run stages 1 and 2 only: the tables that would be scanned, with their columns.
    pub fn discover<C>(&self, catalog: &mut C) -> Result<ColumnsByTable, Error>
    where
        C: SchemaCatalog + ?Sized,
    {
        let tables = selector::select_tables(catalog, &self.config)?;
        enumerator::enumerate_columns(catalog, &tables)
    }

    /// Run the full dead column pipeline:
    /// 1. Select tables (all, or those with `created_at`)
    /// 2. Enumerate their columns from the catalog
    /// 3. Probe each column and keep those with at most one distinct value
    ///
    /// Nothing is returned unless every stage succeeds.
    pub fn scan<D>(&self, db: &mut D, reporter: &dyn ProgressReporter) -> Result<ScanResult, Error>
    where
        D: SchemaCatalog + DataProbe + ?Sized,
    {
        // Resolved up front so a bad window fails before any query runs.
        let window = self.window()?;
        info!(
            "Scanning schema {} ({})",
            self.config.schema(),
            window.label()
        );

        // Phase 1: Select
        reporter.on_select_start(self.config.schema());
        let select_start = Instant::now();
        let tables = selector::select_tables(db, &self.config)?;
        let select_duration = select_start.elapsed();
        reporter.on_select_complete(tables.len(), select_duration.as_secs_f64());

        // Phase 2: Enumerate
        let enumerate_start = Instant::now();
        let columns = enumerator::enumerate_columns(db, &tables)?;
        let enumerate_duration = enumerate_start.elapsed();
        reporter.on_enumerate_complete(
            columns.table_count(),
            columns.total_columns(),
            enumerate_duration.as_secs_f64(),
        );
        debug!(
            "Enumeration completed in {:.2}s: {} tables, {} columns",
            enumerate_duration.as_secs_f64(),
            columns.table_count(),
            columns.total_columns(),
        );

        // Phase 3: Classify
        let probe_start = Instant::now();
        let report = classifier::classify(db, &columns, &window, reporter)?;
        let probe_duration = probe_start.elapsed();
        reporter.on_probe_complete(report.len(), probe_duration.as_secs_f64());
        debug!(
            "Probing completed in {:.2}s: {} dead columns",
            probe_duration.as_secs_f64(),
            report.len(),
        );

        Ok(ScanResult {
            report,
            select_duration,
            enumerate_duration,
            probe_duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fake::FakeCatalog;
    use crate::config::OutputTarget;
    use crate::model::{test_table, ColumnRef, ColumnStats};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<String>>,
    }

    impl RecordingReporter {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl ProgressReporter for RecordingReporter {
        fn on_select_start(&self, schema: &str) {
            self.push(format!("select {}", schema));
        }
        fn on_select_complete(&self, tables: usize, _duration_secs: f64) {
            self.push(format!("selected {}", tables));
        }
        fn on_enumerate_complete(&self, tables: usize, columns: usize, _duration_secs: f64) {
            self.push(format!("enumerated {}/{}", tables, columns));
        }
        fn on_probe_start(&self, total_columns: usize) {
            self.push(format!("probe {}", total_columns));
        }
        fn on_probe_progress(&self, probed: usize, _total_columns: usize, column: &ColumnRef) {
            self.push(format!("probed {} {}", probed, column));
        }
        fn on_probe_complete(&self, dead_columns: usize, _duration_secs: f64) {
            self.push(format!("dead {}", dead_columns));
        }
    }

    fn catalog() -> FakeCatalog {
        let mut catalog = FakeCatalog {
            schemas: vec!["shop".to_string()],
            tables: vec![test_table("shop", "orders"), test_table("shop", "settings")],
            timestamped: vec![test_table("shop", "orders")],
            ..Default::default()
        };
        catalog.columns.insert(
            "shop.orders".to_string(),
            vec!["status".to_string(), "amount".to_string()],
        );
        catalog
            .columns
            .insert("shop.settings".to_string(), vec!["value".to_string()]);
        catalog.stats.insert(
            "shop.orders.amount".to_string(),
            ColumnStats {
                distinct_count: 3,
                is_null: false,
                sample_value: Some("10".to_string()),
            },
        );
        catalog
    }

    fn scanner(include_all_tables: bool, months: i64) -> DeadColumnScanner {
        let config =
            ScanConfig::new("shop", include_all_tables, months, OutputTarget::default()).unwrap();
        DeadColumnScanner::new(config).with_today(NaiveDate::from_ymd_opt(2024, 8, 15).unwrap())
    }

    #[test]
    fn test_scan_reports_every_stage_in_order() {
        let mut db = catalog();
        let reporter = RecordingReporter::default();
        let result = scanner(false, 6).scan(&mut db, &reporter).unwrap();

        assert_eq!(
            *reporter.events.lock().unwrap(),
            vec![
                "select shop",
                "selected 1",
                "enumerated 1/2",
                "probe 2",
                "probed 1 shop.orders.status",
                "probed 2 shop.orders.amount",
                "dead 1",
            ]
        );
        assert_eq!(result.report.len(), 1);
        assert_eq!(result.report.window_label, "In the past 6 months");
    }

    #[test]
    fn test_unrepresentable_window_fails_before_selection() {
        let mut db = catalog();
        let reporter = RecordingReporter::default();
        let err = scanner(false, i64::from(u32::MAX) + 1)
            .scan(&mut db, &reporter)
            .unwrap_err();

        assert!(matches!(err, Error::Configuration(_)));
        assert!(reporter.events.lock().unwrap().is_empty());
        assert!(db.probes.is_empty());
    }

    #[test]
    fn test_discover_uses_selection_mode() {
        let mut db = catalog();
        assert_eq!(scanner(false, 6).discover(&mut db).unwrap().total_columns(), 2);
        assert_eq!(scanner(true, 6).discover(&mut db).unwrap().total_columns(), 3);
        assert!(db.probes.is_empty());
    }
}
