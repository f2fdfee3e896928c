use crate::model::ColumnRef;

/// Trait for reporting scan progress.
///
/// The CLI implements it with indicatif; all methods default to no-ops.
pub trait ProgressReporter: Send + Sync {
    fn on_select_start(&self, _schema: &str) {}
    fn on_select_complete(&self, _tables: usize, _duration_secs: f64) {}
    fn on_enumerate_complete(&self, _tables: usize, _columns: usize, _duration_secs: f64) {}
    fn on_probe_start(&self, _total_columns: usize) {}
    fn on_probe_progress(&self, _probed: usize, _total_columns: usize, _column: &ColumnRef) {}
    fn on_probe_complete(&self, _dead_columns: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
