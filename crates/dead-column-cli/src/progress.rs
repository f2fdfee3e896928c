use dead_column_core::model::ColumnRef;
use dead_column_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// CLI progress reporter using indicatif progress bars.
///
/// - Selection and enumeration: spinner
/// - Probing: progress bar over the total column count
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

impl ProgressReporter for CliReporter {
    fn on_select_start(&self, schema: &str) {
        self.set_bar(spinner(format!("Reading catalog for schema {}...", schema)));
    }

    fn on_select_complete(&self, tables: usize, _duration_secs: f64) {
        self.with_bar(|pb| pb.set_message(format!("Listing columns of {} tables...", tables)));
    }

    fn on_enumerate_complete(&self, tables: usize, columns: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Catalog read: {} tables, {} columns in {:.2}s",
            tables, columns, duration_secs
        );
    }

    fn on_probe_start(&self, total_columns: usize) {
        let pb = ProgressBar::new(total_columns as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Probing [{bar:30.cyan/dim}] {pos}/{len} columns ({eta} remaining) {msg}",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_probe_progress(&self, probed: usize, _total_columns: usize, column: &ColumnRef) {
        self.with_bar(|pb| {
            pb.set_position(probed as u64);
            pb.set_message(column.to_string());
        });
    }

    fn on_probe_complete(&self, dead_columns: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Probe complete: {} dead columns in {:.2}s",
            dead_columns, duration_secs
        );
    }
}
