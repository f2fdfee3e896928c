use crate::config::ScanConfig;
use crate::error::Error;
use chrono::{Months, NaiveDate, NaiveDateTime};

/// Row filter applied to every probe of a scan. Resolved once per scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanWindow {
    /// Every non-null value in the table counts.
    AllRows,
    /// Only rows whose `created_at` is at or after `cutoff` count.
    Since { cutoff: NaiveDateTime, months: u32 },
}

impl ScanWindow {
    /// Resolve the window for `config` relative to `today`.
    pub fn resolve(config: &ScanConfig, today: NaiveDate) -> Result<Self, Error> {
        if config.include_all_tables() {
            return Ok(ScanWindow::AllRows);
        }

        let months = u32::try_from(config.lookback_months())
            .ok()
            .filter(|months| *months > 0)
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "lookback window must be a positive number of months, got {}",
                    config.lookback_months()
                ))
            })?;

        let cutoff = months_before(today, months).ok_or_else(|| {
            Error::Configuration(format!(
                "cannot go back {} months from {}",
                months, today
            ))
        })?;

        Ok(ScanWindow::Since { cutoff, months })
    }

    pub fn cutoff(&self) -> Option<NaiveDateTime> {
        match self {
            ScanWindow::AllRows => None,
            ScanWindow::Since { cutoff, .. } => Some(*cutoff),
        }
    }

    /// Header text describing the window, used as the last report column.
    pub fn label(&self) -> String {
        match self {
            ScanWindow::AllRows => "All rows".to_string(),
            ScanWindow::Since { months, .. } => format!("In the past {} months", months),
        }
    }
}

/// Midnight of the calendar date `months` months before `today`.
///
/// Days past the end of the target month clamp to its last day.
pub fn months_before(today: NaiveDate, months: u32) -> Option<NaiveDateTime> {
    today
        .checked_sub_months(Months::new(months))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Cutoff formatted the way timestamp columns are usually stored as text.
pub(crate) fn format_cutoff(cutoff: &NaiveDateTime) -> String {
    cutoff.format("%Y-%m-%d %H:%M:%S").to_string()
}
