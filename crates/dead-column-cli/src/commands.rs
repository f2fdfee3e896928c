use clap::{Args, Parser, Subcommand};
use dead_column_core::config::ReportFormat;

#[derive(Debug, Parser)]
#[command(name = "dead-columns")]
#[command(about = "Find columns that never change", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a schema for dead columns and write the report
    Scan(ScanArgs),
    /// List the tables and column counts a scan would probe
    ListTables(ScanArgs),
    /// Print configuration values
    PrintConfig(ScanArgs),
}

/// Overrides for values from DeadColumns.toml and DEAD_COLUMNS_* variables.
#[derive(Debug, Clone, Default, Args)]
pub struct ScanArgs {
    /// Database URL (postgres://..., sqlite://path or a SQLite file path).
    /// Falls back to DATABASE_URL.
    #[arg(long)]
    pub database_url: Option<String>,

    /// Schema to scan (attached database name for SQLite, e.g. main)
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Scan every table across all rows instead of a created_at window.
    /// `--all=false` turns off a configured all-tables scan.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub all: Option<bool>,

    /// Lookback window in months
    #[arg(short, long)]
    pub months: Option<i64>,

    /// Report base file name, extension added per format; '-' for stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Report format: csv or json
    #[arg(short, long)]
    pub format: Option<ReportFormat>,
}
