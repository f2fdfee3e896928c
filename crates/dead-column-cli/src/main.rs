mod commands;
mod logging;
mod progress;

use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, ScanArgs};
use dead_column_core::config::load_configuration;
use dead_column_core::model::ScanReport;
use dead_column_core::{report, AppConfig, Database, DeadColumnScanner};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let mut config = match load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let outcome = match args.command {
        Some(Commands::Scan(overrides)) => {
            apply_overrides(&mut config, overrides);
            run_scan(&config)
        }
        Some(Commands::ListTables(overrides)) => {
            apply_overrides(&mut config, overrides);
            run_list_tables(&config)
        }
        Some(Commands::PrintConfig(overrides)) => {
            apply_overrides(&mut config, overrides);
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

/// Command line flags win over the config file and environment.
fn apply_overrides(config: &mut AppConfig, args: ScanArgs) {
    if let Some(url) = args.database_url {
        config.database_url = Some(url);
    }
    if let Some(schema) = args.schema {
        config.schema = Some(schema);
    }
    if let Some(all) = args.all {
        config.include_all_tables = all;
    }
    if let Some(months) = args.months {
        config.lookback_months = months;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
}

fn connect(config: &AppConfig) -> Result<Database> {
    let url = config.database_url()?;
    let db = Database::connect(&url).context("could not open the database")?;
    info!("Connected to {}", db.backend_name());
    Ok(db)
}

fn run_scan(config: &AppConfig) -> Result<()> {
    let scan_config = config.scan_config()?;
    let mut db = connect(config)?;

    let scanner = DeadColumnScanner::new(scan_config);
    let reporter = CliReporter::new();
    let result = scanner.scan(&mut db, &reporter)?;

    let written = report::write_report(&result.report, scanner.config().output())?;

    eprintln!();
    info!(
        "Select: {}, Enumerate: {}, Probe: {}",
        format!("{:.2}s", result.select_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.enumerate_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.probe_duration.as_secs_f64()).green(),
    );
    print_summary(&result.report);
    if let Some(path) = written {
        info!("Report written to {}", path.display().to_string().cyan());
    }

    Ok(())
}

fn print_summary(report: &ScanReport) {
    info!(
        "{} dead columns in {} tables, {} columns probed ({})",
        format!("{}", report.len()).red(),
        format!("{}", report.tables_scanned).cyan(),
        format!("{}", report.columns_probed).cyan(),
        report.window_label,
    );
    for group in report.groups() {
        for table in group.tables {
            info!(
                "{}.{}: {}",
                group.schema,
                table.table.name.to_string().bold(),
                table
                    .findings
                    .iter()
                    .map(|f| f.column.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
}

fn run_list_tables(config: &AppConfig) -> Result<()> {
    let scan_config = config.scan_config()?;
    let mut db = connect(config)?;

    let scanner = DeadColumnScanner::new(scan_config);
    let discovered = scanner.discover(&mut db)?;

    for entry in discovered.tables() {
        println!("{}\t{}", entry.table, entry.columns.len());
    }
    info!(
        "{} tables, {} columns would be probed ({})",
        format!("{}", discovered.table_count()).cyan(),
        format!("{}", discovered.total_columns()).cyan(),
        scanner.window()?.label(),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_configured_values() {
        let mut config = AppConfig {
            include_all_tables: true,
            schema: Some("public".to_string()),
            ..AppConfig::default()
        };
        apply_overrides(
            &mut config,
            ScanArgs {
                all: Some(false),
                schema: Some("shop".to_string()),
                months: Some(3),
                ..ScanArgs::default()
            },
        );
        assert!(!config.include_all_tables);
        assert_eq!(config.schema.as_deref(), Some("shop"));
        assert_eq!(config.lookback_months, 3);
    }

    #[test]
    fn test_absent_flags_keep_configured_values() {
        let mut config = AppConfig {
            include_all_tables: true,
            ..AppConfig::default()
        };
        apply_overrides(&mut config, ScanArgs::default());
        assert!(config.include_all_tables);
        assert_eq!(config.output, AppConfig::default().output);
    }
}
