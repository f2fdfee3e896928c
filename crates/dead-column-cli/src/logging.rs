use std::env;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/dead-columns.log";

/// Split `LOG_FILE_PATH` into the directory and file name the appender wants.
fn log_location(raw: &str) -> (PathBuf, PathBuf) {
    let path = Path::new(raw);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dead-columns.log"));
    (dir, file)
}

/// Install the stderr and file layers. Keep the returned guard alive until
/// exit or buffered file lines are lost.
pub fn init_logger() -> WorkerGuard {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    let raw_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (log_dir, log_file) = log_location(&raw_path);

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Reports can be written to stdout, so the terminal layer uses stderr.
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .pretty()
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    info!("Logging to stderr and {}", log_dir.join(&log_file).display());

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_location_splits_directory() {
        let (dir, file) = log_location("./logs/dead-columns.log");
        assert_eq!(dir, PathBuf::from("./logs"));
        assert_eq!(file, PathBuf::from("dead-columns.log"));
    }

    #[test]
    fn test_bare_file_name_logs_to_working_directory() {
        let (dir, file) = log_location("scan.log");
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, PathBuf::from("scan.log"));
    }
}
