use crate::error::Error;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_LOOKBACK_MONTHS: i64 = 6;
pub const DEFAULT_OUTPUT: &str = "dead-columns";
/// Output target that writes the report to stdout instead of a file.
pub const STDOUT_TARGET: &str = "-";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}' (expected csv or json)", other)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where the report goes: a base file name plus format, or stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub base: String,
    pub format: ReportFormat,
}

impl Default for OutputTarget {
    fn default() -> Self {
        OutputTarget {
            base: DEFAULT_OUTPUT.to_string(),
            format: ReportFormat::default(),
        }
    }
}

impl OutputTarget {
    pub fn new(base: impl Into<String>, format: ReportFormat) -> Self {
        OutputTarget {
            base: base.into(),
            format,
        }
    }

    pub fn is_stdout(&self) -> bool {
        self.base == STDOUT_TARGET
    }

    /// File path for the report, with the format's extension appended unless
    /// the base already carries it. `None` when writing to stdout.
    pub fn path(&self) -> Option<PathBuf> {
        if self.is_stdout() {
            return None;
        }
        let suffix = format!(".{}", self.format.extension());
        if self.base.to_ascii_lowercase().ends_with(&suffix) {
            Some(PathBuf::from(&self.base))
        } else {
            Some(PathBuf::from(format!("{}{}", self.base, suffix)))
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{}", path.display()),
            None => f.write_str("stdout"),
        }
    }
}

/// Immutable settings for a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    schema: String,
    include_all_tables: bool,
    lookback_months: i64,
    output: OutputTarget,
}

impl ScanConfig {
    /// `lookback_months` must be positive unless `include_all_tables` is set,
    /// in which case it is ignored.
    pub fn new(
        schema: impl Into<String>,
        include_all_tables: bool,
        lookback_months: i64,
        output: OutputTarget,
    ) -> Result<Self, Error> {
        let schema = schema.into();
        if schema.trim().is_empty() {
            return Err(Error::Configuration("schema name is required".to_string()));
        }
        if !include_all_tables && lookback_months <= 0 {
            return Err(Error::Configuration(format!(
                "lookback window must be a positive number of months, got {}",
                lookback_months
            )));
        }

        Ok(ScanConfig {
            schema,
            include_all_tables,
            lookback_months,
            output,
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn include_all_tables(&self) -> bool {
        self.include_all_tables
    }

    pub fn lookback_months(&self) -> i64 {
        self.lookback_months
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }
}

/// Settings merged from `DeadColumns.toml`, `DEAD_COLUMNS_*` environment
/// variables and command line overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub schema: Option<String>,
    pub include_all_tables: bool,
    pub lookback_months: i64,
    pub output: String,
    pub format: ReportFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: None,
            schema: None,
            include_all_tables: false,
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
            output: DEFAULT_OUTPUT.to_string(),
            format: ReportFormat::default(),
        }
    }
}

impl AppConfig {
    /// Configured URL, falling back to `DATABASE_URL`.
    pub fn database_url(&self) -> Result<String, Error> {
        self.database_url
            .clone()
            .or_else(|| env::var("DATABASE_URL").ok())
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                Error::Configuration(
                    "no database URL configured (set database_url or DATABASE_URL)".to_string(),
                )
            })
    }

    pub fn scan_config(&self) -> Result<ScanConfig, Error> {
        let schema = self
            .schema
            .clone()
            .ok_or_else(|| Error::Configuration("schema name is required".to_string()))?;
        ScanConfig::new(
            schema,
            self.include_all_tables,
            self.lookback_months,
            OutputTarget::new(self.output.clone(), self.format),
        )
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    load_configuration_from("DeadColumns")
}

/// Load settings from the named config file (any format the `config` crate
/// recognizes, extension optional) layered under the environment.
pub fn load_configuration_from(file_name: &str) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("include_all_tables", false)?
        .set_default("lookback_months", DEFAULT_LOOKBACK_MONTHS)?
        .set_default("output", DEFAULT_OUTPUT)?
        .set_default("format", "csv")?
        .add_source(ConfigFile::with_name(file_name).required(false))
        .add_source(Environment::with_prefix("DEAD_COLUMNS").try_parsing(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
