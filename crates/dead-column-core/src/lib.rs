pub mod catalog;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod enumerator;
pub mod error;
pub mod model;
pub mod progress;
pub mod report;
pub mod selector;
pub mod window;

pub use catalog::{DataProbe, Database, SchemaCatalog};
pub use config::{AppConfig, OutputTarget, ReportFormat, ScanConfig};
pub use engine::{DeadColumnScanner, ScanResult};
pub use error::Error;
pub use model::{ColumnRef, ColumnStats, ColumnsByTable, DeadColumnFinding, ScanReport, TableRef};
pub use progress::{ProgressReporter, SilentReporter};
pub use window::ScanWindow;
