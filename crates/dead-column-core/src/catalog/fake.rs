use super::{DataProbe, SchemaCatalog};
use crate::error::BackendError;
use crate::model::{ColumnRef, ColumnStats, Identifier, TableRef};
use crate::window::ScanWindow;
use std::collections::HashMap;

/// Scripted catalog for stage tests.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    pub schemas: Vec<String>,
    pub tables: Vec<TableRef>,
    /// Rows the timestamp join reports; duplicates allowed.
    pub timestamped: Vec<TableRef>,
    pub columns: HashMap<String, Vec<String>>,
    pub stats: HashMap<String, ColumnStats>,
    pub failing_table: Option<String>,
    pub failing_column: Option<String>,
    pub probes: Vec<(String, ScanWindow)>,
}

fn failure() -> BackendError {
    BackendError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
}

impl SchemaCatalog for FakeCatalog {
    fn schema_exists(&mut self, schema: &str) -> Result<bool, BackendError> {
        Ok(self.schemas.iter().any(|s| s == schema))
    }

    fn list_tables(&mut self, _schema: &str) -> Result<Vec<TableRef>, BackendError> {
        Ok(self.tables.clone())
    }

    fn list_tables_with_column(
        &mut self,
        _schema: &str,
        _column: &str,
    ) -> Result<Vec<TableRef>, BackendError> {
        Ok(self.timestamped.clone())
    }

    fn list_columns(&mut self, table: &TableRef) -> Result<Vec<Identifier>, BackendError> {
        let key = table.to_string();
        if self.failing_table.as_deref() == Some(key.as_str()) {
            return Err(failure());
        }
        Ok(self
            .columns
            .get(&key)
            .map(|names| names.iter().cloned().map(Identifier::from_catalog).collect())
            .unwrap_or_default())
    }
}

impl DataProbe for FakeCatalog {
    fn probe(&mut self, column: &ColumnRef, window: &ScanWindow) -> Result<ColumnStats, BackendError> {
        let key = column.to_string();
        self.probes.push((key.clone(), *window));
        if self.failing_column.as_deref() == Some(key.as_str()) {
            return Err(failure());
        }
        Ok(self.stats.get(&key).cloned().unwrap_or(ColumnStats {
            distinct_count: 0,
            is_null: true,
            sample_value: None,
        }))
    }
}
