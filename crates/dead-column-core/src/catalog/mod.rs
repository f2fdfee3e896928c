pub mod postgres;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod fake;

use crate::error::{BackendError, Error};
use crate::model::{ColumnRef, ColumnStats, Identifier, TableRef};
use crate::window::ScanWindow;
use tracing::debug;

pub use postgres::PgCatalog;
pub use sqlite::SqliteCatalog;

/// Column whose presence marks a table as timestamped, and which the scan
/// window filters on.
pub const TIMESTAMP_COLUMN: &str = "created_at";

/// Read-only access to the database's own description of its tables.
///
/// The schema name is always passed to the database as a bound parameter.
pub trait SchemaCatalog {
    fn schema_exists(&mut self, schema: &str) -> Result<bool, BackendError>;

    /// Every table in `schema`, in the catalog's order.
    fn list_tables(&mut self, schema: &str) -> Result<Vec<TableRef>, BackendError>;

    /// Tables in `schema` that have a column named exactly `column`.
    fn list_tables_with_column(
        &mut self,
        schema: &str,
        column: &str,
    ) -> Result<Vec<TableRef>, BackendError>;

    /// Column names of `table`, in ordinal order.
    fn list_columns(&mut self, table: &TableRef) -> Result<Vec<Identifier>, BackendError>;
}

/// Runs the per-column aggregate probe against live data.
pub trait DataProbe {
    fn probe(&mut self, column: &ColumnRef, window: &ScanWindow)
        -> Result<ColumnStats, BackendError>;
}

/// An open connection to one of the supported backends.
pub enum Database {
    Postgres(PgCatalog),
    Sqlite(SqliteCatalog),
}

impl Database {
    /// Open a connection based on the URL scheme: `postgres://` and
    /// `postgresql://` select PostgreSQL, `sqlite://`, `sqlite::memory:` or a
    /// plain file path select SQLite.
    pub fn connect(url: &str) -> Result<Self, Error> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            debug!("Connecting to PostgreSQL");
            let catalog = PgCatalog::establish(url)
                .map_err(|e| Error::Connection(format!("PostgreSQL: {}", e)))?;
            return Ok(Database::Postgres(catalog));
        }

        if url == "sqlite::memory:" {
            let catalog = SqliteCatalog::open_in_memory()
                .map_err(|e| Error::Connection(format!("SQLite: {}", e)))?;
            return Ok(Database::Sqlite(catalog));
        }

        let path = match url.strip_prefix("sqlite://") {
            Some(path) => path,
            None if url.contains("://") => {
                return Err(Error::Configuration(format!(
                    "unsupported database URL scheme in '{}'",
                    url.split("://").next().unwrap_or_default()
                )));
            }
            None => url,
        };

        debug!("Opening SQLite database {}", path);
        let catalog = SqliteCatalog::open_read_only(path)
            .map_err(|e| Error::Connection(format!("SQLite {}: {}", path, e)))?;
        Ok(Database::Sqlite(catalog))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Database::Postgres(_) => "PostgreSQL",
            Database::Sqlite(_) => "SQLite",
        }
    }
}

impl SchemaCatalog for Database {
    fn schema_exists(&mut self, schema: &str) -> Result<bool, BackendError> {
        match self {
            Database::Postgres(db) => db.schema_exists(schema),
            Database::Sqlite(db) => db.schema_exists(schema),
        }
    }

    fn list_tables(&mut self, schema: &str) -> Result<Vec<TableRef>, BackendError> {
        match self {
            Database::Postgres(db) => db.list_tables(schema),
            Database::Sqlite(db) => db.list_tables(schema),
        }
    }

    fn list_tables_with_column(
        &mut self,
        schema: &str,
        column: &str,
    ) -> Result<Vec<TableRef>, BackendError> {
        match self {
            Database::Postgres(db) => db.list_tables_with_column(schema, column),
            Database::Sqlite(db) => db.list_tables_with_column(schema, column),
        }
    }

    fn list_columns(&mut self, table: &TableRef) -> Result<Vec<Identifier>, BackendError> {
        match self {
            Database::Postgres(db) => db.list_columns(table),
            Database::Sqlite(db) => db.list_columns(table),
        }
    }
}

impl DataProbe for Database {
    fn probe(
        &mut self,
        column: &ColumnRef,
        window: &ScanWindow,
    ) -> Result<ColumnStats, BackendError> {
        match self {
            Database::Postgres(db) => db.probe(column, window),
            Database::Sqlite(db) => db.probe(column, window),
        }
    }
}
