use super::{DataProbe, SchemaCatalog, TIMESTAMP_COLUMN};
use crate::error::BackendError;
use crate::model::{quote_identifier, ColumnRef, ColumnStats, Identifier, TableRef};
use crate::window::{format_cutoff, ScanWindow};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Result};
use tracing::{debug, trace};

/// SQLite catalog and probe. Schemas are the connection's attached databases
/// (`main`, `temp`, or anything added with `ATTACH`).
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn))
    }

    /// Open an existing database file without write access.
    pub fn open_read_only(path: &str) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        SqliteCatalog { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// The attached database named `schema`, as spelled by SQLite itself.
    fn resolve_schema(&self, schema: &str) -> std::result::Result<Identifier, BackendError> {
        let name: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM pragma_database_list WHERE name = ?1",
                params![schema],
                |row| row.get(0),
            )
            .optional()?;
        name.map(Identifier::from_catalog)
            .ok_or_else(|| BackendError::UnknownSchema(schema.to_string()))
    }
}

/// `created_at` normalized to `YYYY-MM-DD HH:MM:SS` so it orders against the
/// bound cutoff. Numeric values are unix epoch seconds; text goes through
/// `datetime()` so date-only and `T`-separated values compare correctly.
/// Values `datetime()` cannot parse become NULL and fall outside the window.
pub(crate) fn normalized_timestamp() -> String {
    let ts = quote_identifier(TIMESTAMP_COLUMN);
    format!(
        "CASE typeof({ts}) WHEN 'integer' THEN datetime({ts}, 'unixepoch') \
         WHEN 'real' THEN datetime({ts}, 'unixepoch') \
         ELSE datetime({ts}) END",
        ts = ts
    )
}

/// Probe statement for `column`; the cutoff, when present, is parameter `?1`.
pub(crate) fn probe_statement(column: &ColumnRef, window: &ScanWindow) -> String {
    let col = column.name.quoted();
    let mut sql = format!(
        "SELECT COUNT(DISTINCT {col}) AS unique_values, {col} IS NULL AS is_null, \
         CAST({col} AS TEXT) AS val FROM {table}",
        col = col,
        table = column.table.qualified(),
    );
    match window {
        ScanWindow::AllRows => sql.push_str(&format!(" WHERE {} IS NOT NULL", col)),
        ScanWindow::Since { .. } => sql.push_str(&format!(
            " WHERE {} >= ?1 AND {} IS NOT NULL",
            normalized_timestamp(),
            col
        )),
    }
    sql
}

fn value_to_string(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn stats_from_row(row: &rusqlite::Row<'_>) -> Result<ColumnStats> {
    let unique_values: i64 = row.get(0)?;
    let is_null: bool = row.get(1)?;
    Ok(ColumnStats {
        distinct_count: unique_values.max(0) as u64,
        is_null,
        sample_value: value_to_string(row.get_ref(2)?),
    })
}

impl SchemaCatalog for SqliteCatalog {
    fn schema_exists(&mut self, schema: &str) -> std::result::Result<bool, BackendError> {
        match self.resolve_schema(schema) {
            Ok(_) => Ok(true),
            Err(BackendError::UnknownSchema(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn list_tables(&mut self, schema: &str) -> std::result::Result<Vec<TableRef>, BackendError> {
        let schema = self.resolve_schema(schema)?;
        let sql = format!(
            "SELECT name FROM {}.sqlite_schema \
             WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
             ORDER BY rowid",
            schema.quoted()
        );
        debug!("Listing tables: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .map(|name| name.map(|name| TableRef::from_catalog(schema.as_str(), name)))
            .collect::<Result<Vec<_>>>()?;
        Ok(tables)
    }

    fn list_tables_with_column(
        &mut self,
        schema: &str,
        column: &str,
    ) -> std::result::Result<Vec<TableRef>, BackendError> {
        let schema = self.resolve_schema(schema)?;
        let sql = format!(
            "SELECT m.name FROM {}.sqlite_schema AS m \
             JOIN pragma_table_info(m.name, ?1) AS c \
             WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
             AND c.name = ?2 \
             GROUP BY m.name \
             ORDER BY MIN(m.rowid)",
            schema.quoted()
        );
        debug!("Listing tables with column '{}': {}", column, sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let tables = stmt
            .query_map(params![schema.as_str(), column], |row| row.get::<_, String>(0))?
            .map(|name| name.map(|name| TableRef::from_catalog(schema.as_str(), name)))
            .collect::<Result<Vec<_>>>()?;
        Ok(tables)
    }

    fn list_columns(
        &mut self,
        table: &TableRef,
    ) -> std::result::Result<Vec<Identifier>, BackendError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1, ?2) ORDER BY cid")?;
        let columns = stmt
            .query_map(params![table.name.as_str(), table.schema.as_str()], |row| {
                row.get::<_, String>(0)
            })?
            .map(|name| name.map(Identifier::from_catalog))
            .collect::<Result<Vec<_>>>()?;
        Ok(columns)
    }
}

impl DataProbe for SqliteCatalog {
    fn probe(
        &mut self,
        column: &ColumnRef,
        window: &ScanWindow,
    ) -> std::result::Result<ColumnStats, BackendError> {
        let sql = probe_statement(column, window);
        trace!("Probing {}: {}", column, sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let stats = match window.cutoff() {
            Some(cutoff) => stmt.query_row(params![format_cutoff(&cutoff)], stats_from_row)?,
            None => stmt.query_row([], stats_from_row)?,
        };
        trace!("{} -> {:?}", column, stats);
        Ok(stats)
    }
}
