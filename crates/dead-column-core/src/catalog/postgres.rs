use super::{DataProbe, SchemaCatalog, TIMESTAMP_COLUMN};
use crate::error::BackendError;
use crate::model::{quote_identifier, ColumnRef, ColumnStats, Identifier, TableRef};
use crate::window::ScanWindow;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Nullable, Text, Timestamp};
use diesel::result::ConnectionResult;
use tracing::{debug, trace};

/// PostgreSQL catalog over `information_schema`, plus the column probe.
pub struct PgCatalog {
    conn: PgConnection,
}

#[derive(Debug, QueryableByName)]
struct TableRow {
    #[diesel(sql_type = Text)]
    table_schema: String,
    #[diesel(sql_type = Text)]
    table_name: String,
}

#[derive(Debug, QueryableByName)]
struct ColumnRow {
    #[diesel(sql_type = Text)]
    column_name: String,
}

#[derive(Debug, QueryableByName)]
struct DataTypeRow {
    #[diesel(sql_type = Text)]
    data_type: String,
}

#[derive(Debug, QueryableByName)]
struct PresenceRow {
    #[diesel(sql_type = Bool)]
    present: bool,
}

#[derive(Debug, QueryableByName)]
struct ProbeRow {
    #[diesel(sql_type = BigInt)]
    unique_values: i64,
    #[diesel(sql_type = Bool)]
    is_null: bool,
    #[diesel(sql_type = Nullable<Text>)]
    val: Option<String>,
}

impl From<ProbeRow> for ColumnStats {
    fn from(row: ProbeRow) -> Self {
        ColumnStats {
            distinct_count: row.unique_values.max(0) as u64,
            is_null: row.is_null,
            sample_value: row.val,
        }
    }
}

impl From<TableRow> for TableRef {
    fn from(row: TableRow) -> Self {
        TableRef::from_catalog(row.table_schema, row.table_name)
    }
}

impl PgCatalog {
    pub fn establish(database_url: &str) -> ConnectionResult<Self> {
        let conn = PgConnection::establish(database_url)?;
        Ok(PgCatalog { conn })
    }
}

/// `information_schema.columns.data_type` values with no default equality
/// operator. `COUNT(DISTINCT ...)` fails on these, so they are compared by
/// their text form. Arrays and user-defined types may wrap one of them.
const TEXT_COMPARED_TYPES: &[&str] = &[
    "json", "xml", "point", "line", "lseg", "box", "path", "polygon", "circle", "ARRAY",
    "USER-DEFINED",
];

/// How a probe decides two values are the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comparison {
    /// The type's own equality, so `1.0` and `1.00` in a numeric column are one value.
    Native,
    /// Equality of the `::text` rendering.
    Text,
}

impl Comparison {
    pub(crate) fn for_data_type(data_type: &str) -> Self {
        if TEXT_COMPARED_TYPES.contains(&data_type) {
            Comparison::Text
        } else {
            Comparison::Native
        }
    }
}

/// PostgreSQL rejects bare columns next to aggregates, so the representative
/// value is taken with `MIN` over the text form. For a column with at most one
/// distinct value that is the value itself. The cutoff, when present, is `$1`.
pub(crate) fn probe_statement(
    column: &ColumnRef,
    window: &ScanWindow,
    comparison: Comparison,
) -> String {
    let col = column.name.quoted();
    let counted = match comparison {
        Comparison::Native => col.clone(),
        Comparison::Text => format!("{}::text", col),
    };
    let mut sql = format!(
        "SELECT COUNT(DISTINCT {counted}) AS unique_values, \
         MIN({col}::text) IS NULL AS is_null, \
         MIN({col}::text) AS val FROM {table}",
        counted = counted,
        col = col,
        table = column.table.qualified(),
    );
    match window {
        ScanWindow::AllRows => sql.push_str(&format!(" WHERE {} IS NOT NULL", col)),
        ScanWindow::Since { .. } => sql.push_str(&format!(
            " WHERE {} >= $1 AND {} IS NOT NULL",
            quote_identifier(TIMESTAMP_COLUMN),
            col
        )),
    }
    sql
}

impl SchemaCatalog for PgCatalog {
    fn schema_exists(&mut self, schema: &str) -> Result<bool, BackendError> {
        let row = diesel::sql_query(
            "SELECT EXISTS (SELECT 1 FROM information_schema.schemata \
             WHERE schema_name = $1) AS present",
        )
        .bind::<Text, _>(schema)
        .get_result::<PresenceRow>(&mut self.conn)?;
        Ok(row.present)
    }

    fn list_tables(&mut self, schema: &str) -> Result<Vec<TableRef>, BackendError> {
        debug!("Listing tables in schema {}", schema);
        let rows = diesel::sql_query(
            "SELECT table_schema::text AS table_schema, table_name::text AS table_name \
             FROM information_schema.tables \
             WHERE table_schema = $1 \
             ORDER BY table_name",
        )
        .bind::<Text, _>(schema)
        .load::<TableRow>(&mut self.conn)?;
        Ok(rows.into_iter().map(TableRef::from).collect())
    }

    fn list_tables_with_column(
        &mut self,
        schema: &str,
        column: &str,
    ) -> Result<Vec<TableRef>, BackendError> {
        debug!("Listing tables in schema {} with column '{}'", schema, column);
        let rows = diesel::sql_query(
            "SELECT t.table_schema::text AS table_schema, t.table_name::text AS table_name \
             FROM information_schema.tables AS t \
             JOIN information_schema.columns AS c USING (table_schema, table_name) \
             WHERE c.column_name = $2 AND t.table_schema = $1 \
             GROUP BY t.table_schema, t.table_name \
             ORDER BY t.table_name",
        )
        .bind::<Text, _>(schema)
        .bind::<Text, _>(column)
        .load::<TableRow>(&mut self.conn)?;
        Ok(rows.into_iter().map(TableRef::from).collect())
    }

    fn list_columns(&mut self, table: &TableRef) -> Result<Vec<Identifier>, BackendError> {
        let rows = diesel::sql_query(
            "SELECT column_name::text AS column_name \
             FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2 \
             ORDER BY ordinal_position",
        )
        .bind::<Text, _>(table.schema.as_str())
        .bind::<Text, _>(table.name.as_str())
        .load::<ColumnRow>(&mut self.conn)?;
        Ok(rows
            .into_iter()
            .map(|row| Identifier::from_catalog(row.column_name))
            .collect())
    }
}

impl PgCatalog {
    fn comparison_for(&mut self, column: &ColumnRef) -> Result<Comparison, BackendError> {
        let row = diesel::sql_query(
            "SELECT data_type::text AS data_type \
             FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2 AND column_name = $3",
        )
        .bind::<Text, _>(column.table.schema.as_str())
        .bind::<Text, _>(column.table.name.as_str())
        .bind::<Text, _>(column.name.as_str())
        .get_result::<DataTypeRow>(&mut self.conn)
        .optional()?;
        Ok(row.map_or(Comparison::Text, |row| {
            Comparison::for_data_type(&row.data_type)
        }))
    }
}

impl DataProbe for PgCatalog {
    fn probe(&mut self, column: &ColumnRef, window: &ScanWindow) -> Result<ColumnStats, BackendError> {
        let comparison = self.comparison_for(column)?;
        let sql = probe_statement(column, window, comparison);
        trace!("Probing {}: {}", column, sql);

        let row = match window.cutoff() {
            Some(cutoff) => diesel::sql_query(sql)
                .bind::<Timestamp, _>(cutoff)
                .get_result::<ProbeRow>(&mut self.conn)?,
            None => diesel::sql_query(sql).get_result::<ProbeRow>(&mut self.conn)?,
        };
        trace!("{} -> {:?}", column, row);
        Ok(row.into())
    }
}
