use crate::catalog::SchemaCatalog;
use crate::error::Error;
use crate::model::{ColumnsByTable, TableRef};
use tracing::{debug, info, warn};

/// Column names of each table, grouped by schema and table in the order the
/// tables were given. The first failing lookup aborts the enumeration.
pub fn enumerate_columns<C>(catalog: &mut C, tables: &[TableRef]) -> Result<ColumnsByTable, Error>
where
    C: SchemaCatalog + ?Sized,
{
    let mut grouped = ColumnsByTable::default();

    for table in tables {
        let columns = catalog
            .list_columns(table)
            .map_err(|source| Error::MetadataQuery {
                context: format!("table {}", table),
                source,
            })?;

        if columns.is_empty() {
            warn!("Table {} has no columns", table);
        } else {
            debug!("Table {} has {} columns", table, columns.len());
        }
        grouped.push(table.clone(), columns);
    }

    info!(
        "Found {} columns across {} tables",
        grouped.total_columns(),
        grouped.table_count()
    );
    Ok(grouped)
}
