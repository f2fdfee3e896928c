use crate::catalog::{SchemaCatalog, TIMESTAMP_COLUMN};
use crate::config::ScanConfig;
use crate::error::{BackendError, Error};
use crate::model::TableRef;
use std::collections::HashSet;
use tracing::{debug, info};

/// Tables to scan: every table of the schema, or only those with a
/// `created_at` column. Each table appears once, in catalog order.
pub fn select_tables<C>(catalog: &mut C, config: &ScanConfig) -> Result<Vec<TableRef>, Error>
where
    C: SchemaCatalog + ?Sized,
{
    let schema = config.schema();
    let metadata_error = |source: BackendError| Error::MetadataQuery {
        context: format!("schema '{}'", schema),
        source,
    };

    if !catalog.schema_exists(schema).map_err(metadata_error)? {
        return Err(metadata_error(BackendError::UnknownSchema(
            schema.to_string(),
        )));
    }

    let candidates = if config.include_all_tables() {
        catalog.list_tables(schema)
    } else {
        catalog.list_tables_with_column(schema, TIMESTAMP_COLUMN)
    }
    .map_err(metadata_error)?;
    debug!("Catalog returned {} table rows", candidates.len());

    let mut seen = HashSet::new();
    let tables: Vec<TableRef> = candidates
        .into_iter()
        .filter(|table| seen.insert(table.clone()))
        .collect();

    info!(
        "Selected {} tables in schema {} ({})",
        tables.len(),
        schema,
        if config.include_all_tables() {
            "all tables"
        } else {
            "tables with created_at"
        }
    );
    Ok(tables)
}
