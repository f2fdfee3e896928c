use serde::Serialize;
use std::fmt;

/// Rendered in place of a representative value that is absent or null.
pub const NULL_DISPLAY: &str = "Null";

/// A schema, table or column name as read back from the schema catalog.
///
/// Only the catalog adapters construct these, so every identifier that ends up
/// interpolated into a probe query has come out of the database's own metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub(crate) fn from_catalog(name: impl Into<String>) -> Self {
        Identifier(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form, with embedded quotes doubled.
    pub(crate) fn quoted(&self) -> String {
        quote_identifier(&self.0)
    }
}

pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A table within a scanned schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableRef {
    pub schema: Identifier,
    pub name: Identifier,
}

impl TableRef {
    pub(crate) fn from_catalog(schema: impl Into<String>, name: impl Into<String>) -> Self {
        TableRef {
            schema: Identifier::from_catalog(schema),
            name: Identifier::from_catalog(name),
        }
    }

    /// `"schema"."table"`, ready to go into a FROM clause.
    pub(crate) fn qualified(&self) -> String {
        format!("{}.{}", self.schema.quoted(), self.name.quoted())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: TableRef,
    pub name: Identifier,
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

/// Result of probing one column under the scan window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnStats {
    /// Distinct non-null values seen under the filter.
    pub distinct_count: u64,
    /// Null flag of the representative row.
    pub is_null: bool,
    /// Raw value of the representative row, as text.
    pub sample_value: Option<String>,
}

impl ColumnStats {
    /// A column is dead when it holds at most one distinct non-null value.
    pub fn is_dead(&self) -> bool {
        self.distinct_count == 0 || self.distinct_count == 1
    }

    pub fn display_value(&self) -> String {
        if self.is_null {
            return NULL_DISPLAY.to_string();
        }
        self.sample_value
            .clone()
            .unwrap_or_else(|| NULL_DISPLAY.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadColumnFinding {
    pub table: TableRef,
    pub column: Identifier,
    pub distinct_count: u64,
    pub display_value: String,
}

impl DeadColumnFinding {
    pub fn new(column: &ColumnRef, stats: &ColumnStats) -> Self {
        DeadColumnFinding {
            table: column.table.clone(),
            column: column.name.clone(),
            distinct_count: stats.distinct_count,
            display_value: stats.display_value(),
        }
    }
}

/// Columns of one table, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumns {
    pub table: TableRef,
    pub columns: Vec<Identifier>,
}

/// Columns grouped by schema then table, in the order they were discovered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnsByTable {
    tables: Vec<TableColumns>,
}

impl ColumnsByTable {
    /// Appends a table's columns. A table seen before keeps its position and
    /// gets the new columns appended to its list.
    pub fn push(&mut self, table: TableRef, columns: Vec<Identifier>) {
        match self.tables.iter_mut().find(|entry| entry.table == table) {
            Some(entry) => entry.columns.extend(columns),
            None => {
                // Keep schemas contiguous: insert after the last table of the same schema.
                let position = self
                    .tables
                    .iter()
                    .rposition(|entry| entry.table.schema == table.schema)
                    .map(|index| index + 1)
                    .unwrap_or(self.tables.len());
                self.tables.insert(position, TableColumns { table, columns });
            }
        }
    }

    pub fn tables(&self) -> &[TableColumns] {
        &self.tables
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn total_columns(&self) -> usize {
        self.tables.iter().map(|entry| entry.columns.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Every column, schema by schema, table by table, in catalog column order.
    pub fn columns(&self) -> impl Iterator<Item = ColumnRef> + '_ {
        self.tables.iter().flat_map(|entry| {
            entry.columns.iter().map(move |name| ColumnRef {
                table: entry.table.clone(),
                name: name.clone(),
            })
        })
    }
}

/// Findings of a completed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Caller-facing description of the scanned window, e.g. "In the past 6 months".
    pub window_label: String,
    pub tables_scanned: usize,
    pub columns_probed: usize,
    findings: Vec<DeadColumnFinding>,
}

pub struct TableGroup<'a> {
    pub table: &'a TableRef,
    pub findings: Vec<&'a DeadColumnFinding>,
}

pub struct SchemaGroup<'a> {
    pub schema: &'a Identifier,
    pub tables: Vec<TableGroup<'a>>,
}

impl ScanReport {
    pub fn new(
        window_label: impl Into<String>,
        tables_scanned: usize,
        columns_probed: usize,
        findings: Vec<DeadColumnFinding>,
    ) -> Self {
        ScanReport {
            window_label: window_label.into(),
            tables_scanned,
            columns_probed,
            findings,
        }
    }

    pub fn findings(&self) -> &[DeadColumnFinding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings grouped by schema, then table, in insertion order.
    pub fn groups(&self) -> Vec<SchemaGroup<'_>> {
        let mut groups: Vec<SchemaGroup<'_>> = Vec::new();

        for finding in &self.findings {
            let schema_index = match groups
                .iter()
                .position(|group| *group.schema == finding.table.schema)
            {
                Some(index) => index,
                None => {
                    groups.push(SchemaGroup {
                        schema: &finding.table.schema,
                        tables: Vec::new(),
                    });
                    groups.len() - 1
                }
            };

            let tables = &mut groups[schema_index].tables;
            match tables.iter_mut().find(|group| *group.table == finding.table) {
                Some(group) => group.findings.push(finding),
                None => tables.push(TableGroup {
                    table: &finding.table,
                    findings: vec![finding],
                }),
            }
        }

        groups
    }
}

#[cfg(test)]
pub(crate) fn test_table(schema: &str, name: &str) -> TableRef {
    TableRef::from_catalog(schema, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(schema: &str, table: &str, name: &str) -> ColumnRef {
        ColumnRef {
            table: test_table(schema, table),
            name: Identifier::from_catalog(name),
        }
    }

    #[test]
    fn test_dead_predicate() {
        let stats = |distinct_count| ColumnStats {
            distinct_count,
            is_null: false,
            sample_value: Some("x".to_string()),
        };
        assert!(stats(0).is_dead());
        assert!(stats(1).is_dead());
        assert!(!stats(2).is_dead());
        assert!(!stats(40).is_dead());
    }

    #[test]
    fn test_display_value() {
        let null_row = ColumnStats {
            distinct_count: 0,
            is_null: true,
            sample_value: None,
        };
        assert_eq!(null_row.display_value(), "Null");

        let constant = ColumnStats {
            distinct_count: 1,
            is_null: false,
            sample_value: Some("paid".to_string()),
        };
        assert_eq!(constant.display_value(), "paid");

        // Null flag wins over whatever value the driver handed back.
        let flagged = ColumnStats {
            distinct_count: 0,
            is_null: true,
            sample_value: Some("".to_string()),
        };
        assert_eq!(flagged.display_value(), "Null");
    }

    #[test]
    fn test_quoting_doubles_embedded_quotes() {
        assert_eq!(quote_identifier("orders"), "\"orders\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(test_table("shop", "orders").qualified(), "\"shop\".\"orders\"");
    }

    #[test]
    fn test_columns_by_table_merges_and_counts() {
        let mut grouped = ColumnsByTable::default();
        grouped.push(
            test_table("shop", "orders"),
            vec![Identifier::from_catalog("id"), Identifier::from_catalog("status")],
        );
        grouped.push(test_table("shop", "empty"), vec![]);
        grouped.push(
            test_table("shop", "orders"),
            vec![Identifier::from_catalog("amount")],
        );

        assert_eq!(grouped.table_count(), 2);
        assert_eq!(grouped.total_columns(), 3);

        let names: Vec<String> = grouped.columns().map(|c| c.to_string()).collect();
        assert_eq!(
            names,
            vec!["shop.orders.id", "shop.orders.status", "shop.orders.amount"]
        );
    }

    #[test]
    fn test_columns_by_table_keeps_schemas_contiguous() {
        let mut grouped = ColumnsByTable::default();
        grouped.push(test_table("a", "t1"), vec![]);
        grouped.push(test_table("b", "t2"), vec![]);
        grouped.push(test_table("a", "t3"), vec![]);

        let order: Vec<String> = grouped
            .tables()
            .iter()
            .map(|entry| entry.table.to_string())
            .collect();
        assert_eq!(order, vec!["a.t1", "a.t3", "b.t2"]);
    }

    #[test]
    fn test_report_groups_in_insertion_order() {
        let dead = ColumnStats {
            distinct_count: 1,
            is_null: false,
            sample_value: Some("v".to_string()),
        };
        let findings = vec![
            DeadColumnFinding::new(&column("shop", "users", "flag"), &dead),
            DeadColumnFinding::new(&column("shop", "orders", "status"), &dead),
            DeadColumnFinding::new(&column("shop", "users", "legacy"), &dead),
        ];
        let report = ScanReport::new("In the past 6 months", 2, 10, findings);

        let groups = report.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].schema.as_str(), "shop");

        let tables: Vec<(&str, usize)> = groups[0]
            .tables
            .iter()
            .map(|group| (group.table.name.as_str(), group.findings.len()))
            .collect();
        assert_eq!(tables, vec![("users", 2), ("orders", 1)]);
    }
}
