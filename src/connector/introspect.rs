//! Schema introspection.
//!
//! Every connector reports its schema the same way: reset whatever schema
//! cache the backend keeps, list tables, then list the columns of each
//! table. [`collect_schema`] drives that walk over a [`CatalogSession`] and
//! normalizes the result into [`TableColumnMetadata`] rows.

use serde::{Deserialize, Serialize};

use super::ConnectorResult;

/// One column of one table, as reported to clients.
///
/// Catalog, schema and table names are wrapped in double quotes so they can
/// be pasted into SQL unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumnMetadata {
    pub table_catalog: String,
    pub table_schema: String,
    pub table_name: String,
    pub column_name: String,
    /// 1-based.
    pub ordinal_position: u32,
    pub is_nullable: bool,
    /// Native type string as the backend reports it.
    pub data_type: String,
}

/// A table as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    pub catalog: String,
    pub schema: String,
    pub name: String,
}

/// A column as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumn {
    pub name: String,
    /// 1-based.
    pub ordinal: u32,
    pub nullable: bool,
    pub data_type: String,
}

/// An open connection able to enumerate catalog objects.
pub trait CatalogSession {
    /// Drop cached schema information so the listing reflects recent DDL.
    fn reset_schema_cache(&mut self) -> ConnectorResult<()>;

    fn tables(&mut self) -> ConnectorResult<Vec<TableName>>;

    fn columns(&mut self, table: &TableName) -> ConnectorResult<Vec<SourceColumn>>;
}

/// Walk every table and column. Any failure aborts the whole walk.
pub fn collect_schema(session: &mut dyn CatalogSession) -> ConnectorResult<Vec<TableColumnMetadata>> {
    session.reset_schema_cache()?;

    let mut rows = Vec::new();
    for table in session.tables()? {
        let columns = session.columns(&table)?;
        tracing::debug!(table = %table.name, columns = columns.len(), "introspected table");
        rows.extend(columns.into_iter().map(|column| TableColumnMetadata {
            table_catalog: quote(&table.catalog),
            table_schema: quote(&table.schema),
            table_name: quote(&table.name),
            column_name: column.name,
            ordinal_position: column.ordinal,
            is_nullable: column.nullable,
            data_type: column.data_type,
        }));
    }
    Ok(rows)
}

fn quote(name: &str) -> String {
    format!("\"{name}\"")
}
