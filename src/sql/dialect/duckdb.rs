//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible with extensions:
//! - ANSI identifier quoting (`"`)
//! - 1-based lists with `arr[i]` access
//! - ANY_VALUE aggregate
//! - HUGEINT-free canonical mapping (BIGINT is the widest integer emitted)

use super::helpers;
use super::SqlDialect;
use crate::sql::types::CanonicalType;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_duckdb(name)
    }

    fn scalar_type_name(&self, ty: CanonicalType) -> &'static str {
        match ty {
            CanonicalType::Bool => "BOOLEAN",
            CanonicalType::Int8 => "TINYINT",
            CanonicalType::Int16 => "SMALLINT",
            CanonicalType::Int32 => "INTEGER",
            CanonicalType::Int64 => "BIGINT",
            CanonicalType::Float32 => "REAL",
            CanonicalType::Float64 => "DOUBLE",
            CanonicalType::Decimal => "DECIMAL",
            CanonicalType::Char | CanonicalType::Varchar => "VARCHAR",
            CanonicalType::Binary | CanonicalType::Varbinary => "BLOB",
            CanonicalType::Date => "DATE",
            CanonicalType::Time => "TIME",
            CanonicalType::Timestamp => "TIMESTAMP",
            CanonicalType::TimestampTz => "TIMESTAMPTZ",
            CanonicalType::Json => "JSON",
            CanonicalType::Uuid => "UUID",
        }
    }
}
