//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features:
//! - ANSI identifier quoting (`"`)
//! - Native boolean type (true/false)
//! - 1-based arrays with `arr[i]` access
//! - No ANY_VALUE before version 16, so single-row reductions use MAX

use super::helpers;
use super::{ArrayLiteralStyle, SqlDialect};
use crate::sql::types::CanonicalType;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_postgres(name)
    }

    fn array_literal_style(&self) -> ArrayLiteralStyle {
        ArrayLiteralStyle::ArrayKeyword
    }

    fn single_value_builtin(&self) -> &'static str {
        "MAX"
    }

    fn scalar_type_name(&self, ty: CanonicalType) -> &'static str {
        match ty {
            CanonicalType::Bool => "BOOLEAN",
            // Postgres has no one-byte integer.
            CanonicalType::Int8 | CanonicalType::Int16 => "SMALLINT",
            CanonicalType::Int32 => "INTEGER",
            CanonicalType::Int64 => "BIGINT",
            CanonicalType::Float32 => "REAL",
            CanonicalType::Float64 => "DOUBLE PRECISION",
            CanonicalType::Decimal => "NUMERIC",
            CanonicalType::Char => "CHAR",
            CanonicalType::Varchar => "VARCHAR",
            CanonicalType::Binary | CanonicalType::Varbinary => "BYTEA",
            CanonicalType::Date => "DATE",
            CanonicalType::Time => "TIME",
            CanonicalType::Timestamp => "TIMESTAMP",
            CanonicalType::TimestampTz => "TIMESTAMPTZ",
            CanonicalType::Json => "JSONB",
            CanonicalType::Uuid => "UUID",
        }
    }
}
