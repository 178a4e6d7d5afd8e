//! SQLite SQL dialect.
//!
//! SQLite is dynamically typed; type names only select a column affinity.
//! - ANSI identifier quoting (`"`)
//! - Booleans are integers (1/0)
//! - No arrays, no UNNEST, no FULL OUTER JOIN (before 3.39)
//! - No ANY_VALUE, so single-row reductions use MAX

use super::helpers;
use super::{ArrayIndexStyle, ArrayLiteralStyle, SqlDialect};
use crate::sql::types::CanonicalType;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn supports_full_outer_join(&self) -> bool {
        false
    }

    fn supports_unnest(&self) -> bool {
        false
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_sqlite(name)
    }

    fn array_index_style(&self) -> ArrayIndexStyle {
        ArrayIndexStyle::Unsupported
    }

    fn array_literal_style(&self) -> ArrayLiteralStyle {
        ArrayLiteralStyle::Unsupported
    }

    fn single_value_builtin(&self) -> &'static str {
        "MAX"
    }

    fn scalar_type_name(&self, ty: CanonicalType) -> &'static str {
        match ty {
            CanonicalType::Bool => "BOOLEAN",
            CanonicalType::Int8
            | CanonicalType::Int16
            | CanonicalType::Int32
            | CanonicalType::Int64 => "INTEGER",
            CanonicalType::Float32 | CanonicalType::Float64 => "REAL",
            CanonicalType::Decimal => "NUMERIC",
            CanonicalType::Char | CanonicalType::Varchar => "TEXT",
            CanonicalType::Binary | CanonicalType::Varbinary => "BLOB",
            CanonicalType::Date => "DATE",
            CanonicalType::Time => "TIME",
            CanonicalType::Timestamp | CanonicalType::TimestampTz => "TIMESTAMP",
            CanonicalType::Json => "TEXT",
            CanonicalType::Uuid => "TEXT",
        }
    }
}
