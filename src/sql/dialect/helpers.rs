//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use super::SqlDialect;
use crate::sql::error::{EmitError, EmitResult};
use crate::sql::types::{CanonicalType, DataType};

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB, Snowflake, SQLite
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: BigQuery
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Prefix identifiers that start with `$` so the result is legal on
/// backends that reject a leading `$`, then quote with backticks.
/// Used by: BigQuery
pub fn quote_backtick_escaping_sentinel(ident: &str) -> String {
    if ident.starts_with('$') {
        quote_backtick(&format!("_{}", ident))
    } else {
        quote_backtick(ident)
    }
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Boolean Formatting
// =============================================================================

/// Format boolean as literal true/false.
/// Used by: Postgres, DuckDB, Snowflake, BigQuery
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Format boolean as numeric 1/0.
/// Used by: SQLite
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

// =============================================================================
// Function Remapping
// =============================================================================
//
// Only exact two-argument synonyms of COALESCE are renamed. Calls whose
// argument order or format grammar differ between backends pass through.

/// Remap functions for Postgres dialect.
pub fn remap_function_postgres(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "NVL" | "IFNULL" => Some("COALESCE"),
        _ => None,
    }
}

/// Remap functions for DuckDB dialect.
pub fn remap_function_duckdb(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "NVL" => Some("COALESCE"),
        _ => None,
    }
}

/// Remap functions for Snowflake dialect.
pub fn remap_function_snowflake(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "IFNULL" => Some("NVL"),
        _ => None,
    }
}

/// Remap functions for BigQuery dialect.
pub fn remap_function_bigquery(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "NVL" => Some("IFNULL"),
        _ => None,
    }
}

/// Remap functions for SQLite dialect.
pub fn remap_function_sqlite(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "NVL" => Some("IFNULL"),
        _ => None,
    }
}

// =============================================================================
// Data Type Emission
// =============================================================================

/// Emit a data type in ANSI style: `NUMERIC(p, s)`, `VARCHAR(n)`, `T[]`.
/// Used by: Postgres, DuckDB, Snowflake, SQLite
pub fn emit_data_type_ansi<D: SqlDialect + ?Sized>(
    dialect: &D,
    dt: &DataType,
) -> EmitResult<String> {
    match dt {
        DataType::Scalar(ty) => Ok(dialect.scalar_type_name(*ty).into()),
        DataType::Decimal { precision, scale } => {
            let name = dialect.scalar_type_name(CanonicalType::Decimal);
            Ok(match (precision, scale) {
                (Some(p), Some(s)) => format!("{}({}, {})", name, p, s),
                (Some(p), None) => format!("{}({})", name, p),
                _ => name.into(),
            })
        }
        DataType::Char(len) => Ok(with_length(
            dialect.scalar_type_name(CanonicalType::Char),
            *len,
        )),
        DataType::Varchar(len) => Ok(with_length(
            dialect.scalar_type_name(CanonicalType::Varchar),
            *len,
        )),
        DataType::Array(inner) => Ok(format!("{}[]", emit_data_type_ansi(dialect, inner)?)),
        DataType::Interval(qualifier) => Ok(interval_type(qualifier.as_deref())),
        DataType::Unrecognized(name) => Err(unmapped(dialect, name)),
    }
}

/// Emit a data type for BigQuery.
///
/// Decimals pick `NUMERIC` up to 38 digits of precision and `BIGNUMERIC`
/// above; no parameters are emitted. Arrays use `ARRAY<T>`.
pub fn emit_data_type_bigquery<D: SqlDialect + ?Sized>(
    dialect: &D,
    dt: &DataType,
) -> EmitResult<String> {
    match dt {
        DataType::Scalar(ty) => Ok(dialect.scalar_type_name(*ty).into()),
        DataType::Decimal { precision, .. } => Ok(match precision {
            Some(p) if *p > 38 => "BIGNUMERIC".into(),
            _ => "NUMERIC".into(),
        }),
        DataType::Char(_) | DataType::Varchar(_) => Ok("STRING".into()),
        DataType::Array(inner) => Ok(format!(
            "ARRAY<{}>",
            emit_data_type_bigquery(dialect, inner)?
        )),
        DataType::Interval(qualifier) => Ok(interval_type(qualifier.as_deref())),
        DataType::Unrecognized(name) => Err(unmapped(dialect, name)),
    }
}

fn with_length(name: &str, len: Option<u32>) -> String {
    match len {
        Some(n) => format!("{}({})", name, n),
        None => name.into(),
    }
}

fn interval_type(qualifier: Option<&str>) -> String {
    match qualifier {
        Some(q) => format!("INTERVAL {}", q),
        None => "INTERVAL".into(),
    }
}

fn unmapped<D: SqlDialect + ?Sized>(dialect: &D, name: &str) -> EmitError {
    EmitError::UnmappedType {
        dialect: dialect.name(),
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_helpers() {
        assert_eq!(quote_double("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_backtick("a`b"), "`a``b`");
        assert_eq!(quote_backtick_escaping_sentinel("$col"), "`_$col`");
        assert_eq!(quote_backtick_escaping_sentinel("col$"), "`col$`");
        assert_eq!(quote_string_single("it's"), "'it''s'");
    }

    #[test]
    fn test_only_coalesce_synonyms_are_remapped() {
        assert_eq!(remap_function_postgres("nvl"), Some("COALESCE"));
        assert_eq!(remap_function_bigquery("NVL"), Some("IFNULL"));
        for name in ["TO_CHAR", "STRFTIME", "DATE_FORMAT", "LENGTH", "CHAR_LENGTH", "ISNULL"] {
            assert_eq!(remap_function_postgres(name), None, "{}", name);
            assert_eq!(remap_function_duckdb(name), None, "{}", name);
            assert_eq!(remap_function_snowflake(name), None, "{}", name);
            assert_eq!(remap_function_bigquery(name), None, "{}", name);
            assert_eq!(remap_function_sqlite(name), None, "{}", name);
        }
    }
}
