//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect differences.
//! Each dialect implements `SqlDialect` to handle its specific syntax:
//!
//! - Identifier quoting: `"` (ANSI/PG/DuckDB/Snowflake/SQLite), `` ` `` (BigQuery)
//! - Type names: every canonical type maps to exactly one literal name
//! - Array element access: `arr[i]`, `arr[ORDINAL(i)]`, zero-based shifts
//! - DATE_TRUNC argument order
//! - The builtin used to rewrite `SINGLE_VALUE`
//!
//! # Usage
//!
//! ```ignore
//! use strata::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::BigQuery;
//! let quoted = dialect.quote_identifier("$foo");  // `_$foo`
//! ```
//!
//! # Feature Matrix
//!
//! | Feature | PostgreSQL | DuckDB | Snowflake | BigQuery | SQLite |
//! |---------|-----------|--------|-----------|----------|--------|
//! | Array index base | 1 | 1 | 0 | ORDINAL (1) | ❌ |
//! | UNNEST | ✓ | ✓ | ❌ (FLATTEN) | ✓ | ❌ |
//! | FULL OUTER JOIN | ✓ | ✓ | ✓ | ✓ | ❌ |
//! | ANY_VALUE | ❌ (MAX) | ✓ | ✓ | ✓ | ❌ (MAX) |
//!
//! Legend: ✓ = supported, ❌ = not supported

mod bigquery;
mod duckdb;
pub mod helpers;
mod postgres;
mod snowflake;
mod sqlite;

pub use bigquery::BigQuery;
pub use duckdb::DuckDb;
pub use postgres::Postgres;
pub use snowflake::Snowflake;
pub use sqlite::Sqlite;

use serde::{Deserialize, Serialize};

use super::error::{EmitError, EmitResult};
use super::types::{CanonicalType, DataType};

/// How a dialect renders element access on an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayIndexStyle {
    /// `arr[i]` with 1-based indices.
    OneBasedBracket,
    /// `arr[i - 1]`; storage is 0-based.
    ZeroBasedBracket,
    /// `arr[ORDINAL(i)]`.
    Ordinal,
    /// No array support.
    Unsupported,
}

/// How a dialect spells an array constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLiteralStyle {
    /// `[a, b]`
    Bracket,
    /// `ARRAY[a, b]`
    ArrayKeyword,
    /// `NAME(a, b)`
    Function(&'static str),
    /// No array support.
    Unsupported,
}

/// How a dialect orders the operands of `DATE_TRUNC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTruncStyle {
    /// `DATE_TRUNC('month', x)`
    UnitFirst,
    /// `DATE_TRUNC(x, MONTH)`
    UnitLastBareWord,
}

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    ///
    /// - ANSI/PostgreSQL/DuckDB/Snowflake/SQLite: `"identifier"`
    /// - BigQuery: `` `identifier` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// The name an unquoted identifier resolves to on this backend.
    ///
    /// Applied at parse time so that quoting on emission keeps the
    /// resolution the source text had. Quoted identifiers are left alone.
    fn fold_unquoted(&self, ident: &str) -> String {
        ident.to_lowercase()
    }

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str;

    // =========================================================================
    // Operators
    // =========================================================================

    /// String concatenation operator.
    fn concat_operator(&self) -> &'static str {
        "||"
    }

    // =========================================================================
    // JOIN / FROM Syntax
    // =========================================================================

    /// Whether this dialect supports FULL OUTER JOIN.
    fn supports_full_outer_join(&self) -> bool {
        true
    }

    /// Whether this dialect supports `UNNEST(...)` as a relation.
    fn supports_unnest(&self) -> bool {
        true
    }

    // =========================================================================
    // Function Rendering
    // =========================================================================

    /// Remap a function name for this dialect.
    ///
    /// Returns `Some(new_name)` if the function should be remapped, `None` to keep original.
    /// The input is matched case-insensitively.
    fn remap_function(&self, name: &str) -> Option<&'static str> {
        let _ = name;
        None
    }

    /// Array element access rendering.
    fn array_index_style(&self) -> ArrayIndexStyle {
        ArrayIndexStyle::OneBasedBracket
    }

    /// Array constructor rendering.
    fn array_literal_style(&self) -> ArrayLiteralStyle {
        ArrayLiteralStyle::Bracket
    }

    /// Operand order for `DATE_TRUNC`.
    fn date_trunc_style(&self) -> DateTruncStyle {
        DateTruncStyle::UnitFirst
    }

    /// Builtin that returns the single value of a one-row group.
    ///
    /// Used when rewriting `SINGLE_VALUE(x)` into a CASE on `COUNT(*)`.
    fn single_value_builtin(&self) -> &'static str {
        "ANY_VALUE"
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Literal type name for a canonical scalar.
    ///
    /// Implementations match every variant; there is no fallback.
    fn scalar_type_name(&self, ty: CanonicalType) -> &'static str;

    /// Render a data type for CAST.
    ///
    /// - ANSI/PostgreSQL/DuckDB: parameters in parentheses, arrays as `T[]`
    /// - BigQuery overrides this (see `helpers::emit_data_type_bigquery`)
    fn emit_data_type(&self, dt: &DataType) -> EmitResult<String> {
        helpers::emit_data_type_ansi(self, dt)
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    DuckDb,
    Postgres,
    Snowflake,
    BigQuery,
    Sqlite,
}

impl Dialect {
    /// Every dialect.
    pub const ALL: [Dialect; 5] = [
        Dialect::DuckDb,
        Dialect::Postgres,
        Dialect::Snowflake,
        Dialect::BigQuery,
        Dialect::Sqlite,
    ];

    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::DuckDb => &DuckDb,
            Dialect::Postgres => &Postgres,
            Dialect::Snowflake => &Snowflake,
            Dialect::BigQuery => &BigQuery,
            Dialect::Sqlite => &Sqlite,
        }
    }

    /// Parse a dialect name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "duckdb" | "duck" => Some(Dialect::DuckDb),
            "postgres" | "postgresql" | "pg" => Some(Dialect::Postgres),
            "snowflake" => Some(Dialect::Snowflake),
            "bigquery" | "bq" => Some(Dialect::BigQuery),
            "sqlite" => Some(Dialect::Sqlite),
            _ => None,
        }
    }

    /// Build the error for a construct this dialect cannot express.
    pub fn unsupported(&self, detail: impl Into<String>) -> EmitError {
        EmitError::Unsupported {
            dialect: self.name(),
            detail: detail.into(),
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn fold_unquoted(&self, ident: &str) -> String {
        self.dialect().fold_unquoted(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn concat_operator(&self) -> &'static str {
        self.dialect().concat_operator()
    }

    fn supports_full_outer_join(&self) -> bool {
        self.dialect().supports_full_outer_join()
    }

    fn supports_unnest(&self) -> bool {
        self.dialect().supports_unnest()
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        self.dialect().remap_function(name)
    }

    fn array_index_style(&self) -> ArrayIndexStyle {
        self.dialect().array_index_style()
    }

    fn array_literal_style(&self) -> ArrayLiteralStyle {
        self.dialect().array_literal_style()
    }

    fn date_trunc_style(&self) -> DateTruncStyle {
        self.dialect().date_trunc_style()
    }

    fn single_value_builtin(&self) -> &'static str {
        self.dialect().single_value_builtin()
    }

    fn scalar_type_name(&self, ty: CanonicalType) -> &'static str {
        self.dialect().scalar_type_name(ty)
    }

    fn emit_data_type(&self, dt: &DataType) -> EmitResult<String> {
        self.dialect().emit_data_type(dt)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_display() {
        assert_eq!(Dialect::DuckDb.to_string(), "duckdb");
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
        assert_eq!(Dialect::BigQuery.to_string(), "bigquery");
        assert_eq!(Dialect::Sqlite.to_string(), "sqlite");
    }

    #[test]
    fn test_from_str_round_trips_names() {
        for dialect in Dialect::ALL {
            assert_eq!(Dialect::from_str(dialect.name()), Some(dialect));
        }
        assert_eq!(Dialect::from_str("PG"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_str("oracle"), None);
    }

    #[test]
    fn test_unquoted_identifier_folding() {
        assert_eq!(Dialect::Postgres.fold_unquoted("UserId"), "userid");
        assert_eq!(Dialect::DuckDb.fold_unquoted("Users"), "users");
        assert_eq!(Dialect::Sqlite.fold_unquoted("Users"), "users");
        assert_eq!(Dialect::Snowflake.fold_unquoted("users"), "USERS");
        assert_eq!(Dialect::BigQuery.fold_unquoted("MyTable"), "MyTable");
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(Dialect::DuckDb.quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::Postgres.quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::Snowflake.quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::BigQuery.quote_identifier("users"), "`users`");
    }

    #[test]
    fn test_quote_identifier_escaping() {
        assert_eq!(
            Dialect::Postgres.quote_identifier("my\"table"),
            "\"my\"\"table\""
        );
        assert_eq!(Dialect::BigQuery.quote_identifier("my`table"), "`my``table`");
    }

    #[test]
    fn test_bigquery_escapes_leading_dollar() {
        assert_eq!(Dialect::BigQuery.quote_identifier("$foo"), "`_$foo`");
        assert_eq!(Dialect::BigQuery.quote_identifier("a$b"), "`a$b`");
        // Other dialects accept the sentinel inside quotes.
        assert_eq!(Dialect::Postgres.quote_identifier("$foo"), "\"$foo\"");
    }

    #[test]
    fn test_format_bool() {
        assert_eq!(Dialect::Postgres.format_bool(true), "true");
        assert_eq!(Dialect::BigQuery.format_bool(false), "false");
        assert_eq!(Dialect::Sqlite.format_bool(true), "1");
    }

    #[test]
    fn test_scalar_type_name_is_total() {
        for dialect in Dialect::ALL {
            for ty in CanonicalType::ALL {
                let name = dialect.scalar_type_name(ty);
                assert!(!name.is_empty(), "{} has no name for {:?}", dialect, ty);
                assert!(dialect.emit_data_type(&DataType::scalar(ty)).is_ok());
            }
        }
    }

    #[test]
    fn test_bigquery_type_names() {
        let bq = Dialect::BigQuery;
        for ty in [
            CanonicalType::Int8,
            CanonicalType::Int16,
            CanonicalType::Int32,
            CanonicalType::Int64,
        ] {
            assert_eq!(bq.scalar_type_name(ty), "INT64");
        }
        assert_eq!(bq.scalar_type_name(CanonicalType::Float32), "FLOAT64");
        assert_eq!(bq.scalar_type_name(CanonicalType::Float64), "FLOAT64");
        assert_eq!(bq.scalar_type_name(CanonicalType::Bool), "BOOL");
        assert_eq!(bq.scalar_type_name(CanonicalType::Char), "STRING");
        assert_eq!(bq.scalar_type_name(CanonicalType::Varchar), "STRING");
        assert_eq!(bq.scalar_type_name(CanonicalType::Binary), "BYTES");
        assert_eq!(bq.scalar_type_name(CanonicalType::Varbinary), "BYTES");
        assert_eq!(bq.scalar_type_name(CanonicalType::Date), "DATE");
        assert_eq!(bq.scalar_type_name(CanonicalType::Time), "TIME");
        assert_eq!(bq.scalar_type_name(CanonicalType::Timestamp), "TIMESTAMP");
    }

    #[test]
    fn test_bigquery_numeric_precision_threshold() {
        let bq = Dialect::BigQuery;
        assert_eq!(bq.emit_data_type(&DataType::decimal(38, 9)).unwrap(), "NUMERIC");
        assert_eq!(bq.emit_data_type(&DataType::decimal(39, 9)).unwrap(), "BIGNUMERIC");
        assert_eq!(
            bq.emit_data_type(&DataType::scalar(CanonicalType::Decimal)).unwrap(),
            "NUMERIC"
        );
    }

    #[test]
    fn test_nested_types_use_angle_brackets_on_bigquery() {
        let nested = DataType::array(DataType::array(DataType::Scalar(CanonicalType::Int32)));
        assert_eq!(
            Dialect::BigQuery.emit_data_type(&nested).unwrap(),
            "ARRAY<ARRAY<INT64>>"
        );
        assert_eq!(
            Dialect::Postgres.emit_data_type(&nested).unwrap(),
            "INTEGER[][]"
        );
    }

    #[test]
    fn test_interval_type_keeps_keyword() {
        let interval = DataType::Interval(Some("DAY".into()));
        assert_eq!(
            Dialect::BigQuery.emit_data_type(&interval).unwrap(),
            "INTERVAL DAY"
        );
        assert_eq!(
            Dialect::Postgres.emit_data_type(&DataType::Interval(None)).unwrap(),
            "INTERVAL"
        );
    }

    #[test]
    fn test_unrecognized_type_fails() {
        let err = Dialect::BigQuery
            .emit_data_type(&DataType::Unrecognized("GEOMETRY".into()))
            .unwrap_err();
        assert_eq!(
            err,
            EmitError::UnmappedType {
                dialect: "bigquery",
                name: "GEOMETRY".into()
            }
        );
    }

    #[test]
    fn test_remap_function() {
        assert_eq!(Dialect::Postgres.remap_function("ifnull"), Some("COALESCE"));
        assert_eq!(Dialect::Snowflake.remap_function("IFNULL"), Some("NVL"));
        assert_eq!(Dialect::BigQuery.remap_function("nvl"), Some("IFNULL"));
        assert_eq!(Dialect::BigQuery.remap_function("LENGTH"), None);
        assert_eq!(Dialect::Sqlite.remap_function("nvl"), Some("IFNULL"));
        assert_eq!(Dialect::DuckDb.remap_function("sum"), None);
    }

    #[test]
    fn test_dialect_capabilities() {
        assert_eq!(
            Dialect::BigQuery.array_index_style(),
            ArrayIndexStyle::Ordinal
        );
        assert_eq!(
            Dialect::Snowflake.array_index_style(),
            ArrayIndexStyle::ZeroBasedBracket
        );
        assert_eq!(
            Dialect::Sqlite.array_index_style(),
            ArrayIndexStyle::Unsupported
        );
        assert_eq!(
            Dialect::BigQuery.date_trunc_style(),
            DateTruncStyle::UnitLastBareWord
        );
        assert_eq!(Dialect::Postgres.single_value_builtin(), "MAX");
        assert_eq!(Dialect::BigQuery.single_value_builtin(), "ANY_VALUE");
        assert!(!Dialect::Sqlite.supports_full_outer_join());
        assert!(!Dialect::Snowflake.supports_unnest());
    }
}
