//! Snowflake SQL dialect.
//!
//! Snowflake features:
//! - ANSI identifier quoting (`"`); unquoted names fold to upper case
//! - NUMBER as the single fixed-point family
//! - 0-based ARRAY element access
//! - FLATTEN instead of UNNEST
//! - VARIANT type for semi-structured data

use super::helpers;
use super::{ArrayIndexStyle, ArrayLiteralStyle, SqlDialect};
use crate::sql::types::CanonicalType;

/// Snowflake SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Snowflake;

impl SqlDialect for Snowflake {
    fn name(&self) -> &'static str {
        "snowflake"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn fold_unquoted(&self, ident: &str) -> String {
        ident.to_uppercase()
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn supports_unnest(&self) -> bool {
        false
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_snowflake(name)
    }

    fn array_index_style(&self) -> ArrayIndexStyle {
        ArrayIndexStyle::ZeroBasedBracket
    }

    fn array_literal_style(&self) -> ArrayLiteralStyle {
        ArrayLiteralStyle::Function("ARRAY_CONSTRUCT")
    }

    fn scalar_type_name(&self, ty: CanonicalType) -> &'static str {
        match ty {
            CanonicalType::Bool => "BOOLEAN",
            CanonicalType::Int8 => "TINYINT",
            CanonicalType::Int16 => "SMALLINT",
            CanonicalType::Int32 => "INTEGER",
            CanonicalType::Int64 => "BIGINT",
            CanonicalType::Float32 | CanonicalType::Float64 => "DOUBLE",
            CanonicalType::Decimal => "NUMBER",
            CanonicalType::Char => "CHAR",
            CanonicalType::Varchar => "VARCHAR",
            CanonicalType::Binary | CanonicalType::Varbinary => "BINARY",
            CanonicalType::Date => "DATE",
            CanonicalType::Time => "TIME",
            CanonicalType::Timestamp => "TIMESTAMP_NTZ",
            CanonicalType::TimestampTz => "TIMESTAMP_TZ",
            CanonicalType::Json => "VARIANT",
            CanonicalType::Uuid => "VARCHAR",
        }
    }
}
