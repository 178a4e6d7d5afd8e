//! BigQuery SQL dialect.
//!
//! BigQuery features:
//! - Backtick identifier quoting; a leading `$` is escaped as `_$`
//! - INT64/FLOAT64/NUMERIC/BIGNUMERIC type family
//! - `ARRAY<T>` nested types and `arr[ORDINAL(i)]` element access
//! - `DATE_TRUNC(expr, PART)` with the date part as a bare word

use super::helpers;
use super::{ArrayIndexStyle, DateTruncStyle, SqlDialect};
use crate::sql::error::EmitResult;
use crate::sql::types::{CanonicalType, DataType};

/// BigQuery SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct BigQuery;

impl SqlDialect for BigQuery {
    fn name(&self) -> &'static str {
        "bigquery"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick_escaping_sentinel(ident)
    }

    // Table names are case-sensitive, so names keep the case they were written in.
    fn fold_unquoted(&self, ident: &str) -> String {
        ident.to_string()
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_bigquery(name)
    }

    fn array_index_style(&self) -> ArrayIndexStyle {
        ArrayIndexStyle::Ordinal
    }

    fn date_trunc_style(&self) -> DateTruncStyle {
        DateTruncStyle::UnitLastBareWord
    }

    fn scalar_type_name(&self, ty: CanonicalType) -> &'static str {
        match ty {
            CanonicalType::Bool => "BOOL",
            CanonicalType::Int8
            | CanonicalType::Int16
            | CanonicalType::Int32
            | CanonicalType::Int64 => "INT64",
            CanonicalType::Float32 | CanonicalType::Float64 => "FLOAT64",
            CanonicalType::Decimal => "NUMERIC",
            CanonicalType::Char | CanonicalType::Varchar => "STRING",
            CanonicalType::Binary | CanonicalType::Varbinary => "BYTES",
            CanonicalType::Date => "DATE",
            CanonicalType::Time => "TIME",
            CanonicalType::Timestamp | CanonicalType::TimestampTz => "TIMESTAMP",
            CanonicalType::Json => "JSON",
            CanonicalType::Uuid => "STRING",
        }
    }

    fn emit_data_type(&self, dt: &DataType) -> EmitResult<String> {
        helpers::emit_data_type_bigquery(self, dt)
    }
}
