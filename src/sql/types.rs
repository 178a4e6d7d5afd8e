//! Canonical column types and the data types carried by CAST expressions.
//!
//! [`CanonicalType`] is the wire-level scalar vocabulary shared by every
//! backend: connector registries map native type names onto it and the
//! dialect emitters map it back onto literal type names.
//!
//! [`DataType`] is what a CAST in the canonical query tree refers to. It adds
//! the modifiers a scalar can carry (decimal precision/scale, character
//! length) plus arrays and intervals. Types the parser cannot classify are
//! kept as [`DataType::Unrecognized`] so emission can reject them with the
//! original name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical wire-level scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalType {
    Bool,
    /// TINYINT
    Int8,
    /// SMALLINT
    Int16,
    /// INTEGER
    Int32,
    /// BIGINT
    Int64,
    /// REAL
    Float32,
    /// DOUBLE PRECISION
    Float64,
    /// Fixed-point numeric.
    Decimal,
    Char,
    Varchar,
    Binary,
    Varbinary,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
    Uuid,
}

impl CanonicalType {
    /// Every canonical type, in declaration order.
    pub const ALL: [CanonicalType; 18] = [
        CanonicalType::Bool,
        CanonicalType::Int8,
        CanonicalType::Int16,
        CanonicalType::Int32,
        CanonicalType::Int64,
        CanonicalType::Float32,
        CanonicalType::Float64,
        CanonicalType::Decimal,
        CanonicalType::Char,
        CanonicalType::Varchar,
        CanonicalType::Binary,
        CanonicalType::Varbinary,
        CanonicalType::Date,
        CanonicalType::Time,
        CanonicalType::Timestamp,
        CanonicalType::TimestampTz,
        CanonicalType::Json,
        CanonicalType::Uuid,
    ];

    /// Returns true for the integer family.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            CanonicalType::Int8 | CanonicalType::Int16 | CanonicalType::Int32 | CanonicalType::Int64
        )
    }

    /// Returns true for floating point types.
    pub fn is_float(&self) -> bool {
        matches!(self, CanonicalType::Float32 | CanonicalType::Float64)
    }

    /// Returns true if this is a numeric type.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float() || *self == CanonicalType::Decimal
    }

    /// Returns true if this is a string type.
    pub fn is_string(&self) -> bool {
        matches!(self, CanonicalType::Char | CanonicalType::Varchar)
    }

    /// Returns true if this is a temporal (date/time) type.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            CanonicalType::Date
                | CanonicalType::Time
                | CanonicalType::Timestamp
                | CanonicalType::TimestampTz
        )
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CanonicalType::Bool => "BOOLEAN",
            CanonicalType::Int8 => "TINYINT",
            CanonicalType::Int16 => "SMALLINT",
            CanonicalType::Int32 => "INTEGER",
            CanonicalType::Int64 => "BIGINT",
            CanonicalType::Float32 => "REAL",
            CanonicalType::Float64 => "DOUBLE PRECISION",
            CanonicalType::Decimal => "NUMERIC",
            CanonicalType::Char => "CHAR",
            CanonicalType::Varchar => "VARCHAR",
            CanonicalType::Binary => "BINARY",
            CanonicalType::Varbinary => "VARBINARY",
            CanonicalType::Date => "DATE",
            CanonicalType::Time => "TIME",
            CanonicalType::Timestamp => "TIMESTAMP",
            CanonicalType::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            CanonicalType::Json => "JSON",
            CanonicalType::Uuid => "UUID",
        };
        f.write_str(name)
    }
}

/// Data type referenced by a CAST in the canonical query tree.
///
/// # Examples
///
/// ```ignore
/// use strata::sql::types::{CanonicalType, DataType};
///
/// assert_eq!(DataType::parse("bigint"), DataType::Scalar(CanonicalType::Int64));
/// assert_eq!(
///     DataType::parse("decimal(10,2)"),
///     DataType::Decimal { precision: Some(10), scale: Some(2) }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// A scalar without modifiers.
    Scalar(CanonicalType),

    /// Fixed-point numeric with optional precision and scale.
    Decimal {
        precision: Option<u32>,
        scale: Option<u32>,
    },

    /// Fixed-length character string.
    Char(Option<u32>),

    /// Variable-length character string.
    Varchar(Option<u32>),

    /// Array of an element type.
    Array(Box<DataType>),

    /// Interval with an optional qualifier such as `DAY` or `YEAR TO MONTH`.
    Interval(Option<String>),

    /// A type name nothing maps; emission fails on it.
    Unrecognized(String),
}

impl DataType {
    /// Wrap a canonical type, normalizing the parameterized kinds.
    pub fn scalar(ty: CanonicalType) -> Self {
        match ty {
            CanonicalType::Decimal => DataType::Decimal {
                precision: None,
                scale: None,
            },
            CanonicalType::Char => DataType::Char(None),
            CanonicalType::Varchar => DataType::Varchar(None),
            other => DataType::Scalar(other),
        }
    }

    /// Fixed-point numeric with explicit precision and scale.
    pub fn decimal(precision: u32, scale: u32) -> Self {
        DataType::Decimal {
            precision: Some(precision),
            scale: Some(scale),
        }
    }

    /// Array of the given element type.
    pub fn array(element: DataType) -> Self {
        DataType::Array(Box::new(element))
    }

    /// The canonical type this data type carries, if it is a scalar.
    pub fn canonical(&self) -> Option<CanonicalType> {
        match self {
            DataType::Scalar(ty) => Some(*ty),
            DataType::Decimal { .. } => Some(CanonicalType::Decimal),
            DataType::Char(_) => Some(CanonicalType::Char),
            DataType::Varchar(_) => Some(CanonicalType::Varchar),
            DataType::Array(_) | DataType::Interval(_) | DataType::Unrecognized(_) => None,
        }
    }

    /// Parse a SQL type name.
    ///
    /// Accepts the usual ANSI, Postgres, BigQuery and DuckDB spellings,
    /// `decimal(p, s)`, `varchar(n)`, `char(n)`, `T[]`, `ARRAY<T>` and
    /// `INTERVAL [qualifier]`. Anything else comes back as
    /// [`DataType::Unrecognized`] carrying the input.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();

        if let Some(elem) = lower.strip_suffix("[]") {
            return DataType::array(DataType::parse(elem));
        }
        if let Some(inner) = extract_angle(&lower, "array") {
            return DataType::array(DataType::parse(&inner));
        }
        if lower == "interval" {
            return DataType::Interval(None);
        }
        if let Some(qualifier) = lower.strip_prefix("interval ") {
            return DataType::Interval(Some(qualifier.trim().to_uppercase()));
        }

        if let Some(inner) = extract_parens(&lower, "decimal")
            .or_else(|| extract_parens(&lower, "numeric"))
            .or_else(|| extract_parens(&lower, "number"))
            .or_else(|| extract_parens(&lower, "bignumeric"))
        {
            return parse_decimal_params(&inner)
                .unwrap_or_else(|| DataType::Unrecognized(trimmed.to_string()));
        }

        if let Some(inner) = extract_parens(&lower, "varchar")
            .or_else(|| extract_parens(&lower, "character varying"))
            .or_else(|| extract_parens(&lower, "nvarchar"))
        {
            return match parse_length_param(&inner) {
                Some(n) => DataType::Varchar(Some(n)),
                None => DataType::Unrecognized(trimmed.to_string()),
            };
        }

        if let Some(inner) = extract_parens(&lower, "char")
            .or_else(|| extract_parens(&lower, "character"))
            .or_else(|| extract_parens(&lower, "nchar"))
        {
            return match parse_length_param(&inner) {
                Some(n) => DataType::Char(Some(n)),
                None => DataType::Unrecognized(trimmed.to_string()),
            };
        }

        match lower.as_str() {
            "bool" | "boolean" => DataType::Scalar(CanonicalType::Bool),

            "tinyint" | "int1" => DataType::Scalar(CanonicalType::Int8),
            "smallint" | "int2" => DataType::Scalar(CanonicalType::Int16),
            "int" | "integer" | "int4" => DataType::Scalar(CanonicalType::Int32),
            "bigint" | "int8" | "int64" => DataType::Scalar(CanonicalType::Int64),

            "real" | "float4" => DataType::Scalar(CanonicalType::Float32),
            "double" | "float8" | "float64" | "double precision" | "float" => {
                DataType::Scalar(CanonicalType::Float64)
            }

            "decimal" | "numeric" | "number" | "bignumeric" | "bigdecimal" => {
                DataType::scalar(CanonicalType::Decimal)
            }

            "char" | "character" | "bpchar" => DataType::Char(None),
            "varchar" | "character varying" | "text" | "string" | "nvarchar" => {
                DataType::Varchar(None)
            }

            "binary" | "blob" | "bytea" | "bytes" => DataType::Scalar(CanonicalType::Binary),
            "varbinary" => DataType::Scalar(CanonicalType::Varbinary),

            "date" => DataType::Scalar(CanonicalType::Date),
            "time" | "time without time zone" => DataType::Scalar(CanonicalType::Time),
            "timestamp" | "datetime" | "timestamp without time zone" => {
                DataType::Scalar(CanonicalType::Timestamp)
            }
            "timestamptz" | "timestamp with time zone" => {
                DataType::Scalar(CanonicalType::TimestampTz)
            }

            "json" | "jsonb" => DataType::Scalar(CanonicalType::Json),
            "uuid" => DataType::Scalar(CanonicalType::Uuid),

            _ => DataType::Unrecognized(trimmed.to_string()),
        }
    }
}

impl From<CanonicalType> for DataType {
    fn from(ty: CanonicalType) -> Self {
        DataType::scalar(ty)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Scalar(ty) => write!(f, "{}", ty),
            DataType::Decimal {
                precision: Some(p),
                scale: Some(s),
            } => write!(f, "NUMERIC({}, {})", p, s),
            DataType::Decimal {
                precision: Some(p),
                scale: None,
            } => write!(f, "NUMERIC({})", p),
            DataType::Decimal { .. } => write!(f, "NUMERIC"),
            DataType::Char(Some(n)) => write!(f, "CHAR({})", n),
            DataType::Char(None) => write!(f, "CHAR"),
            DataType::Varchar(Some(n)) => write!(f, "VARCHAR({})", n),
            DataType::Varchar(None) => write!(f, "VARCHAR"),
            DataType::Array(inner) => write!(f, "{}[]", inner),
            DataType::Interval(Some(q)) => write!(f, "INTERVAL {}", q),
            DataType::Interval(None) => write!(f, "INTERVAL"),
            DataType::Unrecognized(name) => write!(f, "{}", name),
        }
    }
}

/// Extract content inside parentheses for a given type prefix.
/// e.g., extract_parens("decimal(10,2)", "decimal") returns Some("10,2")
fn extract_parens(s: &str, prefix: &str) -> Option<String> {
    let rest = s.strip_prefix(prefix)?.trim();
    if !rest.starts_with('(') || !rest.ends_with(')') {
        return None;
    }
    Some(rest[1..rest.len() - 1].to_string())
}

/// Extract content inside angle brackets, e.g. `array<int64>`.
fn extract_angle(s: &str, prefix: &str) -> Option<String> {
    let rest = s.strip_prefix(prefix)?.trim();
    if !rest.starts_with('<') || !rest.ends_with('>') {
        return None;
    }
    Some(rest[1..rest.len() - 1].to_string())
}

/// Parse decimal parameters "precision" or "precision, scale".
fn parse_decimal_params(inner: &str) -> Option<DataType> {
    let parts: Vec<&str> = inner.split(',').map(|s| s.trim()).collect();
    match parts.as_slice() {
        [p] => Some(DataType::Decimal {
            precision: Some(p.parse().ok()?),
            scale: None,
        }),
        [p, s] => Some(DataType::decimal(p.parse().ok()?, s.parse().ok()?)),
        _ => None,
    }
}

/// Parse a single length parameter.
fn parse_length_param(inner: &str) -> Option<u32> {
    inner.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_types() {
        assert_eq!(DataType::parse("bool"), DataType::Scalar(CanonicalType::Bool));
        assert_eq!(DataType::parse("BOOLEAN"), DataType::Scalar(CanonicalType::Bool));
        assert_eq!(DataType::parse("smallint"), DataType::Scalar(CanonicalType::Int16));
        assert_eq!(DataType::parse("INT"), DataType::Scalar(CanonicalType::Int32));
        assert_eq!(DataType::parse("bigint"), DataType::Scalar(CanonicalType::Int64));
        assert_eq!(DataType::parse("INT64"), DataType::Scalar(CanonicalType::Int64));
        assert_eq!(DataType::parse("real"), DataType::Scalar(CanonicalType::Float32));
        assert_eq!(
            DataType::parse("double precision"),
            DataType::Scalar(CanonicalType::Float64)
        );
        assert_eq!(DataType::parse("text"), DataType::Varchar(None));
        assert_eq!(DataType::parse("bytea"), DataType::Scalar(CanonicalType::Binary));
        assert_eq!(
            DataType::parse("timestamp with time zone"),
            DataType::Scalar(CanonicalType::TimestampTz)
        );
        assert_eq!(DataType::parse("jsonb"), DataType::Scalar(CanonicalType::Json));
    }

    #[test]
    fn test_parse_parameterized_types() {
        assert_eq!(DataType::parse("decimal(10,2)"), DataType::decimal(10, 2));
        assert_eq!(DataType::parse("NUMERIC(39, 4)"), DataType::decimal(39, 4));
        assert_eq!(
            DataType::parse("numeric(12)"),
            DataType::Decimal {
                precision: Some(12),
                scale: None
            }
        );
        assert_eq!(DataType::parse("varchar(255)"), DataType::Varchar(Some(255)));
        assert_eq!(DataType::parse("CHAR(1)"), DataType::Char(Some(1)));
    }

    #[test]
    fn test_parse_nested_and_interval() {
        assert_eq!(
            DataType::parse("INT[]"),
            DataType::array(DataType::Scalar(CanonicalType::Int32))
        );
        assert_eq!(
            DataType::parse("ARRAY<ARRAY<STRING>>"),
            DataType::array(DataType::array(DataType::Varchar(None)))
        );
        assert_eq!(DataType::parse("INTERVAL"), DataType::Interval(None));
        assert_eq!(
            DataType::parse("interval day"),
            DataType::Interval(Some("DAY".into()))
        );
    }

    #[test]
    fn test_parse_unrecognized_keeps_name() {
        assert_eq!(
            DataType::parse("GEOGRAPHY"),
            DataType::Unrecognized("GEOGRAPHY".into())
        );
        assert_eq!(
            DataType::parse("decimal(abc)"),
            DataType::Unrecognized("decimal(abc)".into())
        );
        assert!(DataType::parse("hstore").canonical().is_none());
    }

    #[test]
    fn test_type_predicates() {
        assert!(CanonicalType::Int64.is_integer());
        assert!(CanonicalType::Float32.is_float());
        assert!(CanonicalType::Decimal.is_numeric());
        assert!(!CanonicalType::Decimal.is_integer());
        assert!(CanonicalType::Varchar.is_string());
        assert!(CanonicalType::TimestampTz.is_temporal());
        assert!(!CanonicalType::Json.is_temporal());
    }

    #[test]
    fn test_display() {
        assert_eq!(DataType::decimal(18, 2).to_string(), "NUMERIC(18, 2)");
        assert_eq!(DataType::Varchar(Some(255)).to_string(), "VARCHAR(255)");
        assert_eq!(
            DataType::array(DataType::Scalar(CanonicalType::Int64)).to_string(),
            "BIGINT[]"
        );
        assert_eq!(
            CanonicalType::TimestampTz.to_string(),
            "TIMESTAMP WITH TIME ZONE"
        );
    }

    #[test]
    fn test_scalar_normalizes_parameterized_kinds() {
        assert_eq!(
            DataType::scalar(CanonicalType::Decimal),
            DataType::Decimal {
                precision: None,
                scale: None
            }
        );
        assert_eq!(DataType::scalar(CanonicalType::Varchar), DataType::Varchar(None));
        for ty in CanonicalType::ALL {
            assert_eq!(DataType::scalar(ty).canonical(), Some(ty));
        }
    }
}
