//! Native type name ↔ canonical type mapping, one table per backend.
//!
//! Each registry is built once from a closed list of pairs. Forward lookup
//! is case-insensitive. Reverse lookup returns the first native name listed
//! for a canonical type, so list order matters where several native names
//! share a canonical type.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::{ConnectorError, ConnectorResult};
use crate::sql::CanonicalType;

type Fallback = fn(&str) -> Option<CanonicalType>;

/// Type mapping for one backend.
#[derive(Debug)]
pub struct TypeRegistry {
    backend: &'static str,
    forward: HashMap<String, CanonicalType>,
    reverse: HashMap<CanonicalType, &'static str>,
    fallback: Option<Fallback>,
}

impl TypeRegistry {
    pub fn new(backend: &'static str, pairs: &[(&'static str, CanonicalType)]) -> Self {
        let mut forward = HashMap::with_capacity(pairs.len());
        let mut reverse = HashMap::new();
        for (native, canonical) in pairs {
            forward.insert(native.to_uppercase(), *canonical);
            reverse.entry(*canonical).or_insert(*native);
        }
        Self {
            backend,
            forward,
            reverse,
            fallback: None,
        }
    }

    /// Consulted when a name is not in the table.
    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn to_canonical(&self, native: &str) -> Option<CanonicalType> {
        let key = native.trim().to_uppercase();
        self.forward
            .get(&key)
            .copied()
            .or_else(|| self.fallback.and_then(|f| f(&key)))
    }

    pub fn to_native(&self, canonical: CanonicalType) -> Option<&'static str> {
        self.reverse.get(&canonical).copied()
    }

    /// Like [`to_canonical`](Self::to_canonical), failing on unmapped names.
    pub fn canonical(&self, native: &str) -> ConnectorResult<CanonicalType> {
        self.to_canonical(native)
            .ok_or_else(|| ConnectorError::UnsupportedType {
                backend: self.backend,
                name: native.to_string(),
            })
    }
}

use CanonicalType::*;

pub static BIGQUERY: Lazy<TypeRegistry> = Lazy::new(|| {
    TypeRegistry::new(
        "bigquery",
        &[
            ("BOOL", Bool),
            ("BOOLEAN", Bool),
            ("INT64", Int64),
            ("INTEGER", Int64),
            ("FLOAT64", Float64),
            ("FLOAT", Float64),
            ("NUMERIC", Decimal),
            ("BIGNUMERIC", Decimal),
            ("STRING", Varchar),
            ("BYTES", Varbinary),
            ("DATE", Date),
            ("TIME", Time),
            ("DATETIME", Timestamp),
            ("TIMESTAMP", TimestampTz),
            ("JSON", Json),
        ],
    )
});

pub static POSTGRES: Lazy<TypeRegistry> = Lazy::new(|| {
    TypeRegistry::new(
        "postgres",
        &[
            ("BOOLEAN", Bool),
            ("BOOL", Bool),
            ("SMALLINT", Int16),
            ("INT2", Int16),
            ("INTEGER", Int32),
            ("INT4", Int32),
            ("INT", Int32),
            ("BIGINT", Int64),
            ("INT8", Int64),
            ("REAL", Float32),
            ("FLOAT4", Float32),
            ("DOUBLE PRECISION", Float64),
            ("FLOAT8", Float64),
            ("NUMERIC", Decimal),
            ("DECIMAL", Decimal),
            ("CHAR", Char),
            ("BPCHAR", Char),
            ("VARCHAR", Varchar),
            ("CHARACTER VARYING", Varchar),
            ("TEXT", Varchar),
            ("BYTEA", Varbinary),
            ("DATE", Date),
            ("TIME", Time),
            ("TIMESTAMP", Timestamp),
            ("TIMESTAMPTZ", TimestampTz),
            ("TIMESTAMP WITH TIME ZONE", TimestampTz),
            ("JSONB", Json),
            ("JSON", Json),
            ("UUID", Uuid),
        ],
    )
});

/// JDBC type names reported by the Couchbase driver. `BIGINT` arrives as an
/// arbitrary-precision number.
pub static COUCHBASE: Lazy<TypeRegistry> = Lazy::new(|| {
    TypeRegistry::new(
        "couchbase",
        &[
            ("BOOLEAN", Bool),
            ("BIGINT", Decimal),
            ("BINARY", Binary),
            ("DATE", Date),
            ("DOUBLE", Float64),
            ("DECIMAL", Decimal),
            ("FLOAT", Float32),
            ("SMALLINT", Int16),
            ("INTEGER", Int32),
            ("TINYINT", Int8),
            ("TIMESTAMP", Timestamp),
            ("TIMESTAMP_WITH_TIMEZONE", TimestampTz),
            ("VARCHAR", Varchar),
        ],
    )
});

pub static DUCKDB: Lazy<TypeRegistry> = Lazy::new(|| {
    TypeRegistry::new(
        "duckdb",
        &[
            ("BOOLEAN", Bool),
            ("TINYINT", Int8),
            ("SMALLINT", Int16),
            ("INTEGER", Int32),
            ("BIGINT", Int64),
            ("FLOAT", Float32),
            ("REAL", Float32),
            ("DOUBLE", Float64),
            ("DECIMAL", Decimal),
            ("HUGEINT", Decimal),
            ("VARCHAR", Varchar),
            ("BLOB", Varbinary),
            ("DATE", Date),
            ("TIME", Time),
            ("TIMESTAMP", Timestamp),
            ("TIMESTAMP WITH TIME ZONE", TimestampTz),
            ("TIMESTAMPTZ", TimestampTz),
            ("JSON", Json),
            ("UUID", Uuid),
        ],
    )
});

pub static SNOWFLAKE: Lazy<TypeRegistry> = Lazy::new(|| {
    TypeRegistry::new(
        "snowflake",
        &[
            ("BOOLEAN", Bool),
            ("NUMBER", Decimal),
            ("DECIMAL", Decimal),
            ("NUMERIC", Decimal),
            ("BIGINT", Int64),
            ("INTEGER", Int64),
            ("INT", Int64),
            ("SMALLINT", Int64),
            ("TINYINT", Int64),
            ("DOUBLE", Float64),
            ("FLOAT", Float64),
            ("REAL", Float64),
            ("CHAR", Char),
            ("VARCHAR", Varchar),
            ("STRING", Varchar),
            ("TEXT", Varchar),
            ("BINARY", Binary),
            ("VARBINARY", Varbinary),
            ("DATE", Date),
            ("TIME", Time),
            ("TIMESTAMP_NTZ", Timestamp),
            ("TIMESTAMP_TZ", TimestampTz),
            ("TIMESTAMP_LTZ", TimestampTz),
            ("VARIANT", Json),
        ],
    )
});

/// SQLite declared types. Anything not listed goes through SQLite's
/// affinity rules on the declared type with parameters stripped.
pub static SQLITE: Lazy<TypeRegistry> = Lazy::new(|| {
    TypeRegistry::new(
        "sqlite",
        &[
            ("INTEGER", Int64),
            ("REAL", Float64),
            ("TEXT", Varchar),
            ("BLOB", Varbinary),
            ("NUMERIC", Decimal),
            ("BOOLEAN", Bool),
            ("DATE", Date),
            ("DATETIME", Timestamp),
            ("TIMESTAMP", Timestamp),
            ("JSON", Json),
        ],
    )
    .with_fallback(sqlite_affinity)
});

/// https://www.sqlite.org/datatype3.html#determination_of_column_affinity
fn sqlite_affinity(declared: &str) -> Option<CanonicalType> {
    let base = declared.split('(').next().unwrap_or_default().trim();
    if let Some(ty) = SQLITE.forward.get(base) {
        return Some(*ty);
    }
    Some(if base.contains("INT") {
        Int64
    } else if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
        Varchar
    } else if base.is_empty() || base.contains("BLOB") {
        Varbinary
    } else if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
        Float64
    } else {
        Decimal
    })
}
