//! Backend kinds.
//!
//! The configured backend decides the SQL dialect, the connector type
//! registry, the rewrite pipeline and the cache delegate.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::settings::SettingsError;
use crate::connector::registry::{self, TypeRegistry};
use crate::sql::Dialect;

/// Supported backend warehouses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    BigQuery,
    Postgres,
    /// Couchbase through its JDBC (SQL++) driver
    Couchbase,
    #[default]
    DuckDb,
    Snowflake,
    /// Local SQLite file or in-memory database
    Sqlite,
}

impl BackendKind {
    pub const ALL: [BackendKind; 6] = [
        BackendKind::BigQuery,
        BackendKind::Postgres,
        BackendKind::Couchbase,
        BackendKind::DuckDb,
        BackendKind::Snowflake,
        BackendKind::Sqlite,
    ];

    /// Parse a backend name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, SettingsError> {
        match s.to_lowercase().as_str() {
            "bigquery" | "bq" => Ok(BackendKind::BigQuery),
            "postgres" | "postgresql" | "pg" => Ok(BackendKind::Postgres),
            "couchbase" => Ok(BackendKind::Couchbase),
            "duckdb" | "duck" => Ok(BackendKind::DuckDb),
            "snowflake" => Ok(BackendKind::Snowflake),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(SettingsError::UnsupportedBackend(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::BigQuery => "bigquery",
            BackendKind::Postgres => "postgres",
            BackendKind::Couchbase => "couchbase",
            BackendKind::DuckDb => "duckdb",
            BackendKind::Snowflake => "snowflake",
            BackendKind::Sqlite => "sqlite",
        }
    }

    /// SQL dialect used to emit queries for this backend.
    ///
    /// Couchbase's SQL++ front end accepts the Postgres rendering.
    pub fn dialect(&self) -> Dialect {
        match self {
            BackendKind::BigQuery => Dialect::BigQuery,
            BackendKind::Postgres | BackendKind::Couchbase => Dialect::Postgres,
            BackendKind::DuckDb => Dialect::DuckDb,
            BackendKind::Snowflake => Dialect::Snowflake,
            BackendKind::Sqlite => Dialect::Sqlite,
        }
    }

    /// Native type name mapping for this backend's connector.
    pub fn type_registry(&self) -> &'static TypeRegistry {
        match self {
            BackendKind::BigQuery => &registry::BIGQUERY,
            BackendKind::Postgres => &registry::POSTGRES,
            BackendKind::Couchbase => &registry::COUCHBASE,
            BackendKind::DuckDb => &registry::DUCKDB,
            BackendKind::Snowflake => &registry::SNOWFLAKE,
            BackendKind::Sqlite => &registry::SQLITE,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
