//! Backend connectors.
//!
//! A [`Connector`] is the blocking gateway to one backend: it introspects
//! the schema, describes result columns without running a statement, runs
//! queries as lazy [`RecordIterator`]s and executes statements for the
//! cache layer. Every call opens its own connection.
//!
//! Only the SQLite connector ships here; network backends plug in through
//! a [`ConnectorFactory`].

pub mod introspect;
pub mod record;
pub mod registry;
pub mod sqlite;

pub use introspect::{collect_schema, CatalogSession, SourceColumn, TableColumnMetadata, TableName};
pub use record::{RecordIterator, ReleaseGuard, RowSource};
pub use registry::TypeRegistry;
pub use sqlite::SqliteConnector;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{BackendKind, Settings};
use crate::sql::CanonicalType;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by connectors.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("{operation} failed: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("Unsupported {backend} type: {name}")]
    UnsupportedType { backend: &'static str, name: String },
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;

impl ConnectorError {
    /// Wrap a backend failure. Logged once here so callers need not.
    pub fn backend(operation: &'static str, source: impl Into<BoxError>) -> Self {
        let source = source.into();
        tracing::error!(operation, error = %source, "connector operation failed");
        ConnectorError::Backend { operation, source }
    }
}

/// A result column: name and canonical type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: CanonicalType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: CanonicalType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A dynamically typed cell or positional parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

pub type Row = Vec<Value>;

/// Blocking access to one backend.
pub trait Connector: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Every column of every table, in table then ordinal order.
    fn get_schema(&self) -> ConnectorResult<Vec<TableColumnMetadata>>;

    /// Result columns of `sql` with `params` bound. The statement is
    /// prepared but never run.
    fn describe(&self, sql: &str, params: &[Value]) -> ConnectorResult<Vec<Column>>;

    fn query(&self, sql: &str, params: &[Value]) -> ConnectorResult<RecordIterator>;

    /// Run a statement that returns no rows.
    fn execute(&self, sql: &str) -> ConnectorResult<()>;
}

/// Builds connectors for a backend kind.
pub trait ConnectorFactory: Send + Sync {
    /// `Ok(None)` when this factory has no connector for `kind`.
    fn create(
        &self,
        kind: BackendKind,
        settings: &Settings,
    ) -> ConnectorResult<Option<Arc<dyn Connector>>>;
}

/// Provides the connectors bundled with this crate (SQLite).
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinConnectors;

impl ConnectorFactory for BuiltinConnectors {
    fn create(
        &self,
        kind: BackendKind,
        settings: &Settings,
    ) -> ConnectorResult<Option<Arc<dyn Connector>>> {
        match kind {
            BackendKind::Sqlite => {
                let path = settings
                    .sqlite
                    .resolved_path()
                    .map_err(|e| ConnectorError::backend("connect", e))?;
                Ok(Some(Arc::new(SqliteConnector::new(
                    path,
                    settings.sqlite.catalog.clone(),
                ))))
            }
            _ => Ok(None),
        }
    }
}
