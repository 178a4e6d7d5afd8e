//! Cache materialization.
//!
//! A [`CacheDelegate`] turns a statement into a backend-side table and can
//! later drop it again. Which delegate is active depends on the configured
//! backend:
//!
//! | Backend | Delegate |
//! |---|---|
//! | BigQuery, Postgres, SQLite | [`SqlCacheDelegate`] (`CREATE TABLE .. AS`) |
//! | DuckDB, Snowflake, Couchbase | [`NoOpCacheDelegate`] |
//!
//! [`CacheDelegateSelector`] picks the delegate and swaps it atomically when
//! the configured backend changes.

pub mod selector;

pub use selector::{CacheDelegateSelector, Selection, SettingsSource};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{BackendKind, Settings, SettingsError};
use crate::connector::{Connector, ConnectorError, ConnectorFactory};
use crate::sql::SqlDialect;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache configuration error: {0}")]
    Config(String),

    #[error("Cache backend error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Failed to load settings: {0}")]
    Settings(#[from] SettingsError),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Where a materialized cache table lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub backend: BackendKind,
    /// Object path, outermost first (e.g. `[dataset, schema, table]`).
    pub path: Vec<String>,
}

impl Location {
    /// The path quoted for the location's backend.
    pub fn quoted(&self) -> String {
        let dialect = self.backend.dialect();
        self.path
            .iter()
            .map(|part| dialect.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.backend, self.path.join("."))
    }
}

/// Creates and drops cache tables on a backend.
pub trait CacheDelegate: Send + Sync {
    /// Materialize `statement` as `name`. `None` when this backend does not
    /// cache.
    fn materialize(
        &self,
        catalog: &str,
        schema: &str,
        name: &str,
        statement: &str,
    ) -> CacheResult<Option<Location>>;

    fn remove(&self, location: &Location) -> CacheResult<()>;
}

/// Delegate for backends without caching.
#[derive(Debug, Clone, Copy)]
pub struct NoOpCacheDelegate {
    kind: BackendKind,
}

impl NoOpCacheDelegate {
    pub fn new(kind: BackendKind) -> Self {
        Self { kind }
    }
}

impl CacheDelegate for NoOpCacheDelegate {
    fn materialize(
        &self,
        _catalog: &str,
        _schema: &str,
        name: &str,
        _statement: &str,
    ) -> CacheResult<Option<Location>> {
        tracing::debug!(backend = %self.kind, name, "caching disabled for backend");
        Ok(None)
    }

    fn remove(&self, _location: &Location) -> CacheResult<()> {
        Ok(())
    }
}

/// Delegate that issues `CREATE TABLE .. AS` / `DROP TABLE IF EXISTS`
/// through a connector.
pub struct SqlCacheDelegate {
    kind: BackendKind,
    connector: Arc<dyn Connector>,
}

impl SqlCacheDelegate {
    pub fn new(kind: BackendKind, connector: Arc<dyn Connector>) -> CacheResult<Self> {
        match kind {
            BackendKind::BigQuery | BackendKind::Postgres | BackendKind::Sqlite => {
                Ok(Self { kind, connector })
            }
            other => Err(CacheError::Config(format!(
                "{other} does not support SQL cache tables"
            ))),
        }
    }

    /// BigQuery addresses tables as `project.dataset.table`; the others
    /// drop the catalog.
    fn target(&self, catalog: &str, schema: &str, name: &str) -> Location {
        let path = match self.kind {
            BackendKind::BigQuery => vec![catalog, schema, name],
            _ => vec![schema, name],
        };
        Location {
            backend: self.kind,
            path: path.into_iter().map(str::to_string).collect(),
        }
    }
}

impl fmt::Debug for SqlCacheDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlCacheDelegate")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl CacheDelegate for SqlCacheDelegate {
    fn materialize(
        &self,
        catalog: &str,
        schema: &str,
        name: &str,
        statement: &str,
    ) -> CacheResult<Option<Location>> {
        let location = self.target(catalog, schema, name);
        let sql = format!("CREATE TABLE {} AS {}", location.quoted(), statement);
        self.connector.execute(&sql)?;
        tracing::debug!(%location, "materialized cache table");
        Ok(Some(location))
    }

    fn remove(&self, location: &Location) -> CacheResult<()> {
        if location.backend != self.kind {
            return Err(CacheError::Config(format!(
                "cannot remove {location} through the {} delegate",
                self.kind
            )));
        }
        self.connector
            .execute(&format!("DROP TABLE IF EXISTS {}", location.quoted()))?;
        tracing::debug!(%location, "removed cache table");
        Ok(())
    }
}

/// Build the delegate for a backend kind.
pub fn delegate_for(
    kind: BackendKind,
    settings: &Settings,
    factory: &dyn ConnectorFactory,
) -> CacheResult<Arc<dyn CacheDelegate>> {
    match kind {
        BackendKind::BigQuery | BackendKind::Postgres | BackendKind::Sqlite => {
            let connector = factory.create(kind, settings)?.ok_or_else(|| {
                CacheError::Config(format!("no connector available for the {kind} backend"))
            })?;
            Ok(Arc::new(SqlCacheDelegate::new(kind, connector)?))
        }
        BackendKind::DuckDb | BackendKind::Snowflake | BackendKind::Couchbase => {
            Ok(Arc::new(NoOpCacheDelegate::new(kind)))
        }
    }
}
