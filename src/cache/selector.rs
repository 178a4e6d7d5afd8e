//! Backend-driven delegate selection with hot swap.
//!
//! The active [`Selection`] sits behind an [`ArcSwap`]. Cache calls load a
//! snapshot and run against it, so a concurrent [`reload`] never blocks
//! them and never changes the delegate under a call already in flight.
//!
//! [`reload`]: CacheDelegateSelector::reload

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::{delegate_for, CacheDelegate, CacheResult, Location};
use crate::config::{BackendKind, Settings, SettingsResult};
use crate::connector::ConnectorFactory;

/// Where the selector reads its settings from.
pub trait SettingsSource: Send + Sync {
    fn load(&self) -> SettingsResult<Settings>;
}

impl<F> SettingsSource for F
where
    F: Fn() -> SettingsResult<Settings> + Send + Sync,
{
    fn load(&self) -> SettingsResult<Settings> {
        self()
    }
}

/// The backend kind and the delegate built for it, swapped as one unit.
#[derive(Clone)]
pub struct Selection {
    pub kind: BackendKind,
    pub delegate: Arc<dyn CacheDelegate>,
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection").field("kind", &self.kind).finish()
    }
}

pub struct CacheDelegateSelector {
    current: ArcSwap<Selection>,
    settings: Box<dyn SettingsSource>,
    factory: Arc<dyn ConnectorFactory>,
}

impl CacheDelegateSelector {
    /// Read settings and select the initial delegate.
    pub fn new(
        settings: impl SettingsSource + 'static,
        factory: Arc<dyn ConnectorFactory>,
    ) -> CacheResult<Self> {
        let loaded = settings.load()?;
        let selection = select(&loaded, factory.as_ref())?;
        tracing::info!(backend = %selection.kind, "selected cache delegate");
        Ok(Self {
            current: ArcSwap::from_pointee(selection),
            settings: Box::new(settings),
            factory,
        })
    }

    pub fn current_kind(&self) -> BackendKind {
        self.current.load().kind
    }

    /// Snapshot of the active selection.
    pub fn current(&self) -> Arc<Selection> {
        self.current.load_full()
    }

    /// Re-read settings and swap the delegate if the backend changed.
    ///
    /// Returns whether a swap happened. On error the current selection is
    /// kept.
    pub fn reload(&self) -> CacheResult<bool> {
        let settings = self.settings.load()?;
        let previous = self.current_kind();
        if settings.backend == previous {
            return Ok(false);
        }

        let selection = select(&settings, self.factory.as_ref())?;
        self.current.store(Arc::new(selection));
        tracing::info!(from = %previous, to = %settings.backend, "swapped cache delegate");
        Ok(true)
    }
}

fn select(settings: &Settings, factory: &dyn ConnectorFactory) -> CacheResult<Selection> {
    Ok(Selection {
        kind: settings.backend,
        delegate: delegate_for(settings.backend, settings, factory)?,
    })
}

impl CacheDelegate for CacheDelegateSelector {
    fn materialize(
        &self,
        catalog: &str,
        schema: &str,
        name: &str,
        statement: &str,
    ) -> CacheResult<Option<Location>> {
        let selection = self.current.load_full();
        selection.delegate.materialize(catalog, schema, name, statement)
    }

    fn remove(&self, location: &Location) -> CacheResult<()> {
        let selection = self.current.load_full();
        selection.delegate.remove(location)
    }
}

impl fmt::Debug for CacheDelegateSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheDelegateSelector")
            .field("current", &self.current_kind())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheError;
    use crate::connector::BuiltinConnectors;
    use std::sync::Mutex;

    fn switchable(kind: BackendKind) -> (Arc<Mutex<BackendKind>>, impl SettingsSource) {
        let shared = Arc::new(Mutex::new(kind));
        let source = {
            let shared = shared.clone();
            move || -> SettingsResult<Settings> {
                Ok(Settings {
                    backend: *shared.lock().unwrap(),
                    ..Settings::default()
                })
            }
        };
        (shared, source)
    }

    #[test]
    fn test_initial_selection() {
        let (_, source) = switchable(BackendKind::DuckDb);
        let selector = CacheDelegateSelector::new(source, Arc::new(BuiltinConnectors)).unwrap();
        assert_eq!(selector.current_kind(), BackendKind::DuckDb);
        assert_eq!(selector.materialize("c", "s", "n", "SELECT 1").unwrap(), None);
    }

    #[test]
    fn test_reload_without_change_does_not_swap() {
        let (_, source) = switchable(BackendKind::Snowflake);
        let selector = CacheDelegateSelector::new(source, Arc::new(BuiltinConnectors)).unwrap();
        let before = selector.current();
        assert!(!selector.reload().unwrap());
        assert!(Arc::ptr_eq(&before, &selector.current()));
    }

    #[test]
    fn test_reload_swaps_on_kind_change() {
        let (shared, source) = switchable(BackendKind::DuckDb);
        let selector = CacheDelegateSelector::new(source, Arc::new(BuiltinConnectors)).unwrap();
        let snapshot = selector.current();

        *shared.lock().unwrap() = BackendKind::Sqlite;
        assert!(selector.reload().unwrap());
        assert_eq!(selector.current_kind(), BackendKind::Sqlite);
        // A snapshot taken before the swap keeps its delegate.
        assert_eq!(snapshot.kind, BackendKind::DuckDb);
    }

    #[test]
    fn test_missing_connector_is_config_error() {
        let (shared, source) = switchable(BackendKind::DuckDb);
        let selector = CacheDelegateSelector::new(source, Arc::new(BuiltinConnectors)).unwrap();

        *shared.lock().unwrap() = BackendKind::Postgres;
        assert!(matches!(selector.reload(), Err(CacheError::Config(_))));
        assert_eq!(selector.current_kind(), BackendKind::DuckDb);

        let (_, source) = switchable(BackendKind::BigQuery);
        assert!(matches!(
            CacheDelegateSelector::new(source, Arc::new(BuiltinConnectors)),
            Err(CacheError::Config(_))
        ));
    }
}
