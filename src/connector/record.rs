//! Streaming query results.
//!
//! A [`RecordIterator`] owns whatever backend resources a query holds open
//! (connection, statement, cursor, worker thread) through a
//! [`ReleaseGuard`]. The guard runs its release action exactly once: on
//! [`RecordIterator::close`], when the rows run out, when a row fails, or
//! when the iterator is dropped, whichever comes first.

use super::{Column, ConnectorResult, Row};

/// Runs a release action at most once.
pub struct ReleaseGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl ReleaseGuard {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A guard with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ReleaseGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseGuard")
            .field("released", &self.is_released())
            .finish()
    }
}

/// Produces rows one at a time. `None` means the result set is exhausted.
pub trait RowSource: Send {
    fn next_row(&mut self) -> Option<ConnectorResult<Row>>;
}

impl<I> RowSource for I
where
    I: Iterator<Item = ConnectorResult<Row>> + Send,
{
    fn next_row(&mut self) -> Option<ConnectorResult<Row>> {
        self.next()
    }
}

/// Result columns plus a lazy row stream.
pub struct RecordIterator {
    columns: Vec<Column>,
    // Dropped before the guard so a producer blocked on the source can exit.
    source: Option<Box<dyn RowSource>>,
    guard: ReleaseGuard,
}

impl RecordIterator {
    pub fn new(columns: Vec<Column>, source: Box<dyn RowSource>, guard: ReleaseGuard) -> Self {
        Self {
            columns,
            source: Some(source),
            guard,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Release the underlying resources. Later calls do nothing.
    pub fn close(&mut self) {
        self.source = None;
        self.guard.release();
    }

    pub fn is_closed(&self) -> bool {
        self.guard.is_released()
    }
}

impl Iterator for RecordIterator {
    type Item = ConnectorResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let source = self.source.as_mut()?;
        match source.next_row() {
            Some(Ok(row)) => Some(Ok(row)),
            Some(Err(e)) => {
                self.close();
                Some(Err(e))
            }
            None => {
                self.close();
                None
            }
        }
    }
}

impl Drop for RecordIterator {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for RecordIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordIterator")
            .field("columns", &self.columns)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{ConnectorError, Value};
    use crate::sql::CanonicalType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted(rows: Vec<ConnectorResult<Row>>) -> (RecordIterator, Arc<AtomicUsize>) {
        let releases = Arc::new(AtomicUsize::new(0));
        let counter = releases.clone();
        let iter = RecordIterator::new(
            vec![Column::new("n", CanonicalType::Int64)],
            Box::new(rows.into_iter()),
            ReleaseGuard::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (iter, releases)
    }

    fn ok_rows(n: i64) -> Vec<ConnectorResult<Row>> {
        (0..n).map(|i| Ok(vec![Value::Int(i)])).collect()
    }

    #[test]
    fn test_release_on_exhaustion() {
        let (mut iter, releases) = counted(ok_rows(2));
        assert_eq!(iter.by_ref().count(), 2);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert!(iter.next().is_none());
        drop(iter);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_on_close() {
        let (mut iter, releases) = counted(ok_rows(3));
        assert!(iter.next().is_some());
        iter.close();
        iter.close();
        assert!(iter.next().is_none());
        drop(iter);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_on_drop() {
        let (iter, releases) = counted(ok_rows(3));
        assert_eq!(iter.columns()[0].name, "n");
        drop(iter);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_release_on_failure_keeps_earlier_rows() {
        let mut rows = ok_rows(1);
        rows.push(Err(ConnectorError::backend(
            "query",
            std::io::Error::other("cursor lost"),
        )));
        rows.extend(ok_rows(1));
        let (iter, releases) = counted(rows);

        let results: Vec<_> = iter.collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap(), &vec![Value::Int(0)]);
        assert!(results[1].is_err());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }
}
