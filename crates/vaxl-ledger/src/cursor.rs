//! Scoped cursors over world-state scans.
//!
//! [`ScanCursor`] owns a store cursor and releases it exactly once: when the
//! cursor is exhausted, when advancing it fails, on an explicit
//! [`ScanCursor::close`], or on drop if the caller stops early.
//! [`RecordIter`] layers lazy record decoding on top.

use std::marker::PhantomData;

use vaxl_store::{BoxedStateIterator, KeyValue, StoreError};
use vaxl_types::{LedgerRecord, QueryResult};

use crate::error::{LedgerError, LedgerResult};

/// Where a cursor came from; decides how its failures are reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanOrigin {
    /// Key-range scan.
    Range,
    /// Selector query in the given namespace.
    Query { namespace: String },
}

impl ScanOrigin {
    fn error(&self, source: StoreError) -> LedgerError {
        match self {
            Self::Range => LedgerError::StoreScan(source),
            Self::Query { namespace } => LedgerError::Query {
                namespace: namespace.clone(),
                source,
            },
        }
    }
}

/// A store cursor that is released exactly once on every exit path.
pub struct ScanCursor<'s> {
    inner: BoxedStateIterator<'s>,
    origin: ScanOrigin,
    closed: bool,
}

impl<'s> ScanCursor<'s> {
    pub fn new(inner: BoxedStateIterator<'s>, origin: ScanOrigin) -> Self {
        Self {
            inner,
            origin,
            closed: false,
        }
    }

    pub fn origin(&self) -> &ScanOrigin {
        &self.origin
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Advance to the next raw entry.
    ///
    /// Returns `Ok(None)` once exhausted; the underlying cursor is released
    /// before returning `None` or an error.
    pub fn next_entry(&mut self) -> LedgerResult<Option<KeyValue>> {
        if self.closed {
            return Ok(None);
        }
        match self.inner.next_entry() {
            Ok(Some(entry)) => Ok(Some(entry)),
            Ok(None) => {
                self.close()?;
                Ok(None)
            }
            Err(e) => {
                self.release();
                Err(self.origin.error(e))
            }
        }
    }

    /// Release the underlying cursor. Later calls are no-ops.
    pub fn close(&mut self) -> LedgerResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.inner.close().map_err(|e| self.origin.error(e))
    }

    fn release(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "failed to release world-state cursor");
        }
    }
}

impl Drop for ScanCursor<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ScanCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanCursor")
            .field("origin", &self.origin)
            .field("closed", &self.closed)
            .finish()
    }
}

/// Lazily decodes each scanned entry into a record.
///
/// Yields `Err` at most once: after a scan or decode failure the cursor is
/// released and iteration ends.
pub struct RecordIter<'s, R> {
    cursor: ScanCursor<'s>,
    done: bool,
    _record: PhantomData<fn() -> R>,
}

impl<'s, R: LedgerRecord> RecordIter<'s, R> {
    pub fn new(cursor: ScanCursor<'s>) -> Self {
        Self {
            cursor,
            done: false,
            _record: PhantomData,
        }
    }

    /// Stop early and release the cursor.
    pub fn close(mut self) -> LedgerResult<()> {
        self.done = true;
        self.cursor.close()
    }

    fn fail(&mut self, error: LedgerError) -> Option<LedgerResult<QueryResult<R>>> {
        self.done = true;
        self.cursor.release();
        Some(Err(error))
    }
}

impl<R: LedgerRecord> Iterator for RecordIter<'_, R> {
    type Item = LedgerResult<QueryResult<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let entry = match self.cursor.next_entry() {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => return self.fail(e),
        };
        match R::decode(&entry.value) {
            Ok(record) => Some(Ok(QueryResult::new(entry.key, record))),
            Err(source) => self.fail(LedgerError::Decode {
                key: entry.key,
                source,
            }),
        }
    }
}

impl<R> std::fmt::Debug for RecordIter<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordIter")
            .field("cursor", &self.cursor)
            .field("done", &self.done)
            .finish()
    }
}
