use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::traits::{KeyValue, StateIterator};

/// Cursor over a materialized set of entries.
///
/// The in-process backends copy matching entries out under their read lock
/// and hand them out one at a time, so a cursor never holds a lock. Each
/// open cursor is counted against its store until it is closed.
pub struct SnapshotIterator {
    entries: std::vec::IntoIter<KeyValue>,
    open_cursors: Option<Arc<AtomicUsize>>,
}

impl SnapshotIterator {
    /// Open a cursor, counting it against `open_cursors`.
    pub(crate) fn open(entries: Vec<KeyValue>, open_cursors: Arc<AtomicUsize>) -> Self {
        open_cursors.fetch_add(1, Ordering::SeqCst);
        Self {
            entries: entries.into_iter(),
            open_cursors: Some(open_cursors),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.open_cursors.is_none()
    }
}

impl StateIterator for SnapshotIterator {
    fn has_next(&self) -> bool {
        !self.is_closed() && !self.entries.as_slice().is_empty()
    }

    fn next_entry(&mut self) -> StoreResult<Option<KeyValue>> {
        if self.is_closed() {
            return Err(StoreError::IteratorClosed);
        }
        Ok(self.entries.next())
    }

    fn close(&mut self) -> StoreResult<()> {
        if let Some(counter) = self.open_cursors.take() {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl std::fmt::Debug for SnapshotIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotIterator")
            .field("remaining", &self.entries.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
