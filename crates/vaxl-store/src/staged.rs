use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{StoreError, StoreResult};
use crate::iter::SnapshotIterator;
use crate::traits::{in_range, BoxedStateIterator, KeyValue, WorldState};

/// Writes buffered by one invocation, ordered by key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteSet {
    writes: BTreeMap<String, Vec<u8>>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a write. A later write to the same key replaces the earlier one.
    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.writes.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.writes.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Buffered keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.writes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<u8>)> {
        self.writes.iter()
    }
}

impl IntoIterator for WriteSet {
    type Item = (String, Vec<u8>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

/// Per-invocation overlay over committed world state.
///
/// Writes land in a [`WriteSet`] and never reach the base store; the caller
/// either commits [`StagedState::into_write_set`] or drops it. Point reads and
/// range cursors see the invocation's own writes. Selector queries run
/// against committed state only.
pub struct StagedState<'a> {
    base: &'a dyn WorldState,
    pending: RwLock<WriteSet>,
    open_cursors: Arc<AtomicUsize>,
}

impl<'a> StagedState<'a> {
    pub fn new(base: &'a dyn WorldState) -> Self {
        Self {
            base,
            pending: RwLock::new(WriteSet::new()),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of cursors opened on this overlay and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Consume the overlay and return the buffered writes.
    pub fn into_write_set(self) -> StoreResult<WriteSet> {
        self.pending
            .into_inner()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl WorldState for StagedState<'_> {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        {
            let pending = self
                .pending
                .read()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            if let Some(value) = pending.get(key) {
                return Ok(Some(value.to_vec()));
            }
        }
        self.base.get_state(key)
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.pending
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?
            .put(key, value.to_vec());
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> StoreResult<BoxedStateIterator<'_>> {
        let mut merged = BTreeMap::new();
        let mut base = self.base.get_state_by_range(start, end)?;
        let drained = drain_into(&mut base, &mut merged);
        let closed = base.close();
        drained?;
        closed?;

        let pending = self
            .pending
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        for (key, value) in pending.iter() {
            if in_range(key, start, end) {
                merged.insert(key.clone(), value.clone());
            }
        }

        let entries = merged
            .into_iter()
            .map(|(key, value)| KeyValue { key, value })
            .collect();
        Ok(Box::new(SnapshotIterator::open(
            entries,
            Arc::clone(&self.open_cursors),
        )))
    }

    fn get_query_result(
        &self,
        namespace: &str,
        query: &str,
    ) -> StoreResult<BoxedStateIterator<'_>> {
        self.base.get_query_result(namespace, query)
    }
}

fn drain_into(
    cursor: &mut BoxedStateIterator<'_>,
    into: &mut BTreeMap<String, Vec<u8>>,
) -> StoreResult<()> {
    while let Some(kv) = cursor.next_entry()? {
        into.insert(kv.key, kv.value);
    }
    Ok(())
}

impl std::fmt::Debug for StagedState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = self.pending.read().map(|p| p.len()).unwrap_or(0);
        f.debug_struct("StagedState")
            .field("pending_writes", &pending)
            .field("open_cursors", &self.open_cursors())
            .finish()
    }
}
