use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};
use crate::iter::SnapshotIterator;
use crate::selector::Selector;
use crate::staged::WriteSet;
use crate::traits::{BoxedStateIterator, KeyValue, StateCommitter, WorldState};

/// In-memory, `BTreeMap`-based world state.
///
/// Intended for tests and embedding. Entries are held behind a `RwLock` and
/// ordered by key bytes. Values are cloned on read and write.
pub struct InMemoryWorldState {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    rich_query: bool,
    open_cursors: Arc<AtomicUsize>,
}

impl InMemoryWorldState {
    /// Create a new empty store with selector queries enabled.
    pub fn new() -> Self {
        Self::from_entries(BTreeMap::new())
    }

    /// Create a store pre-populated with `entries`.
    pub fn from_entries(entries: BTreeMap<String, Vec<u8>>) -> Self {
        Self {
            entries: RwLock::new(entries),
            rich_query: true,
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Enable or disable selector queries (a store without a rich-query index).
    pub fn with_rich_query(mut self, enabled: bool) -> Self {
        self.rich_query = enabled;
        self
    }

    pub fn supports_rich_query(&self) -> bool {
        self.rich_query
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Number of cursors opened on this store and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Copy of every entry in key order.
    pub fn snapshot(&self) -> StoreResult<BTreeMap<String, Vec<u8>>> {
        Ok(self.read_entries()?.clone())
    }

    fn read_entries(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.entries
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write_entries(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.entries
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for InMemoryWorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldState for InMemoryWorldState {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        self.write_entries()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> StoreResult<BoxedStateIterator<'_>> {
        let map = self.read_entries()?;
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start)
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };

        // BTreeMap::range panics on inverted bounds.
        let entries = if !start.is_empty() && !end.is_empty() && start > end {
            Vec::new()
        } else {
            map.range::<str, _>((lower, upper))
                .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
                .collect()
        };

        tracing::trace!(start, end, count = entries.len(), "opened range cursor");
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
        if !self.rich_query {
            return Err(StoreError::RichQueryUnsupported {
                namespace: namespace.to_string(),
            });
        }
        let selector = Selector::parse(query)?;
        let map = self.read_entries()?;
        let matching = map
            .iter()
            .filter(|(_, v)| selector.matches_bytes(v))
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()));
        let entries: Vec<KeyValue> = match selector.limit() {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        };

        tracing::trace!(namespace, query, count = entries.len(), "opened query cursor");
        Ok(Box::new(SnapshotIterator::open(
            entries,
            Arc::clone(&self.open_cursors),
        )))
    }
}

impl StateCommitter for InMemoryWorldState {
    fn commit(&self, writes: WriteSet) -> StoreResult<()> {
        if writes.iter().any(|(key, _)| key.is_empty()) {
            return Err(StoreError::EmptyKey);
        }
        let mut map = self.write_entries()?;
        for (key, value) in writes {
            map.insert(key, value);
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryWorldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("InMemoryWorldState");
        match self.entries.read() {
            Ok(map) => d.field("entry_count", &map.len()),
            Err(_) => d.field("entry_count", &"<poisoned>"),
        };
        d.field("rich_query", &self.rich_query)
            .field("open_cursors", &self.open_cursors())
            .finish()
    }
}
