//! Fault-injecting world state for exercising error paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use vaxl_store::{
    BoxedStateIterator, InMemoryWorldState, KeyValue, StateCommitter, StateIterator, StoreError,
    StoreResult, WorldState, WriteSet,
};

fn injected(what: &str) -> StoreError {
    StoreError::Io(std::io::Error::other(format!("injected {what} failure")))
}

/// An [`InMemoryWorldState`] whose operations can be made to fail.
#[derive(Debug, Default)]
pub(crate) struct FaultyState {
    inner: InMemoryWorldState,
    fail_reads: AtomicBool,
    fail_scans: AtomicBool,
    fail_commits: AtomicBool,
    fail_put_key: Mutex<Option<String>>,
    cursor_fails_after: Option<usize>,
}

impl FaultyState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Cursors error instead of yielding their `n+1`-th entry.
    pub(crate) fn fail_cursor_after(mut self, n: usize) -> Self {
        self.cursor_fails_after = Some(n);
        self
    }

    pub(crate) fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub(crate) fn fail_scans(&self, on: bool) {
        self.fail_scans.store(on, Ordering::SeqCst);
    }

    pub(crate) fn fail_commits(&self, on: bool) {
        self.fail_commits.store(on, Ordering::SeqCst);
    }

    /// Fail writes to `key`; `None` clears the fault.
    pub(crate) fn fail_put(&self, key: Option<&str>) {
        *self.fail_put_key.lock().unwrap() = key.map(str::to_string);
    }

    pub(crate) fn open_cursors(&self) -> usize {
        self.inner.open_cursors()
    }

    pub(crate) fn inner(&self) -> &InMemoryWorldState {
        &self.inner
    }

    fn wrap<'a>(&self, inner: BoxedStateIterator<'a>) -> BoxedStateIterator<'a> {
        match self.cursor_fails_after {
            Some(limit) => Box::new(FaultyCursor {
                inner,
                yielded: 0,
                limit,
            }),
            None => inner,
        }
    }
}

impl WorldState for FaultyState {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected("read"));
        }
        self.inner.get_state(key)
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if self.fail_put_key.lock().unwrap().as_deref() == Some(key) {
            return Err(injected("write"));
        }
        self.inner.put_state(key, value)
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> StoreResult<BoxedStateIterator<'_>> {
        if self.fail_scans.load(Ordering::SeqCst) {
            return Err(injected("scan"));
        }
        Ok(self.wrap(self.inner.get_state_by_range(start, end)?))
    }

    fn get_query_result(
        &self,
        namespace: &str,
        query: &str,
    ) -> StoreResult<BoxedStateIterator<'_>> {
        Ok(self.wrap(self.inner.get_query_result(namespace, query)?))
    }
}

impl StateCommitter for FaultyState {
    fn commit(&self, writes: WriteSet) -> StoreResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(injected("commit"));
        }
        self.inner.commit(writes)
    }
}

struct FaultyCursor<'a> {
    inner: BoxedStateIterator<'a>,
    yielded: usize,
    limit: usize,
}

impl StateIterator for FaultyCursor<'_> {
    fn has_next(&self) -> bool {
        self.inner.has_next()
    }

    fn next_entry(&mut self) -> StoreResult<Option<KeyValue>> {
        if self.yielded >= self.limit {
            return Err(injected("cursor"));
        }
        self.yielded += 1;
        self.inner.next_entry()
    }

    fn close(&mut self) -> StoreResult<()> {
        self.inner.close()
    }
}
