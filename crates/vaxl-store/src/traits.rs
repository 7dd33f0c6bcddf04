use crate::error::StoreResult;
use crate::staged::WriteSet;

/// A raw entry produced by a cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Forward-only cursor over world-state entries.
///
/// Cursors are lazy, finite and cannot be restarted. Every cursor holds a
/// store-side resource that is released by [`StateIterator::close`]; closing
/// twice is a no-op, advancing after close fails with
/// [`StoreError::IteratorClosed`](crate::StoreError::IteratorClosed).
pub trait StateIterator: Send {
    /// Returns `true` if another entry is available.
    fn has_next(&self) -> bool;

    /// Advance the cursor. Returns `Ok(None)` once the cursor is exhausted.
    fn next_entry(&mut self) -> StoreResult<Option<KeyValue>>;

    /// Release the store-side resource held by this cursor.
    fn close(&mut self) -> StoreResult<()>;
}

pub type BoxedStateIterator<'a> = Box<dyn StateIterator + 'a>;

/// Ordered key-value world state scoped to one invocation.
///
/// Implementations must satisfy these invariants:
/// - Keys are compared by their UTF-8 bytes; range cursors yield entries in
///   ascending key order.
/// - `put_state` rejects empty keys.
/// - A missing key reads as `Ok(None)`; `Err` is reserved for backend failure.
pub trait WorldState: Send + Sync {
    /// Read the value stored under `key`.
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any previous value.
    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Open a cursor over `[start, end)`. An empty bound is unbounded, so
    /// `("", "")` walks every key.
    fn get_state_by_range(&self, start: &str, end: &str) -> StoreResult<BoxedStateIterator<'_>>;

    /// Run a JSON selector query against the documents of `namespace`.
    ///
    /// See [`Selector`](crate::Selector) for the accepted query language.
    fn get_query_result(&self, namespace: &str, query: &str)
        -> StoreResult<BoxedStateIterator<'_>>;
}

/// Backends that accept a buffered write set from a finished invocation.
pub trait StateCommitter: WorldState {
    /// Apply every write in `writes` atomically.
    fn commit(&self, writes: WriteSet) -> StoreResult<()>;
}

/// Whether `key` falls inside `[start, end)` with empty bounds unbounded.
pub(crate) fn in_range(key: &str, start: &str, end: &str) -> bool {
    (start.is_empty() || key >= start) && (end.is_empty() || key < end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bounds_are_unbounded() {
        assert!(in_range("", "", ""));
        assert!(in_range("zzz", "", ""));
    }

    #[test]
    fn end_bound_is_exclusive() {
        assert!(in_range("a", "a", "b"));
        assert!(!in_range("b", "a", "b"));
        assert!(!in_range("0", "a", ""));
    }
}
