//! Record-kind-agnostic CRUD, range enumeration and selector queries.

use std::marker::PhantomData;

use serde_json::Value;
use tracing::debug;
use vaxl_types::{LedgerRecord, QueryResult};

use crate::context::TxContext;
use crate::cursor::{RecordIter, ScanCursor, ScanOrigin};
use crate::error::{LedgerError, LedgerResult};

/// Stateless storage engine for one record kind.
///
/// Every call re-reads the world state through the transaction context;
/// nothing is cached between calls. Decode failures are always propagated as
/// [`LedgerError::Decode`], on point reads, scans and queries alike.
pub struct RecordEngine<R> {
    _record: PhantomData<fn() -> R>,
}

impl<R> RecordEngine<R> {
    pub const fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }
}

impl<R> Default for RecordEngine<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for RecordEngine<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for RecordEngine<R> {}

impl<R> std::fmt::Debug for RecordEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RecordEngine")
    }
}

impl<R: LedgerRecord> RecordEngine<R> {
    /// Encode `record` and write it under its own key.
    ///
    /// No existence check: an existing record at the same key is replaced.
    pub fn put(&self, ctx: &TxContext<'_>, record: &R) -> LedgerResult<()> {
        let key = record.key();
        let bytes = record.encode().map_err(|source| LedgerError::Encode {
            key: key.to_string(),
            source,
        })?;
        debug!(kind = %R::KIND, key, tx = %ctx.tx_id().short_id(), "put record");
        ctx.stub()
            .put_state(key, &bytes)
            .map_err(|source| LedgerError::StoreWrite {
                key: key.to_string(),
                source,
            })
    }

    /// Read and decode the record stored under `key`.
    pub fn find_one(&self, ctx: &TxContext<'_>, key: &str) -> LedgerResult<R> {
        debug!(kind = %R::KIND, key, tx = %ctx.tx_id().short_id(), "get record");
        let bytes = ctx
            .stub()
            .get_state(key)
            .map_err(|source| LedgerError::StoreRead {
                key: key.to_string(),
                source,
            })?
            .ok_or_else(|| LedgerError::NotFound {
                key: key.to_string(),
            })?;
        R::decode(&bytes).map_err(|source| LedgerError::Decode {
            key: key.to_string(),
            source,
        })
    }

    /// Read the record under `key`, apply `change`, and write it back to the
    /// same key. Never creates: a missing key fails with `NotFound`.
    pub fn update(
        &self,
        ctx: &TxContext<'_>,
        key: &str,
        change: impl FnOnce(&mut R),
    ) -> LedgerResult<R> {
        let mut record = self.find_one(ctx, key)?;
        change(&mut record);
        let bytes = record.encode().map_err(|source| LedgerError::Encode {
            key: key.to_string(),
            source,
        })?;
        debug!(kind = %R::KIND, key, tx = %ctx.tx_id().short_id(), "update record");
        ctx.stub()
            .put_state(key, &bytes)
            .map_err(|source| LedgerError::StoreWrite {
                key: key.to_string(),
                source,
            })?;
        Ok(record)
    }

    /// Lazily enumerate every record in store key order.
    pub fn scan<'s>(&self, ctx: &TxContext<'s>) -> LedgerResult<RecordIter<'s, R>> {
        debug!(kind = %R::KIND, tx = %ctx.tx_id().short_id(), "open full range scan");
        let inner = ctx
            .stub()
            .get_state_by_range("", "")
            .map_err(LedgerError::StoreScan)?;
        Ok(RecordIter::new(ScanCursor::new(inner, ScanOrigin::Range)))
    }

    /// Collect every record in store key order.
    pub fn find_all(&self, ctx: &TxContext<'_>) -> LedgerResult<Vec<QueryResult<R>>> {
        self.scan(ctx)?.collect()
    }

    /// Lazily run a selector query against `namespace`.
    pub fn query<'s>(
        &self,
        ctx: &TxContext<'s>,
        namespace: &str,
        selector: &Value,
    ) -> LedgerResult<RecordIter<'s, R>> {
        let query = selector.to_string();
        debug!(
            kind = %R::KIND,
            namespace,
            %query,
            tx = %ctx.tx_id().short_id(),
            "run selector query"
        );
        let inner = ctx
            .stub()
            .get_query_result(namespace, &query)
            .map_err(|source| LedgerError::Query {
                namespace: namespace.to_string(),
                source,
            })?;
        Ok(RecordIter::new(ScanCursor::new(
            inner,
            ScanOrigin::Query {
                namespace: namespace.to_string(),
            },
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FaultyState;
    use serde_json::json;
    use vaxl_store::{InMemoryWorldState, StoreError, WorldState};
    use vaxl_types::{Dose, Subject};

    const SUBJECTS: RecordEngine<Subject> = RecordEngine::new();
    const DOSES: RecordEngine<Dose> = RecordEngine::new();

    // -----------------------------------------------------------------------
    // Point operations
    // -----------------------------------------------------------------------

    #[test]
    fn put_then_find_one() {
        let store = InMemoryWorldState::new();
        let ctx = TxContext::new(&store);
        let subject = Subject::new("1", "Alan");
        SUBJECTS.put(&ctx, &subject).unwrap();
        assert_eq!(SUBJECTS.find_one(&ctx, "1").unwrap(), subject);
    }

    #[test]
    fn put_overwrites_existing() {
        let store = InMemoryWorldState::new();
        let ctx = TxContext::new(&store);
        SUBJECTS.put(&ctx, &Subject::new("1", "Alan")).unwrap();
        SUBJECTS.put(&ctx, &Subject::new("1", "Alana")).unwrap();
        assert_eq!(SUBJECTS.find_one(&ctx, "1").unwrap().name, "Alana");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn find_one_missing_is_not_found() {
        let store = InMemoryWorldState::new();
        let ctx = TxContext::new(&store);
        let err = SUBJECTS.find_one(&ctx, "nope").unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { ref key } if key == "nope"));
    }

    #[test]
    fn find_one_propagates_decode_failure() {
        let store = InMemoryWorldState::new();
        store.put_state("1", b"{broken").unwrap();
        let ctx = TxContext::new(&store);
        let err = SUBJECTS.find_one(&ctx, "1").unwrap_err();
        assert!(matches!(err, LedgerError::Decode { ref key, .. } if key == "1"));
    }

    #[test]
    fn find_one_read_failure() {
        let store = FaultyState::new();
        store.fail_reads(true);
        let ctx = TxContext::new(&store);
        let err = SUBJECTS.find_one(&ctx, "1").unwrap_err();
        assert!(matches!(err, LedgerError::StoreRead { .. }));
    }

    #[test]
    fn put_write_failure() {
        let store = FaultyState::new();
        store.fail_put(Some("1"));
        let ctx = TxContext::new(&store);
        let err = SUBJECTS.put(&ctx, &Subject::new("1", "Alan")).unwrap_err();
        assert!(matches!(err, LedgerError::StoreWrite { ref key, .. } if key == "1"));
    }

    #[test]
    fn put_empty_key_is_a_write_failure() {
        let store = InMemoryWorldState::new();
        let ctx = TxContext::new(&store);
        let err = SUBJECTS.put(&ctx, &Subject::new("", "Nobody")).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::StoreWrite { source: StoreError::EmptyKey, .. }
        ));
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    #[test]
    fn update_applies_change_and_writes_back() {
        let store = InMemoryWorldState::new();
        let ctx = TxContext::new(&store);
        SUBJECTS.put(&ctx, &Subject::new("1", "Alan")).unwrap();
        let updated = SUBJECTS.update(&ctx, "1", |s| s.name = "Turing".into()).unwrap();
        assert_eq!(updated.name, "Turing");
        assert_eq!(SUBJECTS.find_one(&ctx, "1").unwrap(), updated);
    }

    #[test]
    fn update_missing_leaves_store_unchanged() {
        let store = InMemoryWorldState::new();
        let ctx = TxContext::new(&store);
        let err = SUBJECTS.update(&ctx, "1", |s| s.name = "x".into()).unwrap_err();
        assert!(err.is_not_found());
        assert!(store.is_empty());
    }

    #[test]
    fn update_write_failure() {
        let store = FaultyState::new();
        let ctx = TxContext::new(&store);
        SUBJECTS.put(&ctx, &Subject::new("1", "Alan")).unwrap();
        store.fail_put(Some("1"));
        let err = SUBJECTS.update(&ctx, "1", |s| s.name = "x".into()).unwrap_err();
        assert!(matches!(err, LedgerError::StoreWrite { .. }));
        store.fail_put(None);
        assert_eq!(SUBJECTS.find_one(&ctx, "1").unwrap().name, "Alan");
    }

    // -----------------------------------------------------------------------
    // Range enumeration
    // -----------------------------------------------------------------------

    #[test]
    fn find_all_returns_key_order() {
        let store = InMemoryWorldState::new();
        let ctx = TxContext::new(&store);
        for key in ["b", "c", "a"] {
            DOSES.put(&ctx, &Dose::new(key, "1", "n", "1", "s")).unwrap();
        }
        let keys: Vec<_> = DOSES
            .find_all(&ctx)
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(store.open_cursors(), 0);
    }

    #[test]
    fn find_all_on_empty_store() {
        let store = InMemoryWorldState::new();
        let ctx = TxContext::new(&store);
        assert!(DOSES.find_all(&ctx).unwrap().is_empty());
    }

    #[test]
    fn find_all_propagates_decode_failure() {
        let store = InMemoryWorldState::new();
        let ctx = TxContext::new(&store);
        DOSES.put(&ctx, &Dose::new("a", "1", "n", "1", "s")).unwrap();
        store.put_state("b", b"[1,2]").unwrap();
        let err = DOSES.find_all(&ctx).unwrap_err();
        assert!(matches!(err, LedgerError::Decode { ref key, .. } if key == "b"));
        assert_eq!(store.open_cursors(), 0);
    }

    #[test]
    fn scan_open_failure() {
        let store = FaultyState::new();
        store.fail_scans(true);
        let ctx = TxContext::new(&store);
        assert!(matches!(
            DOSES.find_all(&ctx),
            Err(LedgerError::StoreScan(_))
        ));
    }

    #[test]
    fn scan_advance_failure_releases_cursor() {
        let store = FaultyState::new().fail_cursor_after(1);
        let ctx = TxContext::new(&store);
        DOSES.put(&ctx, &Dose::new("a", "1", "n", "1", "s")).unwrap();
        DOSES.put(&ctx, &Dose::new("b", "1", "n", "1", "s")).unwrap();
        assert!(matches!(
            DOSES.find_all(&ctx),
            Err(LedgerError::StoreScan(_))
        ));
        assert_eq!(store.open_cursors(), 0);
    }

    #[test]
    fn abandoned_scan_releases_cursor() {
        let store = InMemoryWorldState::new();
        let ctx = TxContext::new(&store);
        for key in ["a", "b", "c"] {
            DOSES.put(&ctx, &Dose::new(key, "1", "n", "1", "s")).unwrap();
        }
        let first = DOSES.scan(&ctx).unwrap().next().unwrap().unwrap();
        assert_eq!(first.key, "a");
        assert_eq!(store.open_cursors(), 0);
    }

    // -----------------------------------------------------------------------
    // Selector queries
    // -----------------------------------------------------------------------

    #[test]
    fn query_matches_on_field() {
        let store = InMemoryWorldState::new();
        let ctx = TxContext::new(&store);
        DOSES.put(&ctx, &Dose::new("1-1", "1", "n", "1", "s")).unwrap();
        DOSES.put(&ctx, &Dose::new("2-1", "2", "n", "1", "s")).unwrap();
        let hits: Vec<_> = DOSES
            .query(&ctx, "vaccine", &json!({"selector": {"id": "2"}}))
            .unwrap()
            .collect::<LedgerResult<_>>()
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.key, "2-1");
    }

    #[test]
    fn query_unsupported_is_query_error() {
        let store = InMemoryWorldState::new().with_rich_query(false);
        let ctx = TxContext::new(&store);
        let err = DOSES
            .query(&ctx, "vaccine", &json!({"selector": {}}))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Query { source: StoreError::RichQueryUnsupported { .. }, .. }
        ));
    }

    #[test]
    fn query_malformed_is_query_error() {
        let store = InMemoryWorldState::new();
        let ctx = TxContext::new(&store);
        let err = DOSES
            .query(&ctx, "vaccine", &json!({"selector": {"id": {"$regex": "1"}}}))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Query { source: StoreError::MalformedQuery(_), .. }
        ));
    }

    #[test]
    fn query_propagates_decode_failure() {
        let store = InMemoryWorldState::new();
        store.put_state("x", br#"{"id":"1","dose":2}"#).unwrap();
        let ctx = TxContext::new(&store);
        let mut iter = DOSES
            .query(&ctx, "vaccine", &json!({"selector": {"id": "1"}}))
            .unwrap();
        let err = iter.next().unwrap().unwrap_err();
        assert!(matches!(err, LedgerError::Decode { ref key, .. } if key == "x"));
        assert_eq!(store.open_cursors(), 0);
    }
}
