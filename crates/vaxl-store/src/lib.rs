//! World-state storage for vaxl.
//!
//! The ledger contracts never own their data: every record lives in an
//! externally-provided, ordered key-value world state that is applied
//! all-or-nothing per invocation. This crate defines that capability surface
//! and ships the in-process backends used by tests and the `vaxl` binary.
//!
//! # Capability Surface
//!
//! All backends implement [`WorldState`]:
//!
//! - `get_state` / `put_state`: point reads and writes by key
//! - `get_state_by_range`: lazy cursor over a key interval in byte order
//! - `get_query_result`: JSON [`Selector`] query over stored documents
//!
//! Cursors implement [`StateIterator`] and must be closed exactly once.
//!
//! # Backends
//!
//! - [`InMemoryWorldState`]: `BTreeMap`-based committed state
//! - [`FileWorldState`]: in-memory state persisted to a JSON file
//! - [`StagedState`]: per-invocation overlay buffering writes into a
//!   [`WriteSet`] until the caller commits or discards it
//!
//! # Design Rules
//!
//! 1. Keys are ordered by their UTF-8 bytes; empty keys are rejected on write.
//! 2. The store never interprets values except to answer selector queries.
//! 3. A write set is applied atomically or not at all.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod iter;
pub mod memory;
pub mod selector;
pub mod staged;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileWorldState;
pub use iter::SnapshotIterator;
pub use memory::InMemoryWorldState;
pub use selector::Selector;
pub use staged::{StagedState, WriteSet};
pub use traits::{BoxedStateIterator, KeyValue, StateCommitter, StateIterator, WorldState};
