//! Foundation types for vaxl, the vaccination ledger.
//!
//! This crate holds the two record kinds managed by the ledger contracts and
//! the codec that turns them into world-state values. Every other vaxl crate
//! depends on `vaxl-types`.
//!
//! # Key Types
//!
//! - [`Subject`]: a vaccinated person, keyed by its own identifier
//! - [`Dose`]: one administered dose, keyed by a caller-chosen composite key
//! - [`LedgerRecord`]: the shared `{key, id, ...}` shape and its codec
//! - [`QueryResult`]: a `(key, record)` pair produced by range enumeration
//! - [`TxId`]: identity of a single invocation

pub mod codec;
pub mod dose;
pub mod error;
pub mod record;
pub mod subject;
pub mod tx;

pub use codec::{decode, encode};
pub use dose::{Dose, DoseKey};
pub use error::{CodecError, CodecResult};
pub use record::{LedgerRecord, QueryResult, RecordKind};
pub use subject::Subject;
pub use tx::TxId;
