//! Subject and dose registries for vaxl.
//!
//! This crate holds the contract logic. It provides:
//! - `RecordEngine`, the generic create / read / update / enumerate core
//!   shared by both registries
//! - `ScanCursor` and `RecordIter`, which release store cursors exactly once
//!   on every exit path
//! - `SubjectContract` and `DoseContract`, addressable by function name
//!   through the `Contract` trait
//! - Fixed seed sets written by `InitLedger`
//! - `Gateway`, which runs invocations all-or-nothing over a staged overlay

pub mod context;
pub mod contract;
pub mod cursor;
pub mod dose;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod seed;
pub mod subject;

#[cfg(test)]
mod testing;

pub use context::TxContext;
pub use contract::{Contract, FunctionSpec};
pub use cursor::{RecordIter, ScanCursor, ScanOrigin};
pub use dose::{DoseContract, DOSE_CONTRACT, DOSE_QUERY_NAMESPACE};
pub use engine::RecordEngine;
pub use error::{LedgerError, LedgerResult};
pub use gateway::{Gateway, Receipt};
pub use subject::{SubjectContract, SUBJECT_CONTRACT};
