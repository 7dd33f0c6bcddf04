//! Field-tagged JSON encoding of ledger records.
//!
//! Values are stored as compact JSON objects whose field names are fixed per
//! record kind. Unset optional fields are omitted on encode; missing fields
//! decode to their empty default. Bytes that are not a JSON object of the
//! expected shape fail with [`CodecError::Decode`].

use crate::error::{CodecError, CodecResult};
use crate::record::LedgerRecord;

/// Encode a record into its stored byte form.
pub fn encode<R: LedgerRecord>(record: &R) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(record).map_err(|e| CodecError::Encode {
        kind: R::KIND.as_str(),
        reason: e.to_string(),
    })
}

/// Decode a record from its stored byte form.
pub fn decode<R: LedgerRecord>(bytes: &[u8]) -> CodecResult<R> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
        kind: R::KIND.as_str(),
        reason: e.to_string(),
    })
}
