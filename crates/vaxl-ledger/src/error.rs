use vaxl_store::StoreError;
use vaxl_types::CodecError;

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{key} does not exist")]
    NotFound { key: String },

    #[error("failed to read {key:?} from world state: {source}")]
    StoreRead { key: String, source: StoreError },

    #[error("failed to put {key:?} to world state: {source}")]
    StoreWrite { key: String, source: StoreError },

    #[error("failed to scan world state: {0}")]
    StoreScan(#[source] StoreError),

    #[error("stored value under {key:?} is malformed: {source}")]
    Decode { key: String, source: CodecError },

    #[error("failed to encode record {key:?}: {source}")]
    Encode { key: String, source: CodecError },

    #[error("selector query in namespace {namespace:?} failed: {source}")]
    Query { namespace: String, source: StoreError },

    #[error("failed to seed {key:?}: {source}")]
    Seed {
        key: String,
        source: Box<LedgerError>,
    },

    #[error("contract {0:?} is not registered")]
    UnknownContract(String),

    #[error("contract {contract:?} has no function {function:?}")]
    UnknownFunction { contract: String, function: String },

    #[error("{function} expects {expected} argument(s), got {actual}")]
    InvalidArguments {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("failed to serialize response: {0}")]
    Response(String),

    #[error("failed to commit transaction {tx_id}: {source}")]
    Commit { tx_id: String, source: StoreError },
}

impl LedgerError {
    /// Returns `true` for the recoverable "record does not exist" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
