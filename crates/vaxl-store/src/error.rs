use std::path::PathBuf;

/// Errors from world-state operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Attempted to write under an empty key.
    #[error("key must not be an empty string")]
    EmptyKey,

    /// The backend does not maintain a rich-query index.
    #[error("rich queries are not supported for namespace {namespace:?}")]
    RichQueryUnsupported { namespace: String },

    /// The selector document could not be parsed.
    #[error("malformed query: {0}")]
    MalformedQuery(String),

    /// The cursor was advanced after it had been closed.
    #[error("iterator already closed")]
    IteratorClosed,

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Poisoned(String),

    /// Persisted state could not be decoded.
    #[error("corrupt state file {path}: {reason}")]
    CorruptStateFile { path: PathBuf, reason: String },

    /// Serialization failure while persisting state.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
