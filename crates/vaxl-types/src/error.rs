use thiserror::Error;

/// Errors produced by the record codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("failed to encode {kind} record: {reason}")]
    Encode { kind: &'static str, reason: String },

    #[error("failed to decode {kind} record: {reason}")]
    Decode { kind: &'static str, reason: String },
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
