use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::CodecResult;

/// The two record kinds stored in the world state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A vaccinated person.
    Subject,
    /// One administered dose.
    Dose,
}

impl RecordKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Dose => "dose",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape shared by every record kept in the world state: `{key, id, ...}`.
///
/// `key` is the store lookup key; `id` is the domain identifier, which may
/// differ from `key` when the record uses a composite key.
pub trait LedgerRecord: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync {
    const KIND: RecordKind;

    /// Store lookup key.
    fn key(&self) -> &str;

    /// Domain identifier of the owning subject.
    fn id(&self) -> &str;

    fn encode(&self) -> CodecResult<Vec<u8>> {
        codec::encode(self)
    }

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        codec::decode(bytes)
    }
}

/// A record together with the key it was found under during a range scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult<R> {
    pub key: String,
    #[serde(rename = "Record")]
    pub record: R,
}

impl<R> QueryResult<R> {
    pub fn new(key: impl Into<String>, record: R) -> Self {
        Self {
            key: key.into(),
            record,
        }
    }
}
