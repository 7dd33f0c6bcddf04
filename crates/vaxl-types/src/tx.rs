use std::fmt;

use uuid::Uuid;

/// Identifies one invocation. Time-ordered (UUID v7).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TxId(Uuid);

impl TxId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Leading eight hex digits, for log lines.
    pub fn short_id(&self) -> String {
        let mut short = self.0.simple().to_string();
        short.truncate(8);
        short
    }
}

impl Default for TxId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
