use chrono::{DateTime, Utc};
use vaxl_store::WorldState;
use vaxl_types::TxId;

/// Per-invocation transaction context.
///
/// Carries the invocation's identity and a handle on the world state it may
/// read and write. Contracts hold no state of their own; everything an
/// operation needs arrives through this value.
pub struct TxContext<'s> {
    tx_id: TxId,
    timestamp: DateTime<Utc>,
    stub: &'s dyn WorldState,
}

impl<'s> TxContext<'s> {
    /// Open a context with a fresh transaction ID stamped now.
    pub fn new(stub: &'s dyn WorldState) -> Self {
        Self::with_identity(TxId::new(), Utc::now(), stub)
    }

    pub fn with_identity(tx_id: TxId, timestamp: DateTime<Utc>, stub: &'s dyn WorldState) -> Self {
        Self {
            tx_id,
            timestamp,
            stub,
        }
    }

    pub fn tx_id(&self) -> &TxId {
        &self.tx_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The world state visible to this invocation.
    pub fn stub(&self) -> &'s dyn WorldState {
        self.stub
    }
}

impl std::fmt::Debug for TxContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxContext")
            .field("tx_id", &self.tx_id)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}
