//! Initial records written by `InitLedger`.

use tracing::info;
use vaxl_types::{Dose, DoseKey, LedgerRecord, Subject};

use crate::context::TxContext;
use crate::engine::RecordEngine;
use crate::error::{LedgerError, LedgerResult};

/// Subjects present after deployment.
pub fn subject_seed() -> Vec<Subject> {
    vec![
        Subject::new("1", "Alan"),
        Subject::new("2", "Pedro"),
        Subject::new("3", "María"),
    ]
}

/// Doses present after deployment: subject 1 has completed a two-dose
/// scheme, subject 2 has received the first dose only.
pub fn dose_seed() -> Vec<Dose> {
    [("1", "1"), ("1", "2"), ("2", "1")]
        .into_iter()
        .map(|(id, dose)| {
            Dose::new(
                DoseKey::compose(id, dose, "sch1"),
                id,
                "astrazeneca",
                dose,
                "sch1",
            )
        })
        .collect()
}

/// Write `records` one at a time through the create path.
///
/// Stops at the first failure and returns it wrapped in
/// [`LedgerError::Seed`]; earlier writes are left for the surrounding
/// invocation to discard. Re-seeding overwrites the same keys with the same
/// values.
pub fn seed<R: LedgerRecord>(ctx: &TxContext<'_>, records: &[R]) -> LedgerResult<usize> {
    let engine = RecordEngine::<R>::new();
    for record in records {
        engine.put(ctx, record).map_err(|e| LedgerError::Seed {
            key: record.key().to_string(),
            source: Box::new(e),
        })?;
        info!(kind = %R::KIND, key = record.key(), "seeded record");
    }
    Ok(records.len())
}
