use serde_json::Value;
use vaxl_types::{QueryResult, Subject};

use crate::context::TxContext;
use crate::contract::{payload, Contract, FunctionSpec};
use crate::cursor::RecordIter;
use crate::engine::RecordEngine;
use crate::error::{LedgerError, LedgerResult};
use crate::seed;

/// Registration name of the subject contract.
pub const SUBJECT_CONTRACT: &str = "subject";

const FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec::new("InitLedger", &[]),
    FunctionSpec::new("Create", &["id", "name"]),
    FunctionSpec::new("FindOne", &["key"]),
    FunctionSpec::new("FindAll", &[]),
    FunctionSpec::new("Update", &["id", "name"]),
];

/// Registry of vaccinated subjects, keyed by subject id.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubjectContract {
    engine: RecordEngine<Subject>,
}

impl SubjectContract {
    pub const fn new() -> Self {
        Self {
            engine: RecordEngine::new(),
        }
    }

    /// Write the fixed seed set.
    pub fn init_ledger(&self, ctx: &TxContext<'_>) -> LedgerResult<()> {
        seed::seed(ctx, &seed::subject_seed()).map(|_| ())
    }

    /// Create (or silently replace) the subject `id`.
    pub fn create(&self, ctx: &TxContext<'_>, id: &str, name: &str) -> LedgerResult<()> {
        self.engine.put(ctx, &Subject::new(id, name))
    }

    pub fn find_one(&self, ctx: &TxContext<'_>, key: &str) -> LedgerResult<Subject> {
        self.engine.find_one(ctx, key)
    }

    pub fn find_all(&self, ctx: &TxContext<'_>) -> LedgerResult<Vec<QueryResult<Subject>>> {
        self.engine.find_all(ctx)
    }

    /// Lazy form of [`SubjectContract::find_all`].
    pub fn scan<'s>(&self, ctx: &TxContext<'s>) -> LedgerResult<RecordIter<'s, Subject>> {
        self.engine.scan(ctx)
    }

    /// Replace the subject's name. An empty `name` clears it.
    pub fn update(&self, ctx: &TxContext<'_>, id: &str, name: &str) -> LedgerResult<()> {
        self.engine
            .update(ctx, id, |subject| subject.name = name.to_string())
            .map(|_| ())
    }
}

impl Contract for SubjectContract {
    fn name(&self) -> &'static str {
        SUBJECT_CONTRACT
    }

    fn functions(&self) -> &'static [FunctionSpec] {
        FUNCTIONS
    }

    fn invoke(
        &self,
        ctx: &TxContext<'_>,
        function: &str,
        args: &[String],
    ) -> LedgerResult<Option<Value>> {
        let spec = self.resolve(function, args)?;
        match (spec.name, args) {
            ("InitLedger", []) => self.init_ledger(ctx).map(|_| None),
            ("Create", [id, name]) => self.create(ctx, id, name).map(|_| None),
            ("FindOne", [key]) => payload(&self.find_one(ctx, key)?),
            ("FindAll", []) => payload(&self.find_all(ctx)?),
            ("Update", [id, name]) => self.update(ctx, id, name).map(|_| None),
            _ => Err(LedgerError::UnknownFunction {
                contract: SUBJECT_CONTRACT.to_string(),
                function: function.to_string(),
            }),
        }
    }
}
