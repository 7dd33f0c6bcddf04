use serde_json::{json, Value};
use vaxl_types::{Dose, QueryResult};

use crate::context::TxContext;
use crate::contract::{payload, Contract, FunctionSpec};
use crate::cursor::RecordIter;
use crate::engine::RecordEngine;
use crate::error::{LedgerError, LedgerResult};
use crate::seed;

/// Registration name of the dose contract.
pub const DOSE_CONTRACT: &str = "dose";

/// Namespace selector queries for doses are issued against.
pub const DOSE_QUERY_NAMESPACE: &str = "vaccine";

const FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec::new("InitLedger", &[]),
    FunctionSpec::new("Create", &["key", "id", "name", "dose", "scheme"]),
    FunctionSpec::new("FindOne", &["key"]),
    FunctionSpec::new("FindAll", &[]),
    FunctionSpec::new("Update", &["key", "name", "dose", "scheme"]),
    FunctionSpec::new("FindOneById", &["id"]),
];

/// Registry of administered doses, keyed by a caller-supplied composite key.
#[derive(Clone, Copy, Debug, Default)]
pub struct DoseContract {
    engine: RecordEngine<Dose>,
}

impl DoseContract {
    pub const fn new() -> Self {
        Self {
            engine: RecordEngine::new(),
        }
    }

    /// Write the fixed seed set.
    pub fn init_ledger(&self, ctx: &TxContext<'_>) -> LedgerResult<()> {
        seed::seed(ctx, &seed::dose_seed()).map(|_| ())
    }

    /// Create (or silently replace) the dose stored under `key`.
    ///
    /// The key is taken verbatim; see [`vaxl_types::DoseKey`] for the usual
    /// `"{id}-{dose}-{scheme}"` convention.
    pub fn create(
        &self,
        ctx: &TxContext<'_>,
        key: &str,
        id: &str,
        name: &str,
        dose: &str,
        scheme: &str,
    ) -> LedgerResult<()> {
        self.engine.put(ctx, &Dose::new(key, id, name, dose, scheme))
    }

    pub fn find_one(&self, ctx: &TxContext<'_>, key: &str) -> LedgerResult<Dose> {
        self.engine.find_one(ctx, key)
    }

    pub fn find_all(&self, ctx: &TxContext<'_>) -> LedgerResult<Vec<QueryResult<Dose>>> {
        self.engine.find_all(ctx)
    }

    /// Lazy form of [`DoseContract::find_all`].
    pub fn scan<'s>(&self, ctx: &TxContext<'s>) -> LedgerResult<RecordIter<'s, Dose>> {
        self.engine.scan(ctx)
    }

    /// Overwrite the non-empty fields among `name`, `dose` and `scheme`.
    pub fn update(
        &self,
        ctx: &TxContext<'_>,
        key: &str,
        name: &str,
        dose: &str,
        scheme: &str,
    ) -> LedgerResult<()> {
        self.engine
            .update(ctx, key, |record| record.apply_partial(name, dose, scheme))
            .map(|_| ())
    }

    /// Every dose whose `id` field equals `id`, in store-determined order.
    pub fn find_one_by_id(&self, ctx: &TxContext<'_>, id: &str) -> LedgerResult<Vec<Dose>> {
        self.query_by_id(ctx, id)?
            .map(|result| result.map(|r| r.record))
            .collect()
    }

    /// Lazy form of [`DoseContract::find_one_by_id`].
    pub fn query_by_id<'s>(
        &self,
        ctx: &TxContext<'s>,
        id: &str,
    ) -> LedgerResult<RecordIter<'s, Dose>> {
        let selector = json!({ "selector": { "id": id } });
        self.engine.query(ctx, DOSE_QUERY_NAMESPACE, &selector)
    }
}

impl Contract for DoseContract {
    fn name(&self) -> &'static str {
        DOSE_CONTRACT
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
            ("Create", [key, id, name, dose, scheme]) => {
                self.create(ctx, key, id, name, dose, scheme).map(|_| None)
            }
            ("FindOne", [key]) => payload(&self.find_one(ctx, key)?),
            ("FindAll", []) => payload(&self.find_all(ctx)?),
            ("Update", [key, name, dose, scheme]) => {
                self.update(ctx, key, name, dose, scheme).map(|_| None)
            }
            ("FindOneById", [id]) => payload(&self.find_one_by_id(ctx, id)?),
            _ => Err(LedgerError::UnknownFunction {
                contract: DOSE_CONTRACT.to_string(),
                function: function.to_string(),
            }),
        }
    }
}
