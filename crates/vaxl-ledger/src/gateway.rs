//! In-process stand-in for the platform's transaction flow.
//!
//! Each invocation runs over a fresh [`StagedState`]. `submit` commits the
//! buffered writes to the contract's backing store only when the invocation
//! succeeds; `evaluate` always throws them away.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};
use vaxl_store::{StagedState, StateCommitter, WriteSet};
use vaxl_types::TxId;

use crate::context::TxContext;
use crate::contract::Contract;
use crate::error::{LedgerError, LedgerResult};

/// Outcome of a successful invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Receipt {
    pub tx_id: TxId,
    /// When the invocation started.
    pub timestamp: DateTime<Utc>,
    pub payload: Option<Value>,
    /// Number of keys written. Zero for evaluations.
    pub writes: usize,
}

struct Channel<S> {
    contract: Box<dyn Contract>,
    store: S,
}

/// Routes invocations to registered contracts, each with its own store.
pub struct Gateway<S> {
    channels: BTreeMap<&'static str, Channel<S>>,
}

impl<S: StateCommitter> Gateway<S> {
    pub fn new() -> Self {
        Self {
            channels: BTreeMap::new(),
        }
    }

    /// Register `contract` under its own name, backed by `store`.
    ///
    /// Registering a second contract with the same name replaces the first.
    pub fn with_contract(mut self, contract: impl Contract + 'static, store: S) -> Self {
        self.channels.insert(
            contract.name(),
            Channel {
                contract: Box::new(contract),
                store,
            },
        );
        self
    }

    /// Names of all registered contracts, sorted.
    pub fn contracts(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.channels.keys().copied()
    }

    pub fn contract(&self, name: &str) -> LedgerResult<&dyn Contract> {
        self.channel(name).map(|c| c.contract.as_ref())
    }

    /// The committed store backing `name`.
    pub fn store(&self, name: &str) -> LedgerResult<&S> {
        self.channel(name).map(|c| &c.store)
    }

    /// Run `function` and commit its writes if it succeeds.
    pub fn submit(&self, contract: &str, function: &str, args: &[String]) -> LedgerResult<Receipt> {
        let channel = self.channel(contract)?;
        let (mut receipt, writes) = run(channel, function, args)?;
        receipt.writes = writes.len();
        if !writes.is_empty() {
            channel.store.commit(writes).map_err(|source| {
                warn!(
                    tx = %receipt.tx_id.short_id(),
                    at = %receipt.timestamp,
                    contract,
                    function,
                    error = %source,
                    "commit failed"
                );
                LedgerError::Commit {
                    tx_id: receipt.tx_id.to_string(),
                    source,
                }
            })?;
        }
        info!(
            tx = %receipt.tx_id.short_id(),
            at = %receipt.timestamp,
            contract,
            function,
            writes = receipt.writes,
            "transaction committed"
        );
        Ok(receipt)
    }

    /// Run `function` without committing anything.
    pub fn evaluate(
        &self,
        contract: &str,
        function: &str,
        args: &[String],
    ) -> LedgerResult<Receipt> {
        let channel = self.channel(contract)?;
        let (receipt, _discarded) = run(channel, function, args)?;
        Ok(receipt)
    }

    fn channel(&self, name: &str) -> LedgerResult<&Channel<S>> {
        self.channels
            .get(name)
            .ok_or_else(|| LedgerError::UnknownContract(name.to_string()))
    }
}

impl<S: StateCommitter> Default for Gateway<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for Gateway<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("contracts", &self.channels.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn run<S: StateCommitter>(
    channel: &Channel<S>,
    function: &str,
    args: &[String],
) -> LedgerResult<(Receipt, WriteSet)> {
    let staged = StagedState::new(&channel.store);
    let (tx_id, timestamp, result) = {
        let ctx = TxContext::new(&staged);
        let result = channel.contract.invoke(&ctx, function, args);
        (ctx.tx_id().clone(), ctx.timestamp(), result)
    };
    let payload = result.map_err(|e| {
        warn!(
            tx = %tx_id.short_id(),
            at = %timestamp,
            contract = channel.contract.name(),
            function,
            error = %e,
            "invocation failed, discarding writes"
        );
        e
    })?;
    let writes = staged.into_write_set().map_err(|source| LedgerError::Commit {
        tx_id: tx_id.to_string(),
        source,
    })?;
    let receipt = Receipt {
        tx_id,
        timestamp,
        payload,
        writes: 0,
    };
    Ok((receipt, writes))
}
