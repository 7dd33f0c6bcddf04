use serde::Serialize;
use serde_json::Value;

use crate::context::TxContext;
use crate::error::{LedgerError, LedgerResult};

/// A callable function: its name and positional parameter names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub params: &'static [&'static str],
}

impl FunctionSpec {
    pub const fn new(name: &'static str, params: &'static [&'static str]) -> Self {
        Self { name, params }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A record manager addressable by function name and positional string
/// arguments.
///
/// Contracts are stateless: one instance serves every invocation, and all
/// per-call state arrives through the [`TxContext`].
pub trait Contract: Send + Sync {
    /// Name the contract is registered under.
    fn name(&self) -> &'static str;

    /// Every function this contract exposes.
    fn functions(&self) -> &'static [FunctionSpec];

    /// Run `function` with `args`, returning its JSON payload if it has one.
    fn invoke(
        &self,
        ctx: &TxContext<'_>,
        function: &str,
        args: &[String],
    ) -> LedgerResult<Option<Value>>;

    /// Look up `function` and check the argument count.
    fn resolve(&self, function: &str, args: &[String]) -> LedgerResult<&'static FunctionSpec> {
        let spec = self
            .functions()
            .iter()
            .find(|f| f.name == function)
            .ok_or_else(|| LedgerError::UnknownFunction {
                contract: self.name().to_string(),
                function: function.to_string(),
            })?;
        if spec.arity() != args.len() {
            return Err(LedgerError::InvalidArguments {
                function: function.to_string(),
                expected: spec.arity(),
                actual: args.len(),
            });
        }
        Ok(spec)
    }
}

/// Serialize an operation result into a response payload.
pub(crate) fn payload<T: Serialize>(value: &T) -> LedgerResult<Option<Value>> {
    serde_json::to_value(value)
        .map(Some)
        .map_err(|e| LedgerError::Response(e.to_string()))
}
