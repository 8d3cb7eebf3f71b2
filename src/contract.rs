//! Contract collaborators: handler code, contract loading and the single
//! evaluation step.

use crate::context::{ExecutionContext, ScopedContext};
use crate::error::{Result, SdkError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Argument passed to a contract handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub input: Value,
    pub caller: String,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Handler return value; `null` for pure state transitions.
    pub result: Value,
    pub state: Value,
}

/// Deterministic contract code.
///
/// `handle` mutates `state` in place for writes and returns `Some(value)` for
/// reads. Transaction and block facts are only reachable through `ctx`.
#[async_trait]
pub trait ContractHandler: Send + Sync {
    async fn handle(
        &self,
        state: &mut Value,
        interaction: &Interaction,
        ctx: &ScopedContext<'_>,
    ) -> anyhow::Result<Option<Value>>;
}

/// A loaded contract.
#[derive(Clone)]
pub struct ContractInfo {
    pub id: String,
    pub src_tx_id: String,
    pub handler: Arc<dyn ContractHandler>,
    pub context: ExecutionContext,
}

impl std::fmt::Debug for ContractInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractInfo")
            .field("id", &self.id)
            .field("src_tx_id", &self.src_tx_id)
            .finish_non_exhaustive()
    }
}

/// Resolves contract code and replays accumulated state.
#[async_trait]
pub trait ContractSource: Send + Sync {
    async fn load_contract(&self, contract_id: &str) -> Result<ContractInfo>;

    /// State after replaying history up to `height`, or the latest state for `None`.
    async fn read_contract(&self, contract_id: &str, height: Option<u64>) -> Result<Value>;
}

/// Run one interaction against `state`.
///
/// Handler errors propagate; an [`SdkError`] raised inside the handler (for
/// example [`SdkError::NoActiveTransaction`]) comes back as itself.
pub async fn evaluate(
    handler: &dyn ContractHandler,
    interaction: &Interaction,
    mut state: Value,
    ctx: &ScopedContext<'_>,
) -> Result<EvaluationResult> {
    match handler.handle(&mut state, interaction, ctx).await {
        Ok(result) => Ok(EvaluationResult {
            result: result.unwrap_or(Value::Null),
            state,
        }),
        Err(err) => Err(match err.downcast::<SdkError>() {
            Ok(sdk) => sdk,
            Err(other) => SdkError::Contract(other),
        }),
    }
}
