//! Execution context observed by contract handlers.
//!
//! An [`ExecutionContext`] is created once per contract load. Every evaluation
//! scopes it with its own [`EvaluationContext`], producing a call-local
//! [`ScopedContext`] that is passed to the handler explicitly. Nothing is
//! written back onto the shared context, so evaluations against the same
//! loaded contract cannot observe each other's transaction.

use crate::contract::ContractSource;
use crate::error::{Result, SdkError};
use crate::ledger::NetworkInfo;
use crate::tags::{decode_tags, RawTag, TagMap};
use crate::transaction::Transaction;
use crate::utils::LedgerUtils;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinstonAmount {
    pub winston: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub height: u64,
    pub id: String,
}

/// Snapshot of the transaction and block a handler observes for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveTxRecord {
    pub id: String,
    pub owner: OwnerRef,
    pub recipient: String,
    pub tags: TagMap,
    pub fee: WinstonAmount,
    pub quantity: WinstonAmount,
    pub block: BlockRef,
}

/// An interaction as returned by a ledger query once mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinedInteraction {
    pub id: String,
    pub owner: OwnerRef,
    pub recipient: String,
    pub tags: Vec<RawTag>,
    pub fee: WinstonAmount,
    pub quantity: WinstonAmount,
    pub block: BlockRef,
}

impl ActiveTxRecord {
    /// Synthetic record for a candidate that has not been mined. The owner
    /// address is the resolved caller and the block is the live tip.
    pub fn from_candidate(tx: &Transaction, caller: &str, tip: &NetworkInfo) -> Self {
        Self {
            id: tx.id.clone(),
            owner: OwnerRef {
                address: caller.to_string(),
            },
            recipient: tx.target.clone(),
            tags: tx.decoded_tags(),
            fee: WinstonAmount {
                winston: tx.reward.clone(),
            },
            quantity: WinstonAmount {
                winston: tx.quantity.clone(),
            },
            block: BlockRef {
                height: tip.height,
                id: tip.current.clone(),
            },
        }
    }

    /// Record a replay builds from a mined interaction.
    pub fn from_mined(mined: &MinedInteraction) -> Self {
        Self {
            id: mined.id.clone(),
            owner: mined.owner.clone(),
            recipient: mined.recipient.clone(),
            tags: decode_tags(&mined.tags),
            fee: mined.fee.clone(),
            quantity: mined.quantity.clone(),
            block: mined.block.clone(),
        }
    }
}

/// Whether an evaluation has a transaction attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EvaluationContext {
    #[default]
    Unset,
    Active(ActiveTxRecord),
}

impl EvaluationContext {
    /// True when no transaction is attached.
    pub fn is_dry_running(&self) -> bool {
        matches!(self, EvaluationContext::Unset)
    }

    pub fn active(&self) -> Result<&ActiveTxRecord> {
        match self {
            EvaluationContext::Active(record) => Ok(record),
            EvaluationContext::Unset => Err(SdkError::NoActiveTransaction),
        }
    }
}

impl From<ActiveTxRecord> for EvaluationContext {
    fn from(record: ActiveTxRecord) -> Self {
        EvaluationContext::Active(record)
    }
}

/// Per-contract facade, shared by every evaluation of that contract.
#[derive(Clone)]
pub struct ExecutionContext {
    contract_id: String,
    contracts: Arc<dyn ContractSource>,
}

impl ExecutionContext {
    pub fn new(contract_id: impl Into<String>, contracts: Arc<dyn ContractSource>) -> Self {
        Self {
            contract_id: contract_id.into(),
            contracts,
        }
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    /// Bind an evaluation context for the duration of one call.
    pub fn scope(&self, evaluation: EvaluationContext) -> ScopedContext<'_> {
        ScopedContext {
            global: self,
            evaluation,
        }
    }
}

/// What a handler sees during one evaluation.
pub struct ScopedContext<'a> {
    global: &'a ExecutionContext,
    evaluation: EvaluationContext,
}

impl<'a> ScopedContext<'a> {
    pub fn is_dry_running(&self) -> bool {
        self.evaluation.is_dry_running()
    }

    pub fn evaluation(&self) -> &EvaluationContext {
        &self.evaluation
    }

    /// Id of the contract being evaluated.
    pub fn contract_id(&self) -> &str {
        self.global.contract_id()
    }

    pub fn transaction(&self) -> TransactionView<'_> {
        TransactionView(&self.evaluation)
    }

    pub fn block(&self) -> BlockView<'_> {
        BlockView(&self.evaluation)
    }

    pub fn utils(&self) -> LedgerUtils {
        LedgerUtils
    }

    /// Read another contract's state.
    ///
    /// Without an explicit height this reads the latest state while dry
    /// running, and the state as of the active block otherwise.
    pub async fn read_contract_state(
        &self,
        contract_id: &str,
        height: Option<u64>,
    ) -> Result<Value> {
        let height = match height {
            Some(height) => Some(height),
            None if self.is_dry_running() => None,
            None => Some(self.block().height()?),
        };
        tracing::debug!(contract = %contract_id, ?height, "reading foreign contract state");
        self.global.contracts.read_contract(contract_id, height).await
    }
}

/// Transaction facts of the active record.
pub struct TransactionView<'a>(&'a EvaluationContext);

impl<'a> TransactionView<'a> {
    pub fn id(&self) -> Result<&'a str> {
        Ok(&self.0.active()?.id)
    }

    /// Owner wallet address.
    pub fn owner(&self) -> Result<&'a str> {
        Ok(&self.0.active()?.owner.address)
    }

    pub fn target(&self) -> Result<&'a str> {
        Ok(&self.0.active()?.recipient)
    }

    pub fn tags(&self) -> Result<&'a TagMap> {
        Ok(&self.0.active()?.tags)
    }

    /// Winston transferred to the target.
    pub fn quantity(&self) -> Result<&'a str> {
        Ok(&self.0.active()?.quantity.winston)
    }

    /// Winston fee paid.
    pub fn reward(&self) -> Result<&'a str> {
        Ok(&self.0.active()?.fee.winston)
    }
}

/// Block facts of the active record.
pub struct BlockView<'a>(&'a EvaluationContext);

impl<'a> BlockView<'a> {
    pub fn height(&self) -> Result<u64> {
        Ok(self.0.active()?.block.height)
    }

    pub fn indep_hash(&self) -> Result<&'a str> {
        Ok(&self.0.active()?.block.id)
    }
}
