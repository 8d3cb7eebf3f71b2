//! Write, dry-run and read interactions.

use crate::builder::{build_interaction, prepare_interaction, InteractionOptions};
use crate::context::{ActiveTxRecord, EvaluationContext};
use crate::contract::{evaluate, ContractInfo, ContractSource, EvaluationResult, Interaction};
use crate::error::Result;
use crate::ledger::Ledger;
use crate::signer::Signer;
use crate::transaction::Transaction;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Inputs a dry run may reuse instead of fetching.
#[derive(Debug, Clone, Default)]
pub struct DryRunOptions {
    /// Contract state to evaluate against; latest state is read when absent.
    pub state: Option<Value>,
    /// Caller address; resolved from the signer when absent.
    pub caller: Option<String>,
    /// Already loaded contract.
    pub contract: Option<ContractInfo>,
}

impl DryRunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    pub fn with_contract(mut self, contract: ContractInfo) -> Self {
        self.contract = Some(contract);
        self
    }
}

/// Who a read is performed as.
#[derive(Clone, Copy)]
pub enum ReadCaller<'a> {
    /// Empty caller address and an unsigned candidate.
    Anonymous,
    /// Known address with an unsigned candidate.
    Address(&'a str),
    /// Address resolved from the signer, which also signs the candidate.
    Signer(&'a dyn Signer),
}

/// Entry point for contract interactions.
#[derive(Clone)]
pub struct Interactor {
    ledger: Arc<dyn Ledger>,
    contracts: Arc<dyn ContractSource>,
}

impl Interactor {
    pub fn new(ledger: Arc<dyn Ledger>, contracts: Arc<dyn ContractSource>) -> Self {
        Self { ledger, contracts }
    }

    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    /// Build, sign and post an interaction.
    ///
    /// Returns the transaction id, or `None` when the ledger does not accept it.
    pub async fn write(
        &self,
        signer: &dyn Signer,
        contract_id: &str,
        input: &Value,
        options: &InteractionOptions,
    ) -> Result<Option<String>> {
        let tx = build_interaction(self.ledger(), signer, contract_id, input, options).await?;
        let status = self.ledger.submit(&tx).await?;
        if !status.is_accepted() {
            warn!(
                contract = %contract_id,
                tx = %tx.id,
                status = status.0,
                "interaction not accepted"
            );
            return Ok(None);
        }
        debug!(contract = %contract_id, tx = %tx.id, "interaction submitted");
        Ok(Some(tx.id))
    }

    /// Evaluate a freshly built interaction locally without posting it.
    pub async fn dry_run_write(
        &self,
        signer: &dyn Signer,
        contract_id: &str,
        input: Value,
        dry_run: DryRunOptions,
        options: &InteractionOptions,
    ) -> Result<EvaluationResult> {
        let contract = self.contract_or_load(contract_id, dry_run.contract).await?;
        let state = self.state_or_read(contract_id, dry_run.state).await?;
        let caller = match dry_run.caller {
            Some(caller) => caller,
            None => signer.address().await?,
        };
        let tx = build_interaction(self.ledger(), signer, contract_id, &input, options).await?;
        self.evaluate_candidate(&contract, state, &tx, caller, input).await
    }

    /// Evaluate a caller-supplied transaction locally. The caller is used as given.
    pub async fn dry_run_write_custom(
        &self,
        tx: &Transaction,
        contract_id: &str,
        input: Value,
        dry_run: DryRunOptions,
    ) -> Result<EvaluationResult> {
        let contract = self.contract_or_load(contract_id, dry_run.contract).await?;
        let state = self.state_or_read(contract_id, dry_run.state).await?;
        let caller = dry_run.caller.unwrap_or_default();
        self.evaluate_candidate(&contract, state, tx, caller, input).await
    }

    /// Evaluate a query against the latest state and return only its result.
    pub async fn read(
        &self,
        caller: ReadCaller<'_>,
        contract_id: &str,
        input: Value,
        options: &InteractionOptions,
    ) -> Result<Value> {
        let contract = self.contracts.load_contract(contract_id).await?;
        let state = self.contracts.read_contract(contract_id, None).await?;
        let (caller, tx) = match caller {
            ReadCaller::Signer(signer) => {
                let address = signer.address().await?;
                let tx =
                    build_interaction(self.ledger(), signer, contract_id, &input, options).await?;
                (address, tx)
            }
            ReadCaller::Address(address) => {
                let tx =
                    prepare_interaction(self.ledger(), "", contract_id, &input, options).await?;
                (address.to_string(), tx)
            }
            ReadCaller::Anonymous => {
                let tx =
                    prepare_interaction(self.ledger(), "", contract_id, &input, options).await?;
                (String::new(), tx)
            }
        };
        let evaluation = self.evaluate_candidate(&contract, state, &tx, caller, input).await?;
        Ok(evaluation.result)
    }

    async fn contract_or_load(
        &self,
        contract_id: &str,
        supplied: Option<ContractInfo>,
    ) -> Result<ContractInfo> {
        match supplied {
            Some(contract) => Ok(contract),
            None => self.contracts.load_contract(contract_id).await,
        }
    }

    async fn state_or_read(&self, contract_id: &str, supplied: Option<Value>) -> Result<Value> {
        match supplied {
            Some(state) => Ok(state),
            None => self.contracts.read_contract(contract_id, None).await,
        }
    }

    /// Attach a record built from `tx` and the live tip, then run the handler.
    ///
    /// The tip is fetched on every call and is not reconciled with the height
    /// `state` was computed at.
    async fn evaluate_candidate(
        &self,
        contract: &ContractInfo,
        state: Value,
        tx: &Transaction,
        caller: String,
        input: Value,
    ) -> Result<EvaluationResult> {
        let tip = self.ledger.network_info().await?;
        let record = ActiveTxRecord::from_candidate(tx, &caller, &tip);
        debug!(
            contract = %contract.id,
            tx = %record.id,
            height = tip.height,
            "evaluating interaction"
        );

        let scoped = contract.context.scope(EvaluationContext::Active(record));
        let interaction = Interaction { input, caller };
        evaluate(contract.handler.as_ref(), &interaction, state, &scoped).await
    }
}
