// tests/common/mod.rs
// In-memory ledger, signer and contract fakes shared by integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use weave_interact::context::ScopedContext;
use weave_interact::transaction::TransactionAttributes;
use weave_interact::{
    ContractHandler, ContractInfo, ContractSource, ExecutionContext, Interaction, Ledger,
    NetworkInfo, Result, SdkError, Signer, SubmitStatus, Transaction,
};

pub const CONTRACT_ID: &str = "counter-contract";

pub struct FakeLedger {
    pub status: u16,
    pub tip: NetworkInfo,
    pub created: AtomicUsize,
    pub submitted: Mutex<Vec<Transaction>>,
}

impl FakeLedger {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            tip: NetworkInfo {
                height: 1200,
                current: "tip-block".into(),
            },
            created: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn create_transaction(
        &self,
        attrs: TransactionAttributes,
        owner: &str,
    ) -> Result<Transaction> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Transaction::draft(attrs, owner, "anchor-1", "1000"))
    }

    async fn submit(&self, tx: &Transaction) -> Result<SubmitStatus> {
        self.submitted.lock().unwrap().push(tx.clone());
        Ok(SubmitStatus(self.status))
    }

    async fn network_info(&self) -> Result<NetworkInfo> {
        Ok(self.tip.clone())
    }
}

/// Signer whose key material never works.
pub struct BrokenSigner {
    pub attempts: AtomicUsize,
}

impl BrokenSigner {
    pub fn new() -> Self {
        Self {
            attempts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Signer for BrokenSigner {
    fn owner(&self) -> String {
        "broken-owner".into()
    }

    async fn address(&self) -> Result<String> {
        Ok("broken-address".into())
    }

    async fn sign(&self, _tx: &mut Transaction) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SdkError::Signing("hardware wallet disconnected".into()))
    }
}

/// Counter contract exercising every part of the context.
pub struct CounterHandler;

#[async_trait]
impl ContractHandler for CounterHandler {
    async fn handle(
        &self,
        state: &mut Value,
        interaction: &Interaction,
        ctx: &ScopedContext<'_>,
    ) -> anyhow::Result<Option<Value>> {
        let function = interaction.input["function"].as_str().unwrap_or_default();
        match function {
            "increment" => {
                let by = interaction.input["by"].as_u64().unwrap_or(1);
                let count = state["count"].as_u64().unwrap_or(0) + by;
                state["count"] = json!(count);
                state["last_tx"] = json!(ctx.transaction().id()?);
                state["last_caller"] = json!(interaction.caller);
                state["last_height"] = json!(ctx.block().height()?);
                Ok(None)
            }
            "get" => Ok(Some(state["count"].clone())),
            "context" => {
                let tx = ctx.transaction();
                Ok(Some(json!({
                    "id": tx.id()?,
                    "owner": tx.owner()?,
                    "target": tx.target()?,
                    "quantity": tx.quantity()?,
                    "reward": tx.reward()?,
                    "tags": serde_json::to_value(tx.tags()?)?,
                    "height": ctx.block().height()?,
                    "block": ctx.block().indep_hash()?,
                    "dry_running": ctx.is_dry_running(),
                })))
            }
            "foreign" => {
                let other = ctx.read_contract_state("other-contract", None).await?;
                Ok(Some(other))
            }
            "fail" => anyhow::bail!("counter refuses"),
            other => anyhow::bail!("unknown function {}", other),
        }
    }
}

/// Contract source serving the counter contract with a fixed latest state.
#[derive(Clone)]
pub struct FakeSource {
    pub state: Value,
    pub loads: Arc<AtomicUsize>,
    pub reads: Arc<Mutex<Vec<(String, Option<u64>)>>>,
}

impl FakeSource {
    pub fn new(state: Value) -> Self {
        Self {
            state,
            loads: Arc::new(AtomicUsize::new(0)),
            reads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> Vec<(String, Option<u64>)> {
        self.reads.lock().unwrap().clone()
    }

    pub fn contract(&self) -> ContractInfo {
        ContractInfo {
            id: CONTRACT_ID.into(),
            src_tx_id: "counter-src".into(),
            handler: Arc::new(CounterHandler),
            context: ExecutionContext::new(CONTRACT_ID, Arc::new(self.clone())),
        }
    }
}

#[async_trait]
impl ContractSource for FakeSource {
    async fn load_contract(&self, contract_id: &str) -> Result<ContractInfo> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if contract_id != CONTRACT_ID {
            return Err(SdkError::ContractLoad(format!("unknown contract {}", contract_id)));
        }
        Ok(self.contract())
    }

    async fn read_contract(&self, contract_id: &str, height: Option<u64>) -> Result<Value> {
        self.reads.lock().unwrap().push((contract_id.to_string(), height));
        if contract_id == CONTRACT_ID {
            Ok(self.state.clone())
        } else {
            Ok(json!({ "foreign": contract_id, "height": height }))
        }
    }
}
