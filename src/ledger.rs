use crate::error::Result;
use crate::transaction::{Transaction, TransactionAttributes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Live network tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub height: u64,
    /// Id of the block at `height`.
    pub current: String,
}

/// HTTP status returned by the ledger when posting a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitStatus(pub u16);

impl SubmitStatus {
    /// Only a plain 200 counts as accepted.
    pub fn is_accepted(&self) -> bool {
        self.0 == 200
    }
}

/// Ledger client capabilities the interaction layer consumes.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Draft an unsigned transaction for `owner`, filling in the anchor and reward.
    async fn create_transaction(
        &self,
        attrs: TransactionAttributes,
        owner: &str,
    ) -> Result<Transaction>;

    /// Post a signed transaction. Non-success statuses are returned, not raised.
    async fn submit(&self, tx: &Transaction) -> Result<SubmitStatus>;

    async fn network_info(&self) -> Result<NetworkInfo>;
}
