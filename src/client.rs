use crate::config::ClientConfig;
use crate::error::{Result, SdkError};
use crate::ledger::{Ledger, NetworkInfo, SubmitStatus};
use crate::transaction::{Transaction, TransactionAttributes};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// HTTP client for a ledger gateway
#[derive(Clone)]
pub struct GatewayClient {
    base_url: String,
    client: Client,
}

impl GatewayClient {
    /// Create a new client
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            base_url: gateway_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a client with custom reqwest client
    pub fn with_client(gateway_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: gateway_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Create a client from validated configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(config.gateway_url.clone(), client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current transaction anchor
    pub async fn tx_anchor(&self) -> Result<String> {
        let url = format!("{}/tx_anchor", self.base_url);
        let anchor = self.client.get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(anchor)
    }

    /// Reward in winston for storing `bytes` of data, optionally transferring to `target`
    pub async fn price(&self, bytes: usize, target: Option<&str>) -> Result<String> {
        let url = match target {
            Some(target) if !target.is_empty() => {
                format!("{}/price/{}/{}", self.base_url, bytes, target)
            }
            _ => format!("{}/price/{}", self.base_url, bytes),
        };
        let price = self.client.get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_price(&price)
    }

    /// Get confirmation status of a transaction
    pub async fn get_transaction_status(&self, tx_id: &str) -> Result<TxStatus> {
        let url = format!("{}/tx/{}/status", self.base_url, tx_id);
        let response = self.client.get(&url).send().await?;

        match response.status().as_u16() {
            200 => {
                let body: TxStatusResponse = response.json().await?;
                Ok(TxStatus::Confirmed {
                    block_height: body.block_height,
                    block_id: body.block_indep_hash,
                    confirmations: body.number_of_confirmations,
                })
            }
            202 => Ok(TxStatus::Pending),
            404 => Ok(TxStatus::NotFound),
            other => Err(SdkError::Ledger(format!("unexpected status {} for tx {}", other, tx_id))),
        }
    }
}

#[async_trait]
impl Ledger for GatewayClient {
    async fn create_transaction(
        &self,
        attrs: TransactionAttributes,
        owner: &str,
    ) -> Result<Transaction> {
        let anchor = self.tx_anchor().await?;
        let reward = self.price(attrs.data.len(), attrs.target.as_deref()).await?;
        Ok(Transaction::draft(attrs, owner, anchor, reward))
    }

    async fn submit(&self, tx: &Transaction) -> Result<SubmitStatus> {
        let url = format!("{}/tx", self.base_url);
        let response = self.client.post(&url)
            .json(tx)
            .send()
            .await?;

        let status = SubmitStatus(response.status().as_u16());
        if !status.is_accepted() {
            tracing::warn!(tx = %tx.id, status = status.0, "gateway rejected transaction");
        }
        Ok(status)
    }

    async fn network_info(&self) -> Result<NetworkInfo> {
        let url = format!("{}/info", self.base_url);
        let info: NetworkInfo = self.client.get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(info)
    }
}

/// A price body is a bare winston integer.
fn parse_price(body: &str) -> Result<String> {
    let price = body.trim();
    if price.is_empty() || !price.chars().all(|c| c.is_ascii_digit()) {
        return Err(SdkError::Ledger(format!("unexpected price response: {}", price)));
    }
    Ok(price.to_string())
}

/// Confirmation status of a posted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    Pending,
    NotFound,
    Confirmed {
        block_height: u64,
        block_id: String,
        confirmations: u64,
    },
}

// Internal response types
#[derive(Deserialize)]
struct TxStatusResponse {
    block_height: u64,
    block_indep_hash: String,
    number_of_confirmations: u64,
}
