//! Interaction transaction construction.

use crate::error::{Result, SdkError};
use crate::ledger::Ledger;
use crate::signer::Signer;
use crate::tags::Tag;
use crate::transaction::{Transaction, TransactionAttributes};
use crate::utils::is_positive_winston;
use rand::Rng;
use serde_json::Value;

pub const APP_NAME_TAG: &str = "App-Name";
pub const APP_NAME: &str = "SmartWeaveAction";
pub const APP_VERSION_TAG: &str = "App-Version";
pub const APP_VERSION: &str = "0.3.0";
pub const CONTRACT_TAG: &str = "Contract";
pub const INPUT_TAG: &str = "Input";

/// Extra tags and optional value transfer attached to an interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionOptions {
    pub tags: Vec<Tag>,
    pub target: Option<String>,
    /// Winston amount sent to `target`.
    pub quantity: Option<String>,
}

impl InteractionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(name, value));
        self
    }

    pub fn with_transfer(mut self, target: impl Into<String>, quantity: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self.quantity = Some(quantity.into());
        self
    }

    /// Target and quantity, only when both describe a real transfer.
    pub fn transfer(&self) -> Option<(&str, &str)> {
        let target = self.target.as_deref().filter(|t| !t.is_empty())?;
        let quantity = self.quantity.as_deref().filter(|q| is_positive_winston(q))?;
        Some((target, quantity))
    }
}

/// JavaScript-style truthiness of an input payload.
pub fn is_truthy(input: &Value) -> bool {
    match input {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn uniqueness_padding() -> Vec<u8> {
    format!("{:04}", rand::thread_rng().gen_range(0..10_000u32)).into_bytes()
}

/// Build and sign an interaction transaction for `contract_id`. Does not submit it.
pub async fn build_interaction(
    ledger: &dyn Ledger,
    signer: &dyn Signer,
    contract_id: &str,
    input: &Value,
    options: &InteractionOptions,
) -> Result<Transaction> {
    let mut tx = prepare_interaction(ledger, &signer.owner(), contract_id, input, options).await?;
    signer.sign(&mut tx).await?;
    tracing::debug!(contract = %contract_id, tx = %tx.id, "interaction signed");
    Ok(tx)
}

/// Build the unsigned interaction transaction.
///
/// Caller tags come first, then the four protocol tags in fixed order:
/// app name, app version, contract id and the JSON input.
pub async fn prepare_interaction(
    ledger: &dyn Ledger,
    owner: &str,
    contract_id: &str,
    input: &Value,
    options: &InteractionOptions,
) -> Result<Transaction> {
    if !is_truthy(input) {
        return Err(SdkError::InvalidInput(input.to_string()));
    }
    let input_json = serde_json::to_string(input)?;

    let attrs = match options.transfer() {
        Some((target, quantity)) => {
            TransactionAttributes::with_transfer(uniqueness_padding(), target, quantity)
        }
        None => TransactionAttributes::with_data(uniqueness_padding()),
    };
    let mut tx = ledger.create_transaction(attrs, owner).await?;

    for tag in &options.tags {
        tx.add_tag(&tag.name, &tag.value);
    }
    tx.add_tag(APP_NAME_TAG, APP_NAME);
    tx.add_tag(APP_VERSION_TAG, APP_VERSION);
    tx.add_tag(CONTRACT_TAG, contract_id);
    tx.add_tag(INPUT_TAG, &input_json);

    Ok(tx)
}
