use crate::tags::{decode_tags, find_tag_value, RawTag, TagMap};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Transaction format version written by this client.
pub const TX_FORMAT: u8 = 2;

/// A ledger transaction, as drafted, signed and posted by this client.
///
/// Amounts (`quantity`, `reward`) are winston decimal strings. `data` is the
/// base64url encoded payload. `id` stays empty until the transaction is signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub format: u8,
    pub id: String,
    pub last_tx: String,
    pub owner: String,
    pub tags: Vec<RawTag>,
    pub target: String,
    pub quantity: String,
    pub data: String,
    pub data_size: String,
    pub reward: String,
    pub signature: String,
}

/// Fields the caller chooses when drafting a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionAttributes {
    pub data: Vec<u8>,
    pub target: Option<String>,
    pub quantity: Option<String>,
}

impl TransactionAttributes {
    pub fn with_data(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    /// Data transaction that also moves `quantity` winston to `target`.
    pub fn with_transfer(
        data: impl Into<Vec<u8>>,
        target: impl Into<String>,
        quantity: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            target: Some(target.into()),
            quantity: Some(quantity.into()),
        }
    }
}

impl Transaction {
    /// Draft an unsigned transaction. `last_tx` and `reward` come from the ledger.
    pub fn draft(
        attrs: TransactionAttributes,
        owner: impl Into<String>,
        last_tx: impl Into<String>,
        reward: impl Into<String>,
    ) -> Self {
        Self {
            format: TX_FORMAT,
            id: String::new(),
            last_tx: last_tx.into(),
            owner: owner.into(),
            tags: Vec::new(),
            target: attrs.target.unwrap_or_default(),
            quantity: attrs.quantity.unwrap_or_else(|| "0".to_string()),
            data_size: attrs.data.len().to_string(),
            data: URL_SAFE_NO_PAD.encode(&attrs.data),
            reward: reward.into(),
            signature: String::new(),
        }
    }

    pub fn add_tag(&mut self, name: &str, value: &str) {
        self.tags.push(RawTag::encode(name, value));
    }

    /// Tags folded the same way a replay folds a mined record's tags.
    pub fn decoded_tags(&self) -> TagMap {
        decode_tags(&self.tags)
    }

    pub fn get_tag(&self, name: &str) -> Option<String> {
        find_tag_value(&self.tags, name)
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// Canonical bytes covered by the signature. Every field is length-prefixed.
    pub fn signature_data(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hash_field(&mut hasher, self.format.to_string().as_bytes());
        hash_field(&mut hasher, self.owner.as_bytes());
        hash_field(&mut hasher, self.target.as_bytes());
        hash_field(&mut hasher, self.quantity.as_bytes());
        hash_field(&mut hasher, self.reward.as_bytes());
        hash_field(&mut hasher, self.last_tx.as_bytes());
        hash_field(&mut hasher, &(self.tags.len() as u64).to_be_bytes());
        for tag in &self.tags {
            hash_field(&mut hasher, tag.name.as_bytes());
            hash_field(&mut hasher, tag.value.as_bytes());
        }
        hash_field(&mut hasher, self.data_size.as_bytes());
        hash_field(&mut hasher, self.data.as_bytes());
        hasher.finalize().to_vec()
    }

    /// Record a signature and derive the transaction id from it.
    pub fn set_signature(&mut self, signature: &[u8]) {
        self.signature = URL_SAFE_NO_PAD.encode(signature);
        self.id = URL_SAFE_NO_PAD.encode(Sha256::digest(signature));
    }
}

fn hash_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_defaults() {
        let attrs = TransactionAttributes::with_data(b"1234".to_vec());
        let tx = Transaction::draft(attrs, "owner", "anchor", "42");
        assert_eq!(tx.quantity, "0");
        assert_eq!(tx.target, "");
        assert_eq!(tx.data_size, "4");
        assert_eq!(tx.data, "MTIzNA");
        assert!(!tx.is_signed());
        assert!(tx.id.is_empty());
    }

    #[test]
    fn test_tags_round_through_codec() {
        let mut tx = Transaction::draft(TransactionAttributes::default(), "", "", "0");
        tx.add_tag("Contract", "abc");
        tx.add_tag("Contract", "def");
        assert_eq!(tx.get_tag("Contract").as_deref(), Some("abc"));
        assert_eq!(tx.decoded_tags().get("Contract").unwrap().values(), vec!["abc", "def"]);
    }

    #[test]
    fn test_signature_data_covers_tags() {
        let mut a = Transaction::draft(TransactionAttributes::default(), "o", "", "0");
        let b = a.clone();
        a.add_tag("k", "v");
        assert_ne!(a.signature_data(), b.signature_data());
    }

    #[test]
    fn test_id_derived_from_signature() {
        let mut tx = Transaction::draft(TransactionAttributes::default(), "o", "", "0");
        tx.set_signature(&[7u8; 64]);
        assert!(tx.is_signed());
        assert_eq!(tx.id, URL_SAFE_NO_PAD.encode(Sha256::digest([7u8; 64])));
    }
}
