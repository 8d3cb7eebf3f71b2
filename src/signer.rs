use crate::error::{Result, SdkError};
use crate::transaction::Transaction;
use crate::utils::owner_to_address;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::fs;
use std::path::Path;

/// Signing capability for interaction transactions.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Base64url encoded public key placed in the transaction `owner` field.
    fn owner(&self) -> String;

    /// Wallet address of this signer.
    async fn address(&self) -> Result<String> {
        owner_to_address(&self.owner())
    }

    /// Sign `tx` in place, assigning its id.
    async fn sign(&self, tx: &mut Transaction) -> Result<()>;
}

/// Ed25519 keypair signer.
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(secret),
        }
    }

    /// Load from a hex encoded 64 byte keypair (secret || public).
    pub fn from_keypair_hex(keypair_hex: &str) -> Result<Self> {
        let bytes = hex::decode(keypair_hex.trim())
            .map_err(|_| SdkError::Signing("Invalid hex private key".into()))?;
        let bytes: [u8; 64] = bytes
            .try_into()
            .map_err(|_| SdkError::Signing("Private key must be 64 bytes (keypair)".into()))?;
        let key = SigningKey::from_keypair_bytes(&bytes)
            .map_err(|e| SdkError::Signing(format!("Invalid private key: {}", e)))?;
        Ok(Self { key })
    }

    pub fn to_keypair_hex(&self) -> String {
        hex::encode(self.key.to_keypair_bytes())
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Load a key file written by [`Ed25519Signer::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| {
                SdkError::Signing(format!("failed to read key file {}: {}", path.display(), e))
            })?;
        Self::from_keypair_hex(&contents)
    }

    /// Write the keypair as hex to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, self.to_keypair_hex())
        };
        write().map_err(|e| {
            SdkError::Signing(format!("failed to write key file {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl Signer for Ed25519Signer {
    fn owner(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.key.verifying_key().to_bytes())
    }

    async fn sign(&self, tx: &mut Transaction) -> Result<()> {
        let owner = self.owner();
        if !tx.owner.is_empty() && tx.owner != owner {
            return Err(SdkError::Signing(
                "transaction owner does not match signing key".into(),
            ));
        }
        tx.owner = owner;
        let signature = self.key.sign(&tx.signature_data());
        tx.set_signature(&signature.to_bytes());
        Ok(())
    }
}

/// Verify a signed transaction's Ed25519 signature against its owner.
/// Returns false on any decoding error.
pub fn verify_transaction(tx: &Transaction) -> bool {
    let Ok(sig) = URL_SAFE_NO_PAD.decode(&tx.signature) else {
        return false;
    };
    verify_signature(&tx.owner, &tx.signature_data(), &sig)
}

/// Verify an Ed25519 `signature` over `data` by the base64url encoded `owner` key.
pub fn verify_signature(owner: &str, data: &[u8], signature: &[u8]) -> bool {
    let Ok(owner) = URL_SAFE_NO_PAD.decode(owner) else {
        return false;
    };
    let Ok(owner) = <[u8; 32]>::try_from(owner) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&owner) else {
        return false;
    };
    let Ok(sig) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    key.verify(data, &Signature::from_bytes(&sig)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionAttributes;
    use ed25519_dalek::Signer as _;

    #[tokio::test]
    async fn test_sign_and_verify() {
        let signer = Ed25519Signer::from_bytes(&[1u8; 32]);
        let attrs = TransactionAttributes::with_data(b"42".to_vec());
        let mut tx = Transaction::draft(attrs, signer.owner(), "anchor", "10");
        tx.add_tag("Contract", "abc");
        signer.sign(&mut tx).await.unwrap();

        assert!(tx.is_signed());
        assert!(!tx.id.is_empty());
        assert!(verify_transaction(&tx));

        tx.add_tag("Input", "{}");
        assert!(!verify_transaction(&tx));
    }

    #[tokio::test]
    async fn test_signature_checks_out_against_verifying_key() {
        let signer = Ed25519Signer::from_bytes(&[2u8; 32]);
        let mut tx = Transaction::draft(TransactionAttributes::default(), "", "", "0");
        signer.sign(&mut tx).await.unwrap();

        let sig = URL_SAFE_NO_PAD.decode(&tx.signature).unwrap();
        let sig = Signature::from_bytes(&<[u8; 64]>::try_from(sig).unwrap());
        assert!(signer.verifying_key().verify(&tx.signature_data(), &sig).is_ok());
        assert_eq!(
            URL_SAFE_NO_PAD.decode(&tx.owner).unwrap(),
            signer.verifying_key().to_bytes().to_vec()
        );
    }

    #[test]
    fn test_verify_signature_rejects_wrong_key_and_garbage() {
        let signer = Ed25519Signer::from_bytes(&[6u8; 32]);
        let other = Ed25519Signer::from_bytes(&[7u8; 32]);
        let sig = signer.key.sign(b"payload").to_bytes();

        assert!(verify_signature(&signer.owner(), b"payload", &sig));
        assert!(!verify_signature(&signer.owner(), b"tampered", &sig));
        assert!(!verify_signature(&other.owner(), b"payload", &sig));
        assert!(!verify_signature("***", b"payload", &sig));
        assert!(!verify_signature(&signer.owner(), b"payload", &sig[..10]));
    }

    #[tokio::test]
    async fn test_sign_rejects_foreign_owner() {
        let signer = Ed25519Signer::from_bytes(&[1u8; 32]);
        let mut tx = Transaction::draft(TransactionAttributes::default(), "someone-else", "", "0");
        assert!(matches!(signer.sign(&mut tx).await, Err(SdkError::Signing(_))));
    }

    #[tokio::test]
    async fn test_address_matches_owner() {
        let signer = Ed25519Signer::generate();
        let address = signer.address().await.unwrap();
        assert_eq!(address, owner_to_address(&signer.owner()).unwrap());
    }

    #[test]
    fn test_keypair_hex_roundtrip() {
        let signer = Ed25519Signer::from_bytes(&[9u8; 32]);
        let restored = Ed25519Signer::from_keypair_hex(&signer.to_keypair_hex()).unwrap();
        assert_eq!(restored.owner(), signer.owner());
        assert!(Ed25519Signer::from_keypair_hex("zz").is_err());
    }

    #[test]
    fn test_key_file_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("keys").join("wallet.key");
        let signer = Ed25519Signer::generate();
        signer.save(&path).unwrap();

        let loaded = Ed25519Signer::load(&path).unwrap();
        assert_eq!(loaded.owner(), signer.owner());
        assert!(Ed25519Signer::load(&dir.path().join("missing.key")).is_err());
    }
}
