//! Read-only ledger helpers handed to contract handlers.

use crate::error::{Result, SdkError};
use crate::signer::verify_signature;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

/// Winston per AR.
pub const WINSTON_PER_AR: u128 = 1_000_000_000_000;
const AR_DECIMALS: usize = 12;

/// Derive a wallet address from a base64url encoded owner public key.
pub fn owner_to_address(owner: &str) -> Result<String> {
    let key = URL_SAFE_NO_PAD.decode(owner)?;
    Ok(URL_SAFE_NO_PAD.encode(Sha256::digest(key)))
}

/// Convert a winston amount to an AR decimal string with trailing zeros trimmed.
pub fn winston_to_ar(winston: &str) -> Result<String> {
    let amount: u128 = winston
        .trim()
        .parse()
        .map_err(|_| SdkError::InvalidInput(format!("invalid winston amount: {}", winston)))?;
    let whole = amount / WINSTON_PER_AR;
    let frac = amount % WINSTON_PER_AR;
    if frac == 0 {
        return Ok(whole.to_string());
    }
    let frac = format!("{:0width$}", frac, width = AR_DECIMALS);
    Ok(format!("{}.{}", whole, frac.trim_end_matches('0')))
}

/// Convert an AR decimal string to winston. Digits past 12 decimals are rejected.
pub fn ar_to_winston(ar: &str) -> Result<String> {
    let invalid = || SdkError::InvalidInput(format!("invalid AR amount: {}", ar));
    let ar = ar.trim();
    let (whole, frac) = ar.split_once('.').unwrap_or((ar, ""));
    if (whole.is_empty() && frac.is_empty()) || frac.len() > AR_DECIMALS {
        return Err(invalid());
    }
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !digits(whole) || !digits(frac) {
        return Err(invalid());
    }
    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let frac: u128 = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = AR_DECIMALS)
            .parse()
            .map_err(|_| invalid())?
    };
    whole
        .checked_mul(WINSTON_PER_AR)
        .and_then(|w| w.checked_add(frac))
        .map(|w| w.to_string())
        .ok_or_else(invalid)
}

/// True when `quantity` parses as a winston amount greater than zero.
pub fn is_positive_winston(quantity: &str) -> bool {
    quantity.trim().parse::<u128>().map(|q| q > 0).unwrap_or(false)
}

/// Utility surface exposed to handlers through the execution context.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerUtils;

impl LedgerUtils {
    pub fn owner_to_address(&self, owner: &str) -> Result<String> {
        owner_to_address(owner)
    }

    pub fn sha256(&self, data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }

    /// Ed25519 check of `signature` over `data` by the base64url `owner` key.
    pub fn verify(&self, owner: &str, data: &[u8], signature: &[u8]) -> bool {
        verify_signature(owner, data, signature)
    }

    pub fn b64url_encode(&self, data: &[u8]) -> String {
        URL_SAFE_NO_PAD.encode(data)
    }

    pub fn b64url_decode(&self, data: &str) -> Result<Vec<u8>> {
        Ok(URL_SAFE_NO_PAD.decode(data)?)
    }

    pub fn to_hex(&self, data: &[u8]) -> String {
        hex::encode(data)
    }

    pub fn winston_to_ar(&self, winston: &str) -> Result<String> {
        winston_to_ar(winston)
    }

    pub fn ar_to_winston(&self, ar: &str) -> Result<String> {
        ar_to_winston(ar)
    }
}
