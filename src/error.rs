use thiserror::Error;

/// SDK result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// Errors surfaced by the interaction layer
#[derive(Debug, Error)]
pub enum SdkError {
    /// The interaction input was missing or falsy.
    #[error("Input should be a truthy value: {0}")]
    InvalidInput(String),

    /// Transaction or block facts were queried with no active transaction attached.
    #[error("No current Tx")]
    NoActiveTransaction,

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Failed to load contract: {0}")]
    ContractLoad(String),

    /// Error raised by contract handler code.
    #[error(transparent)]
    Contract(anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
