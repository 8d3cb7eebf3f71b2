pub mod builder;
pub mod client;
pub mod config;
pub mod context;
pub mod contract;
pub mod error;
pub mod interact;
pub mod ledger;
pub mod signer;
pub mod tags;
pub mod transaction;
pub mod utils;

pub use builder::{build_interaction, InteractionOptions};
pub use client::{GatewayClient, TxStatus};
pub use config::ClientConfig;
pub use context::{ActiveTxRecord, EvaluationContext, ExecutionContext, ScopedContext};
pub use contract::{ContractHandler, ContractInfo, ContractSource, EvaluationResult, Interaction};
pub use error::{Result, SdkError};
pub use interact::{DryRunOptions, Interactor, ReadCaller};
pub use ledger::{Ledger, NetworkInfo, SubmitStatus};
pub use signer::{Ed25519Signer, Signer};
pub use tags::{decode_tags, find_tag_value, format_tags, RawTag, Tag, TagMap, TagValue};
pub use transaction::Transaction;

/// SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::InteractionOptions;
    pub use crate::context::{EvaluationContext, ExecutionContext, ScopedContext};
    pub use crate::contract::*;
    pub use crate::error::{Result, SdkError};
    pub use crate::interact::{DryRunOptions, Interactor, ReadCaller};
    pub use crate::ledger::Ledger;
    pub use crate::signer::Signer;
    pub use crate::tags::{Tag, TagMap, TagValue};
}
