// src/bin/weave-interact.rs
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use weave_interact::{
    build_interaction, decode_tags, ClientConfig, Ed25519Signer, GatewayClient, InteractionOptions,
    Ledger, Signer, Transaction, TxStatus,
};

#[derive(Parser)]
#[command(name = "weave-interact", about = "Contract interaction client", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Gateway URL (overrides WEAVE_GATEWAY_URL)
    #[arg(long, global = true)]
    gateway: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new signing key
    Keygen {
        /// Where to write the key file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Print the wallet address of a key file
    Address {
        #[arg(short, long)]
        key: PathBuf,
    },

    /// Show the gateway's current height and block
    Info,

    /// Show whether a posted transaction has been mined
    Status {
        /// Transaction id
        tx: String,
    },

    /// Print the tag map of a transaction JSON file
    Tags {
        /// Transaction file as posted to the gateway
        tx: PathBuf,
    },

    /// Sign and post an interaction
    Write {
        #[arg(short, long)]
        key: PathBuf,

        /// Contract id
        contract: String,

        /// Interaction input as JSON
        input: String,

        /// Extra tag as NAME=VALUE (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Transfer target address
        #[arg(long, requires = "quantity")]
        target: Option<String>,

        /// Winston amount sent to the target
        #[arg(long, requires = "target")]
        quantity: Option<String>,

        /// Build and print the transaction without posting it
        #[arg(long)]
        dry: bool,
    },
}

fn parse_tag(raw: &str) -> Result<(String, String)> {
    raw.split_once('=')
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .ok_or_else(|| anyhow!("tag must be NAME=VALUE: {}", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WEAVE_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(gateway) = cli.gateway {
        config.gateway_url = gateway;
    }
    let client = GatewayClient::from_config(&config)?;

    match cli.command {
        Commands::Keygen { out } => {
            if out.exists() {
                return Err(anyhow!("refusing to overwrite {}", out.display()));
            }
            let signer = Ed25519Signer::generate();
            signer.save(&out)?;
            println!("address: {}", signer.address().await?);
        }

        Commands::Address { key } => {
            let signer = Ed25519Signer::load(&key)?;
            println!("{}", signer.address().await?);
        }

        Commands::Info => {
            let info = client.network_info().await?;
            println!("height: {}", info.height);
            println!("current: {}", info.current);
        }

        Commands::Status { tx } => match client.get_transaction_status(&tx).await? {
            TxStatus::Confirmed { block_height, block_id, confirmations } => {
                println!("confirmed at {} ({})", block_height, block_id);
                println!("confirmations: {}", confirmations);
            }
            TxStatus::Pending => println!("pending"),
            TxStatus::NotFound => return Err(anyhow!("transaction {} not found", tx)),
        },

        Commands::Tags { tx } => {
            let body = fs::read_to_string(&tx)
                .with_context(|| format!("reading {}", tx.display()))?;
            let tx: Transaction = serde_json::from_str(&body)?;
            println!("{}", serde_json::to_string_pretty(&decode_tags(&tx.tags))?);
        }

        Commands::Write { key, contract, input, tags, target, quantity, dry } => {
            let signer = Ed25519Signer::load(&key)?;
            let input: serde_json::Value =
                serde_json::from_str(&input).context("input is not valid JSON")?;

            let mut options = InteractionOptions::new();
            for raw in &tags {
                let (name, value) = parse_tag(raw)?;
                options = options.with_tag(name, value);
            }
            if let (Some(target), Some(quantity)) = (target, quantity) {
                options = options.with_transfer(target, quantity);
            }

            let tx = build_interaction(&client, &signer, &contract, &input, &options).await?;
            if dry {
                println!("{}", serde_json::to_string_pretty(&tx)?);
                return Ok(());
            }

            let status = client.submit(&tx).await?;
            if status.is_accepted() {
                println!("{}", tx.id);
            } else {
                return Err(anyhow!("gateway did not accept {} (status {})", tx.id, status.0));
            }
        }
    }

    Ok(())
}
