//! safe-relay command line.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI command
//!       │
//!       ▼
//!  ┌──────────┐   reads    ┌──────────────┐  JSON-RPC  ┌────────────┐
//!  │   safe   │──────────▶│  blockchain  │──────────▶│   ledger   │
//!  │ registry │           │  RpcRuntime  │           └────────────┘
//!  │ + gas    │           └──────────────┘
//!  └────┬─────┘
//!       │ calldata / estimates
//!       ▼
//!  ┌──────────┐  propose / poll  ┌──────────────┐
//!  │  relay   │─────────────────▶│   service    │──▶ Safe transaction service
//!  └──────────┘                  └──────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Bytes, U256};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use safe_relay::blockchain::{RpcRuntime, Runtime, Wallet};
use safe_relay::config::{load_config, RelayConfig};
use safe_relay::observability::{logging, metrics};
use safe_relay::relay::{RelayOptions, SafeRelaySigner, TransactionIntent};
use safe_relay::safe::address::{parse_address, parse_owner_address};
use safe_relay::safe::{gas, Operation, Safe};
use safe_relay::service::SafeServiceClient;

#[derive(Parser)]
#[command(name = "safe-relay")]
#[command(about = "Manage Safe owners and relay transactions through the Safe transaction service", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Safe address, overriding `relay.safe_address`.
    #[arg(short, long)]
    safe: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the Safe owners in on-chain order
    Owners,
    /// Show the confirmation threshold
    Threshold,
    /// Add an owner, optionally changing the threshold
    AddOwner {
        owner: String,
        #[arg(short, long)]
        threshold: Option<u64>,
        /// Propose the change instead of printing calldata
        #[arg(long)]
        propose: bool,
    },
    /// Remove an owner, optionally changing the threshold
    RemoveOwner {
        owner: String,
        #[arg(short, long)]
        threshold: Option<u64>,
        #[arg(long)]
        propose: bool,
    },
    /// Replace one owner with another
    SwapOwner {
        old_owner: String,
        new_owner: String,
        #[arg(long)]
        propose: bool,
    },
    /// Change the confirmation threshold
    ChangeThreshold {
        threshold: u64,
        #[arg(long)]
        propose: bool,
    },
    /// Estimate safeTxGas for a call made by the Safe
    EstimateGas {
        to: String,
        #[arg(long, default_value = "0")]
        value: U256,
        #[arg(long, default_value = "0x")]
        data: Bytes,
        #[arg(long)]
        delegate: bool,
    },
    /// Propose a transaction and wait for its execution
    Send {
        /// Destination; omit together with --create to deploy a contract
        to: Option<String>,
        #[arg(long, default_value = "0")]
        value: U256,
        #[arg(long, default_value = "0x")]
        data: Bytes,
        #[arg(long)]
        delegate: bool,
        /// Treat --data as init code and deploy it through CreateCall
        #[arg(long)]
        create: bool,
        /// Blocks the execution needs before returning
        #[arg(long)]
        confirmations: Option<u64>,
        /// Return right after the proposal is accepted
        #[arg(long)]
        no_wait: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let safe_address = parse_address(
        cli.safe
            .as_deref()
            .unwrap_or(config.relay.safe_address.as_str()),
    )?;
    let runtime: Arc<dyn Runtime> = Arc::new(RpcRuntime::new(config.runtime.clone()).await?);
    let safe = Safe::new(safe_address, Arc::clone(&runtime));
    let owners = safe.owner_manager();

    tracing::info!(safe = %safe_address, chain_id = config.runtime.chain_id, "safe-relay starting");

    let calldata = match cli.command {
        Commands::Owners => {
            for owner in owners.get_owners().await? {
                println!("{owner}");
            }
            return Ok(());
        }
        Commands::Threshold => {
            println!("{}", owners.get_threshold().await?);
            return Ok(());
        }
        Commands::EstimateGas {
            to,
            value,
            data,
            delegate,
        } => {
            let to = parse_owner_address(&to)?;
            let gas = gas::estimate_tx_gas(safe.contract(), to, value, &data, operation(delegate)).await?;
            println!("{gas}");
            return Ok(());
        }
        Commands::Send {
            to,
            value,
            data,
            delegate,
            create,
            confirmations,
            no_wait,
        } => {
            let intent = if create {
                TransactionIntent::Create {
                    init_code: data,
                    value,
                }
            } else {
                let to = to.ok_or("a destination is required unless --create is set")?;
                TransactionIntent::Call {
                    to: parse_owner_address(&to)?,
                    value,
                    data,
                    operation: operation(delegate),
                }
            };
            let relay = build_relay(&config, safe)?;
            return relay_intent(&relay, intent, confirmations, !no_wait).await;
        }
        Commands::AddOwner {
            owner,
            threshold,
            propose,
        } => (
            owners
                .encode_add_owner_with_threshold(parse_address(&owner)?, threshold)
                .await?,
            propose,
        ),
        Commands::RemoveOwner {
            owner,
            threshold,
            propose,
        } => (
            owners.encode_remove_owner(parse_address(&owner)?, threshold).await?,
            propose,
        ),
        Commands::SwapOwner {
            old_owner,
            new_owner,
            propose,
        } => (
            owners
                .encode_swap_owner(parse_address(&old_owner)?, parse_address(&new_owner)?)
                .await?,
            propose,
        ),
        Commands::ChangeThreshold { threshold, propose } => {
            (owners.encode_change_threshold(threshold).await?, propose)
        }
    };

    match calldata {
        (data, false) => println!("{data}"),
        (data, true) => {
            let intent = TransactionIntent::from(safe.self_call(data));
            let relay = build_relay(&config, safe)?;
            relay_intent(&relay, intent, None, false).await?;
        }
    }

    Ok(())
}

fn operation(delegate: bool) -> Operation {
    if delegate {
        Operation::DelegateCall
    } else {
        Operation::Call
    }
}

fn build_relay(
    config: &RelayConfig,
    safe: Safe,
) -> Result<SafeRelaySigner, Box<dyn std::error::Error>> {
    let wallet = Wallet::from_env()?;
    let service = SafeServiceClient::new(
        &config.service.url,
        Duration::from_secs(config.service.timeout_secs),
    )?
    .with_origin(config.service.origin.clone());
    let options = RelayOptions::from_settings(&config.relay, config.runtime.confirmation_blocks)?;

    Ok(SafeRelaySigner::new(
        safe,
        Arc::new(wallet),
        Arc::new(service),
        options,
    ))
}

async fn relay_intent(
    relay: &SafeRelaySigner,
    intent: TransactionIntent,
    confirmations: Option<u64>,
    wait: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = relay.send_transaction(intent).await?;
    println!("safeTxHash: {}", response.hash);
    println!("nonce:      {}", response.nonce);
    if !wait {
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, abandoning wait");
            ctrl_c.cancel();
        }
    });

    println!("Waiting for the owners to execute the transaction...");
    let receipt = response.wait(confirmations, &cancel).await?;
    println!("transaction: {}", receipt.receipt.transaction_hash);
    if let Some(block) = receipt.receipt.block_number {
        println!("block:       {block}");
    }
    println!("status:      {}", if receipt.receipt.status { "success" } else { "reverted" });
    println!("operation:   {:?}", receipt.operation);
    if let Some(created) = receipt.receipt.contract_address {
        println!("contract:    {created}");
    }
    Ok(())
}
