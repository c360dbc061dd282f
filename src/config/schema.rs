//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::safe::contracts::DEFAULT_CREATE_CALL_ADDRESS;

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Ledger runtime (JSON-RPC) settings.
    pub runtime: RuntimeConfig,

    /// Coordination service settings.
    pub service: ServiceConfig,

    /// Relay behaviour.
    pub relay: RelaySettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Blocks a receipt needs (including its own) before a wait resolves.
    pub confirmation_blocks: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
        }
    }
}

/// Coordination service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the Safe transaction service.
    pub url: String,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,

    /// Optional origin tag attached to proposals.
    pub origin: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: "https://safe-transaction-mainnet.safe.global".to_string(),
            timeout_secs: 30,
            origin: None,
        }
    }
}

/// Relay behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Address of the Safe to operate on.
    pub safe_address: String,

    /// Delay between status polls in milliseconds.
    pub polling_delay_ms: u64,

    /// CreateCall library used for contract-creation intents.
    pub create_call_address: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            safe_address: String::new(),
            polling_delay_ms: 5_000,
            create_call_address: DEFAULT_CREATE_CALL_ADDRESS.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the pretty format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
