//! JSON-RPC runtime client with timeout and failover handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoints (primary + failovers)
//! - Serve calls, dry-runs, gas estimates and receipts for the Safe layer
//! - Keep EVM reverts distinct from transport failures
//! - Handle timeouts and network errors gracefully

use alloy::network::TransactionBuilder;
use alloy::primitives::TxHash;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::{TransportError, TransportResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::runtime::Runtime;
use crate::blockchain::types::{
    BlockTag, BlockchainError, BlockchainResult, CallRequest, Receipt, RuntimeConfig,
    SimulationOutcome,
};
use crate::observability::metrics;
use crate::resilience::timeouts::with_timeout;

/// JSON-RPC error code geth/anvil use for "execution reverted".
const EXECUTION_REVERTED_CODE: i64 = 3;
const METHOD_NOT_FOUND_CODE: i64 = -32601;

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Runtime backed by one or more JSON-RPC providers.
#[derive(Clone)]
pub struct RpcRuntime {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Configuration.
    config: RuntimeConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl RpcRuntime {
    /// Create a new runtime client.
    ///
    /// Chain ID verification failures are logged, not fatal, so the client can
    /// still be built while the endpoint is down.
    pub async fn new(config: RuntimeConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as DynProvider);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as DynProvider);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            providers,
            config: config.clone(),
            timeout_duration,
        };

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %config.rpc_url,
                    chain_id = config.chain_id,
                    "Runtime client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Runtime client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let actual = self.get_chain_id().await?;
        if actual != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual,
            });
        }
        Ok(())
    }

    /// Get the configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Run `op` against each provider in order until one answers.
    async fn with_failover<T, F, Fut>(&self, method: &'static str, op: F) -> BlockchainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut timeouts = 0;
        for (i, provider) in self.providers.iter().enumerate() {
            match with_timeout(self.timeout_duration, op(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    if e.as_error_resp().is_some_and(|p| p.code == METHOD_NOT_FOUND_CODE) {
                        return Err(BlockchainError::NotAvailable(method.to_string()));
                    }
                    metrics::record_rpc_failure(method);
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    timeouts += 1;
                    metrics::record_rpc_failure(method);
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next provider");
                }
            }
        }
        if timeouts == self.providers.len() {
            return Err(BlockchainError::Timeout(self.config.rpc_timeout_secs));
        }
        Err(BlockchainError::Rpc(format!("All RPC providers failed for {method}")))
    }
}

fn transaction_request(request: &CallRequest) -> TransactionRequest {
    let mut tx = TransactionRequest::default()
        .with_to(request.to)
        .with_input(request.data.clone());
    if let Some(from) = request.from {
        tx = tx.with_from(from);
    }
    if let Some(value) = request.value {
        tx = tx.with_value(value);
    }
    if let Some(gas_price) = request.gas_price {
        tx = tx.with_gas_price(gas_price);
    }
    if let Some(gas_limit) = request.gas_limit {
        tx = tx.with_gas_limit(gas_limit);
    }
    tx
}

/// Classify a failed `eth_call`: EVM reverts become outcomes, the rest stay errors.
fn revert_outcome(error: TransportError) -> TransportResult<SimulationOutcome> {
    let Some(payload) = error.as_error_resp() else {
        return Err(error);
    };
    if let Some(data) = payload.as_revert_data() {
        return Ok(SimulationOutcome::Reverted(data));
    }
    let message = payload.message.to_lowercase();
    if payload.code == EXECUTION_REVERTED_CODE
        || message.contains("revert")
        || message.contains("out of gas")
    {
        return Ok(SimulationOutcome::Reverted(Default::default()));
    }
    Err(error)
}

fn map_receipt(receipt: TransactionReceipt) -> Receipt {
    Receipt {
        transaction_hash: receipt.transaction_hash,
        block_hash: receipt.block_hash,
        block_number: receipt.block_number,
        from: receipt.from,
        to: receipt.to,
        contract_address: receipt.contract_address,
        gas_used: receipt.gas_used,
        status: receipt.status(),
    }
}

#[async_trait]
impl Runtime for RpcRuntime {
    async fn simulate(
        &self,
        request: &CallRequest,
        block: BlockTag,
    ) -> BlockchainResult<SimulationOutcome> {
        let tx = transaction_request(request);
        self.with_failover("eth_call", |provider| {
            let tx = tx.clone();
            async move {
                match provider.call(tx).block(block.into()).await {
                    Ok(output) => Ok(SimulationOutcome::Success(output)),
                    Err(e) => revert_outcome(e),
                }
            }
        })
        .await
    }

    async fn estimate_gas(&self, request: &CallRequest, block: BlockTag) -> BlockchainResult<u64> {
        let tx = transaction_request(request);
        let mut last_revert = None;
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.estimate_gas(tx.clone()).block(block.into());
            match with_timeout(self.timeout_duration, fut).await {
                Ok(Ok(gas)) => return Ok(gas),
                Ok(Err(e)) => match revert_outcome(e) {
                    // The node executed the call; another provider will not disagree.
                    Ok(outcome) => {
                        last_revert = Some(outcome.output().clone());
                        break;
                    }
                    Err(e) => {
                        metrics::record_rpc_failure("eth_estimateGas");
                        tracing::warn!(provider_idx = i, error = %e, "RPC error");
                    }
                },
                Err(_) => {
                    metrics::record_rpc_failure("eth_estimateGas");
                    tracing::warn!(provider_idx = i, "RPC timeout");
                }
            }
        }
        match last_revert {
            Some(data) => Err(BlockchainError::Reverted(data)),
            None => Err(BlockchainError::Rpc(
                "All providers failed to estimate gas".to_string(),
            )),
        }
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<Receipt>> {
        let receipt = self
            .with_failover("eth_getTransactionReceipt", |provider| async move {
                provider.get_transaction_receipt(tx_hash).await
            })
            .await?;
        Ok(receipt.map(map_receipt))
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.with_failover("eth_blockNumber", |provider| async move {
            provider.get_block_number().await
        })
        .await
    }

    async fn get_chain_id(&self) -> BlockchainResult<u64> {
        self.with_failover("eth_chainId", |provider| async move {
            provider.get_chain_id().await
        })
        .await
    }
}

impl std::fmt::Debug for RpcRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcRuntime")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
