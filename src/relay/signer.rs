//! Relay signer: turns an intent into a proposed, signed Safe transaction.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::blockchain::runtime::Runtime;
use crate::blockchain::types::{BlockchainError, Receipt};
use crate::blockchain::wallet::HashSigner;
use crate::observability::metrics;
use crate::relay::types::{RelayError, RelayOptions, RelayResult, SafeReceipt, TransactionIntent};
use crate::resilience::retries::{RetryError, RetryPolicy};
use crate::safe::account::{Safe, SafeTransactionOptions};
use crate::safe::types::Operation;
use crate::service::CoordinationService;

/// Proposes transactions for one Safe on behalf of one owner.
///
/// Every step of [`send_transaction`](Self::send_transaction) reads fresh
/// state; nothing is shared between requests.
pub struct SafeRelaySigner {
    safe: Safe,
    signer: Arc<dyn HashSigner>,
    service: Arc<dyn CoordinationService>,
    options: RelayOptions,
}

impl SafeRelaySigner {
    pub fn new(
        safe: Safe,
        signer: Arc<dyn HashSigner>,
        service: Arc<dyn CoordinationService>,
        options: RelayOptions,
    ) -> Self {
        Self {
            safe,
            signer,
            service,
            options,
        }
    }

    pub fn safe(&self) -> &Safe {
        &self.safe
    }

    /// The relay acts as the Safe, not as the signing owner.
    pub fn address(&self) -> Address {
        self.safe.address()
    }

    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    /// Build, estimate, sign and propose `intent`.
    ///
    /// Proposal failures are returned as-is; the caller decides whether to
    /// resubmit.
    pub async fn send_transaction(
        &self,
        intent: TransactionIntent,
    ) -> RelayResult<SafeTransactionResponse> {
        let safe_address = self.safe.address();
        let meta_tx = intent.resolve(self.options.create_call_address);

        let safe_tx_gas = self.service.estimate_safe_tx(safe_address, &meta_tx).await?;
        metrics::record_gas_estimate("service", safe_tx_gas);
        tracing::debug!(safe = %safe_address, to = %meta_tx.to, safe_tx_gas, "Service estimate received");

        let options = SafeTransactionOptions {
            safe_tx_gas: Some(safe_tx_gas),
            ..SafeTransactionOptions::default()
        };
        let tx = self.safe.create_transaction(meta_tx, options).await?;

        let chain_id = self.safe.get_chain_id().await?;
        let safe_tx_hash = tx.data.eip712_hash(chain_id, safe_address);
        let signature = self
            .safe
            .sign_transaction_hash(self.signer.as_ref(), safe_tx_hash)
            .await?;

        if let Err(e) = self
            .service
            .propose_tx(safe_address, safe_tx_hash, &tx, &signature)
            .await
        {
            metrics::record_proposal("failed");
            tracing::error!(safe = %safe_address, safe_tx_hash = %safe_tx_hash, error = %e, "Proposal rejected");
            return Err(e.into());
        }
        metrics::record_proposal("accepted");
        tracing::info!(
            safe = %safe_address,
            safe_tx_hash = %safe_tx_hash,
            nonce = tx.data.nonce,
            sender = %signature.signer,
            "Transaction proposed"
        );

        Ok(SafeTransactionResponse {
            hash: safe_tx_hash,
            to: tx.data.to,
            value: tx.data.value,
            data: tx.data.data.clone(),
            operation: tx.data.operation,
            gas_limit: tx.data.safe_tx_gas,
            gas_price: 0,
            nonce: tx.data.nonce,
            chain_id,
            from: safe_address,
            confirmations: 0,
            service: Arc::clone(&self.service),
            runtime: Arc::clone(self.safe.contract().runtime()),
            polling_delay: self.options.polling_delay,
            default_confirmations: self.options.default_confirmations,
        })
    }
}

/// A proposed Safe transaction awaiting execution by the owners.
pub struct SafeTransactionResponse {
    /// `safeTxHash`, not an on-chain transaction hash.
    pub hash: B256,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
    /// The proposal's `safeTxGas`.
    pub gas_limit: u64,
    pub gas_price: u128,
    pub nonce: u64,
    pub chain_id: u64,
    /// The Safe.
    pub from: Address,
    pub confirmations: u64,
    service: Arc<dyn CoordinationService>,
    runtime: Arc<dyn Runtime>,
    polling_delay: Duration,
    default_confirmations: u64,
}

impl std::fmt::Debug for SafeTransactionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeTransactionResponse")
            .field("hash", &self.hash)
            .field("to", &self.to)
            .field("operation", &self.operation)
            .field("nonce", &self.nonce)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl SafeTransactionResponse {
    /// Wait until the owners execute the proposal and the execution has
    /// `confirmations` blocks (its own included).
    ///
    /// Polls without limit. Service and runtime failures along the way are
    /// logged and retried; only `cancel` ends the wait early.
    pub async fn wait(
        &self,
        confirmations: Option<u64>,
        cancel: &CancellationToken,
    ) -> RelayResult<SafeReceipt> {
        let confirmations = confirmations.unwrap_or(self.default_confirmations).max(1);
        let policy = RetryPolicy::unbounded(self.polling_delay);

        let tx_hash = policy
            .run("safe_tx_status", cancel, |_| {
                let service = Arc::clone(&self.service);
                let safe_tx_hash = self.hash;
                async move {
                    match service.get_safe_tx_details(safe_tx_hash).await {
                        Ok(details) => Ok(details.transaction_hash),
                        Err(e) => {
                            metrics::record_poll_failure("status");
                            Err(e)
                        }
                    }
                }
            })
            .await
            .map_err(into_relay_error)?;
        tracing::info!(safe_tx_hash = %self.hash, tx_hash = %tx_hash, "Safe transaction executed");

        let receipt = policy
            .run("safe_tx_receipt", cancel, |_| {
                let runtime = Arc::clone(&self.runtime);
                async move { confirmed_receipt(runtime.as_ref(), tx_hash, confirmations).await }
            })
            .await
            .map_err(into_relay_error)?;

        Ok(SafeReceipt {
            receipt,
            operation: self.operation,
            safe_tx_hash: self.hash,
        })
    }
}

async fn confirmed_receipt(
    runtime: &dyn Runtime,
    tx_hash: TxHash,
    confirmations: u64,
) -> Result<Option<Receipt>, BlockchainError> {
    let receipt = match runtime.get_transaction_receipt(tx_hash).await {
        Ok(Some(receipt)) => receipt,
        Ok(None) => return Ok(None),
        Err(e) => {
            metrics::record_poll_failure("receipt");
            return Err(e);
        }
    };
    let Some(mined_at) = receipt.block_number else {
        return Ok(None);
    };
    let head = match runtime.get_block_number().await {
        Ok(head) => head,
        Err(e) => {
            metrics::record_poll_failure("receipt");
            return Err(e);
        }
    };

    if head.saturating_sub(mined_at) + 1 >= confirmations {
        Ok(Some(receipt))
    } else {
        tracing::trace!(tx_hash = %tx_hash, mined_at, head, confirmations, "Awaiting confirmations");
        Ok(None)
    }
}

// Unbounded policies only stop through cancellation.
fn into_relay_error<E: Into<RelayError>>(error: RetryError<E>) -> RelayError {
    match error {
        RetryError::Cancelled { .. } => RelayError::Cancelled,
        RetryError::Exhausted {
            last_error: Some(e),
            ..
        } => e.into(),
        RetryError::Exhausted { .. } => RelayError::Cancelled,
    }
}
