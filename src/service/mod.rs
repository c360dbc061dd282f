//! Coordination service subsystem.
//!
//! The service collects proposed Safe transactions and owner signatures
//! off-chain and reports when a proposal has been executed on-chain.
//!
//! # Data Flow
//! ```text
//! relay → estimate_safe_tx (safeTxGas)
//!       → propose_tx (hash, transaction, signature)
//!       → get_safe_tx_details (polled until transactionHash is set)
//! ```

pub mod client;
pub mod types;

use alloy::primitives::{Address, B256};
use async_trait::async_trait;

use crate::safe::transaction::{SafeSignature, SafeTransaction};
use crate::safe::types::MetaTransaction;

pub use client::SafeServiceClient;
pub use types::{SafeTxDetails, ServiceError, ServiceResult};

#[async_trait]
pub trait CoordinationService: Send + Sync {
    /// Service-side `safeTxGas` estimate for a transaction of `safe`.
    async fn estimate_safe_tx(&self, safe: Address, tx: &MetaTransaction) -> ServiceResult<u64>;

    /// Submit a signed transaction for collection of further confirmations.
    async fn propose_tx(
        &self,
        safe: Address,
        safe_tx_hash: B256,
        tx: &SafeTransaction,
        signature: &SafeSignature,
    ) -> ServiceResult<()>;

    async fn get_safe_tx_details(&self, safe_tx_hash: B256) -> ServiceResult<SafeTxDetails>;
}
