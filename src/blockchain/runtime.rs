//! Ledger runtime capability.
//!
//! Everything the Safe layer needs from a chain goes through this trait, so the
//! owner registry, gas estimator and relay can run against the JSON-RPC client
//! or an in-memory fake alike.

use alloy::primitives::{Bytes, TxHash};
use async_trait::async_trait;

use crate::blockchain::types::{
    BlockTag, BlockchainError, BlockchainResult, CallRequest, Receipt, SimulationOutcome,
};

#[async_trait]
pub trait Runtime: Send + Sync {
    /// Execute a read-only call. A revert is reported as [`BlockchainError::Reverted`].
    async fn call(&self, request: &CallRequest, block: BlockTag) -> BlockchainResult<Bytes> {
        match self.simulate(request, block).await? {
            SimulationOutcome::Success(output) => Ok(output),
            SimulationOutcome::Reverted(data) => Err(BlockchainError::Reverted(data)),
        }
    }

    /// Dry-run a call, keeping reverts distinct from transport failures.
    async fn simulate(
        &self,
        request: &CallRequest,
        block: BlockTag,
    ) -> BlockchainResult<SimulationOutcome>;

    /// Native gas estimate for the request.
    async fn estimate_gas(&self, request: &CallRequest, block: BlockTag) -> BlockchainResult<u64>;

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<Receipt>>;

    async fn get_block_number(&self) -> BlockchainResult<u64>;

    async fn get_chain_id(&self) -> BlockchainResult<u64>;
}
