//! Runtime request/response types and error definitions.

use alloy::eips::BlockId;
use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use thiserror::Error;

pub use crate::config::schema::RuntimeConfig;

/// Failures talking to the ledger runtime.
#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("RPC error: {0}")]
    Rpc(String),

    /// No provider answered within `rpc_timeout_secs`.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Call executed but reverted. Carries the raw revert payload (possibly empty).
    #[error("Execution reverted ({} bytes of revert data)", .0.len())]
    Reverted(Bytes),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The endpoint serves a different chain than configured.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Capability not offered by this runtime.
    #[error("Blockchain not available: {0}")]
    NotAvailable(String),
}

pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Block tag a read or estimate is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockTag {
    #[default]
    Latest,
    Pending,
    Number(u64),
}

impl From<BlockTag> for BlockId {
    fn from(tag: BlockTag) -> Self {
        match tag {
            BlockTag::Latest => BlockId::latest(),
            BlockTag::Pending => BlockId::pending(),
            BlockTag::Number(n) => BlockId::number(n),
        }
    }
}

/// A non-committing call, dry-run or estimate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub from: Option<Address>,
    pub data: Bytes,
    pub value: Option<U256>,
    pub gas_price: Option<u128>,
    pub gas_limit: Option<u64>,
}

impl CallRequest {
    pub fn new(to: Address, data: Bytes) -> Self {
        Self {
            to,
            from: None,
            data,
            value: None,
            gas_price: None,
            gas_limit: None,
        }
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

/// Outcome of a simulation that reached the EVM.
///
/// Transport failures are reported as `Err(BlockchainError)` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationOutcome {
    /// Call returned normally with the given output.
    Success(Bytes),
    /// Call reverted; payload may be empty (e.g. out of gas).
    Reverted(Bytes),
}

impl SimulationOutcome {
    /// Returned bytes regardless of whether the call reverted.
    pub fn output(&self) -> &Bytes {
        match self {
            Self::Success(data) | Self::Reverted(data) => data,
        }
    }
}

/// Block-level receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub from: Address,
    pub to: Option<Address>,
    pub contract_address: Option<Address>,
    pub gas_used: u64,
    pub status: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.rpc_timeout_secs, 10);
        assert_eq!(config.confirmation_blocks, 1);
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::Reverted(Bytes::from(vec![1, 2, 3]));
        assert!(err.to_string().contains("3 bytes"));
    }

    #[test]
    fn test_call_request_builder() {
        let req = CallRequest::new(Address::ZERO, Bytes::new())
            .with_from(Address::repeat_byte(1))
            .with_gas_limit(50_000)
            .with_gas_price(0);
        assert_eq!(req.from, Some(Address::repeat_byte(1)));
        assert_eq!(req.gas_limit, Some(50_000));
        assert_eq!(req.gas_price, Some(0));
        assert!(req.value.is_none());
    }

    #[test]
    fn test_simulation_output() {
        let reverted = SimulationOutcome::Reverted(Bytes::from(vec![0xaa]));
        assert_eq!(reverted.output().len(), 1);
        assert!(SimulationOutcome::Success(Bytes::new()).output().is_empty());
    }
}
