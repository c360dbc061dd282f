//! Safe domain types and error definitions.

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::blockchain::types::BlockchainError;

/// How the Safe executes the inner call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operation {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl Operation {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Operation {
    type Error = SafeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Call),
            1 => Ok(Self::DelegateCall),
            other => Err(SafeError::Decode(format!("unknown operation {other}"))),
        }
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        Operation::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// A call the Safe should perform, before execution parameters are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTransaction {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
}

/// Errors raised by the Safe layer.
#[derive(Debug, Error)]
pub enum SafeError {
    /// Address is malformed or restricted (zero address, sentinel).
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Address {0} is already an owner")]
    DuplicateOwner(Address),

    #[error("Address {0} is not an owner")]
    NotAnOwner(Address),

    /// Threshold outside `1..=owners`.
    #[error("Invalid threshold {threshold} for {owners} owners")]
    InvalidThreshold { threshold: u64, owners: u64 },

    /// The runtime could not estimate gas for an operation that cannot report zero cost.
    #[error("Gas estimation failed: {0}")]
    EstimationFailure(#[source] BlockchainError),

    #[error("Signing failed: {0}")]
    Signing(#[source] BlockchainError),

    /// Contract returned data that does not match the expected ABI.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
}

/// Result type for Safe operations.
pub type SafeResult<T> = Result<T, SafeError>;
