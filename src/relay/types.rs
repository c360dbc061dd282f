//! Relay request, configuration and result types.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use std::time::Duration;
use thiserror::Error;

use crate::blockchain::types::{BlockchainError, Receipt};
use crate::config::schema::RelaySettings;
use crate::safe::address::parse_address;
use crate::safe::contracts::{ICreateCall, DEFAULT_CREATE_CALL_ADDRESS};
use crate::safe::types::{MetaTransaction, Operation, SafeError, SafeResult};
use crate::service::types::ServiceError;

/// What the caller wants the Safe to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionIntent {
    Call {
        to: Address,
        value: U256,
        data: Bytes,
        operation: Operation,
    },
    /// Deploy `init_code`, forwarding `value` to the new contract.
    Create { init_code: Bytes, value: U256 },
}

impl From<MetaTransaction> for TransactionIntent {
    fn from(tx: MetaTransaction) -> Self {
        Self::Call {
            to: tx.to,
            value: tx.value,
            data: tx.data,
            operation: tx.operation,
        }
    }
}

impl TransactionIntent {
    /// A plain `Call` intent.
    pub fn call(to: Address, value: U256, data: Bytes) -> Self {
        Self::Call {
            to,
            value,
            data,
            operation: Operation::Call,
        }
    }

    /// Resolve into the on-chain shape. Creations become a DelegateCall to
    /// `create_call` with `performCreate(value, init_code)` and zero value.
    pub fn resolve(self, create_call: Address) -> MetaTransaction {
        match self {
            Self::Call {
                to,
                value,
                data,
                operation,
            } => MetaTransaction {
                to,
                value,
                data,
                operation,
            },
            Self::Create { init_code, value } => {
                let data = ICreateCall::performCreateCall {
                    value,
                    deploymentData: init_code,
                }
                .abi_encode();
                MetaTransaction {
                    to: create_call,
                    value: U256::ZERO,
                    data: data.into(),
                    operation: Operation::DelegateCall,
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Delay between status and receipt polls.
    pub polling_delay: Duration,
    pub create_call_address: Address,
    /// Confirmations `wait` requires when the caller passes none.
    pub default_confirmations: u64,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            polling_delay: Duration::from_millis(5_000),
            create_call_address: DEFAULT_CREATE_CALL_ADDRESS,
            default_confirmations: 1,
        }
    }
}

impl RelayOptions {
    pub fn from_settings(settings: &RelaySettings, confirmations: u64) -> SafeResult<Self> {
        Ok(Self {
            polling_delay: Duration::from_millis(settings.polling_delay_ms),
            create_call_address: parse_address(&settings.create_call_address)?,
            default_confirmations: confirmations.max(1),
        })
    }
}

/// Errors surfaced by the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Safe(#[from] SafeError),

    #[error("Coordination service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Wait for execution was cancelled")]
    Cancelled,

    #[error("Runtime error: {0}")]
    Runtime(#[from] BlockchainError),
}

pub type RelayResult<T> = Result<T, RelayError>;

/// Receipt of an executed relay transaction.
#[derive(Debug, Clone)]
pub struct SafeReceipt {
    pub receipt: Receipt,
    /// Operation of the relayed Safe transaction, not of the outer `execTransaction`.
    pub operation: Operation,
    pub safe_tx_hash: B256,
}
