//! Transaction service wire types and errors.

use alloy::primitives::{Address, Bytes, TxHash, B256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::safe::transaction::{SafeSignature, SafeTransaction};
use crate::safe::types::{MetaTransaction, Operation};

/// Errors talking to the coordination service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status.
    #[error("Service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid service response: {0}")]
    Decode(String),

    #[error("Invalid service URL '{0}'")]
    InvalidUrl(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

fn optional_data(data: &Bytes) -> Option<Bytes> {
    (!data.is_empty()).then(|| data.clone())
}

/// Body of a `safeTxGas` estimation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationRequest {
    pub to: Address,
    /// Decimal wei amount.
    pub value: String,
    pub data: Option<Bytes>,
    pub operation: Operation,
}

impl From<&MetaTransaction> for EstimationRequest {
    fn from(tx: &MetaTransaction) -> Self {
        Self {
            to: tx.to,
            value: tx.value.to_string(),
            data: optional_data(&tx.data),
            operation: tx.operation,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationResponse {
    /// Decimal gas amount.
    pub safe_tx_gas: String,
}

/// Body of a multisig transaction proposal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeTransactionBody {
    pub to: Address,
    pub value: String,
    pub data: Option<Bytes>,
    pub operation: Operation,
    pub safe_tx_gas: String,
    pub base_gas: String,
    pub gas_price: String,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: u64,
    pub contract_transaction_hash: B256,
    pub sender: Address,
    pub signature: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl ProposeTransactionBody {
    pub fn new(
        tx: &SafeTransaction,
        safe_tx_hash: B256,
        signature: &SafeSignature,
        origin: Option<String>,
    ) -> Self {
        let data = &tx.data;
        Self {
            to: data.to,
            value: data.value.to_string(),
            data: optional_data(&data.data),
            operation: data.operation,
            safe_tx_gas: data.safe_tx_gas.to_string(),
            base_gas: data.base_gas.to_string(),
            gas_price: data.gas_price.to_string(),
            gas_token: data.gas_token,
            refund_receiver: data.refund_receiver,
            nonce: data.nonce,
            contract_transaction_hash: safe_tx_hash,
            sender: signature.signer,
            signature: signature.data.clone(),
            origin,
        }
    }
}

/// Status of a proposed transaction as tracked by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafeTxDetails {
    pub safe: Option<Address>,
    pub safe_tx_hash: Option<B256>,
    pub nonce: Option<u64>,
    pub confirmations_required: Option<u64>,
    pub is_executed: Option<bool>,
    pub is_successful: Option<bool>,
    /// Set once the transaction has been mined.
    pub transaction_hash: Option<TxHash>,
}
