//! Safe transactions: execution parameters, EIP-712 hashing and signatures.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::signers::Signature;
use alloy::sol_types::{Eip712Domain, SolStruct};
use std::collections::BTreeMap;

use crate::safe::contracts::SafeTx;
use crate::safe::types::{MetaTransaction, Operation};

/// Fully parameterized Safe transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeTransactionData {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
    pub safe_tx_gas: u64,
    pub base_gas: u64,
    pub gas_price: u128,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: u64,
}

impl SafeTransactionData {
    /// Attach default execution parameters to a meta transaction.
    pub fn new(tx: MetaTransaction, safe_tx_gas: u64, nonce: u64) -> Self {
        Self {
            to: tx.to,
            value: tx.value,
            data: tx.data,
            operation: tx.operation,
            safe_tx_gas,
            base_gas: 0,
            gas_price: 0,
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
            nonce,
        }
    }

    fn to_typed(&self) -> SafeTx {
        SafeTx {
            to: self.to,
            value: self.value,
            data: self.data.clone(),
            operation: self.operation.as_u8(),
            safeTxGas: U256::from(self.safe_tx_gas),
            baseGas: U256::from(self.base_gas),
            gasPrice: U256::from(self.gas_price),
            gasToken: self.gas_token,
            refundReceiver: self.refund_receiver,
            nonce: U256::from(self.nonce),
        }
    }

    /// Canonical `safeTxHash` for the given Safe on the given chain.
    pub fn eip712_hash(&self, chain_id: u64, safe: Address) -> B256 {
        let domain = Eip712Domain::new(None, None, Some(U256::from(chain_id)), Some(safe), None);
        self.to_typed().eip712_signing_hash(&domain)
    }
}

/// An owner signature over a `safeTxHash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeSignature {
    pub signer: Address,
    /// `r || s || v`, 65 bytes.
    pub data: Bytes,
}

impl SafeSignature {
    pub fn from_ecdsa(signer: Address, signature: &Signature) -> Self {
        Self {
            signer,
            data: Bytes::from(signature.as_bytes().to_vec()),
        }
    }
}

/// Transaction data plus the signatures collected so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeTransaction {
    pub data: SafeTransactionData,
    signatures: BTreeMap<Address, SafeSignature>,
}

impl SafeTransaction {
    pub fn new(data: SafeTransactionData) -> Self {
        Self {
            data,
            signatures: BTreeMap::new(),
        }
    }

    /// Add or replace the signature of `signature.signer`.
    pub fn add_signature(&mut self, signature: SafeSignature) {
        self.signatures.insert(signature.signer, signature);
    }

    pub fn signatures(&self) -> impl Iterator<Item = &SafeSignature> {
        self.signatures.values()
    }

    /// Signatures concatenated in ascending signer order, as `checkSignatures` expects.
    pub fn encoded_signatures(&self) -> Bytes {
        let mut out = Vec::with_capacity(self.signatures.len() * 65);
        for signature in self.signatures.values() {
            out.extend_from_slice(&signature.data);
        }
        Bytes::from(out)
    }
}
