//! Account abstraction over one Safe.

use alloy::primitives::{Address, Bytes, B256, U256};
use std::sync::Arc;

use crate::blockchain::runtime::Runtime;
use crate::blockchain::wallet::HashSigner;
use crate::safe::contract::SafeContract;
use crate::safe::gas;
use crate::safe::owners::OwnerManager;
use crate::safe::transaction::{SafeSignature, SafeTransaction, SafeTransactionData};
use crate::safe::types::{MetaTransaction, Operation, SafeError, SafeResult};

/// Overrides for the execution parameters of a new Safe transaction.
#[derive(Debug, Clone, Default)]
pub struct SafeTransactionOptions {
    /// Estimated with [`gas::estimate_tx_gas`] when absent.
    pub safe_tx_gas: Option<u64>,
    pub base_gas: Option<u64>,
    pub gas_price: Option<u128>,
    pub gas_token: Option<Address>,
    pub refund_receiver: Option<Address>,
    /// Current on-chain nonce when absent.
    pub nonce: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Safe {
    contract: SafeContract,
    owners: OwnerManager,
}

impl Safe {
    pub fn new(address: Address, runtime: Arc<dyn Runtime>) -> Self {
        let contract = SafeContract::new(address, runtime);
        let owners = OwnerManager::new(contract.clone());
        Self { contract, owners }
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    pub fn contract(&self) -> &SafeContract {
        &self.contract
    }

    pub fn owner_manager(&self) -> &OwnerManager {
        &self.owners
    }

    pub async fn get_chain_id(&self) -> SafeResult<u64> {
        self.contract.get_chain_id().await
    }

    pub async fn get_nonce(&self) -> SafeResult<u64> {
        self.contract.get_nonce().await
    }

    /// A call from the Safe to itself, as used for owner management.
    pub fn self_call(&self, data: Bytes) -> MetaTransaction {
        MetaTransaction {
            to: self.address(),
            value: U256::ZERO,
            data,
            operation: Operation::Call,
        }
    }

    /// Build a Safe transaction, filling unset execution parameters.
    pub async fn create_transaction(
        &self,
        tx: MetaTransaction,
        options: SafeTransactionOptions,
    ) -> SafeResult<SafeTransaction> {
        let safe_tx_gas = match options.safe_tx_gas {
            Some(gas) => gas,
            None => {
                gas::estimate_tx_gas(&self.contract, tx.to, tx.value, &tx.data, tx.operation)
                    .await?
            }
        };
        let nonce = match options.nonce {
            Some(nonce) => nonce,
            None => self.get_nonce().await?,
        };

        let mut data = SafeTransactionData::new(tx, safe_tx_gas, nonce);
        if let Some(base_gas) = options.base_gas {
            data.base_gas = base_gas;
        }
        if let Some(gas_price) = options.gas_price {
            data.gas_price = gas_price;
        }
        if let Some(gas_token) = options.gas_token {
            data.gas_token = gas_token;
        }
        if let Some(refund_receiver) = options.refund_receiver {
            data.refund_receiver = refund_receiver;
        }
        Ok(SafeTransaction::new(data))
    }

    /// EIP-712 `safeTxHash` of the transaction for this Safe and chain.
    pub async fn get_transaction_hash(&self, tx: &SafeTransaction) -> SafeResult<B256> {
        let chain_id = self.get_chain_id().await?;
        Ok(tx.data.eip712_hash(chain_id, self.address()))
    }

    pub async fn sign_transaction_hash(
        &self,
        signer: &dyn HashSigner,
        hash: B256,
    ) -> SafeResult<SafeSignature> {
        let signature = signer.sign_hash(hash).await.map_err(SafeError::Signing)?;
        Ok(SafeSignature::from_ecdsa(signer.address(), &signature))
    }

    /// Hash, sign and attach `signer`'s signature to `tx`.
    pub async fn sign_transaction(
        &self,
        signer: &dyn HashSigner,
        tx: &mut SafeTransaction,
    ) -> SafeResult<()> {
        let hash = self.get_transaction_hash(tx).await?;
        let signature = self.sign_transaction_hash(signer, hash).await?;
        tx.add_signature(signature);
        Ok(())
    }

    /// Gas needed to submit `execTransaction` for `tx` from `from`.
    pub async fn estimate_execution_gas(&self, from: Address, tx: &SafeTransaction) -> SafeResult<u64> {
        gas::estimate_gas_for_transaction_execution(&self.contract, from, tx).await
    }
}
