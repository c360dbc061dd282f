//! Typed reads of a single Safe through the runtime capability.

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use std::sync::Arc;

use crate::blockchain::runtime::Runtime;
use crate::blockchain::types::{BlockTag, CallRequest};
use crate::safe::contracts::ISafe;
use crate::safe::types::{SafeError, SafeResult};

/// Handle on one deployed Safe.
#[derive(Clone)]
pub struct SafeContract {
    address: Address,
    runtime: Arc<dyn Runtime>,
}

impl SafeContract {
    pub fn new(address: Address, runtime: Arc<dyn Runtime>) -> Self {
        Self { address, runtime }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.runtime
    }

    /// `eth_call` a view function on the Safe at the latest block.
    async fn read<C: SolCall>(&self, call: C) -> SafeResult<C::Return> {
        let request = CallRequest::new(self.address, call.abi_encode().into());
        let output = self.runtime.call(&request, BlockTag::Latest).await?;
        C::abi_decode_returns(&output)
            .map_err(|e| SafeError::Decode(format!("{}: {}", C::SIGNATURE, e)))
    }

    pub async fn get_owners(&self) -> SafeResult<Vec<Address>> {
        self.read(ISafe::getOwnersCall {}).await
    }

    pub async fn get_threshold(&self) -> SafeResult<u64> {
        let threshold = self.read(ISafe::getThresholdCall {}).await?;
        to_u64(threshold, "threshold")
    }

    pub async fn is_owner(&self, owner: Address) -> SafeResult<bool> {
        self.read(ISafe::isOwnerCall { owner }).await
    }

    pub async fn get_nonce(&self) -> SafeResult<u64> {
        let nonce = self.read(ISafe::nonceCall {}).await?;
        to_u64(nonce, "nonce")
    }

    pub async fn get_chain_id(&self) -> SafeResult<u64> {
        Ok(self.runtime.get_chain_id().await?)
    }
}

fn to_u64(value: U256, what: &str) -> SafeResult<u64> {
    u64::try_from(value).map_err(|_| SafeError::Decode(format!("{what} {value} does not fit in u64")))
}

impl std::fmt::Debug for SafeContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeContract")
            .field("address", &self.address)
            .finish()
    }
}
