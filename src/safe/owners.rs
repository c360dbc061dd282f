//! Owner and threshold management.
//!
//! Owners live on-chain as a singly linked list headed by the sentinel address,
//! so removal and swap need the predecessor of the target owner. Every
//! operation re-reads the full, ordered owner list; nothing is cached.
//!
//! All validation happens before calldata is produced, so a failing call never
//! leaves anything half-submitted.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::safe::address::{is_restricted_address, SENTINEL_ADDRESS};
use crate::safe::contract::SafeContract;
use crate::safe::contracts::ISafe;
use crate::safe::types::{SafeError, SafeResult};

/// Reads owner state and encodes owner mutations for one Safe.
#[derive(Debug, Clone)]
pub struct OwnerManager {
    contract: SafeContract,
}

impl OwnerManager {
    pub fn new(contract: SafeContract) -> Self {
        Self { contract }
    }

    /// Current owners in on-chain list order.
    pub async fn get_owners(&self) -> SafeResult<Vec<Address>> {
        self.contract.get_owners().await
    }

    pub async fn get_threshold(&self) -> SafeResult<u64> {
        self.contract.get_threshold().await
    }

    pub async fn is_owner(&self, owner: Address) -> SafeResult<bool> {
        self.contract.is_owner(owner).await
    }

    /// Calldata for `addOwnerWithThreshold`. The threshold defaults to the current one.
    pub async fn encode_add_owner_with_threshold(
        &self,
        owner: Address,
        threshold: Option<u64>,
    ) -> SafeResult<Bytes> {
        validate_owner_address(&owner)?;
        let owners = self.get_owners().await?;
        validate_not_owner(&owner, &owners)?;
        let threshold = match threshold {
            Some(threshold) => threshold,
            None => self.get_threshold().await?,
        };
        validate_threshold(threshold, owners.len() as u64 + 1)?;

        tracing::debug!(safe = %self.contract.address(), %owner, threshold, "Encoding addOwnerWithThreshold");
        Ok(ISafe::addOwnerWithThresholdCall {
            owner,
            _threshold: U256::from(threshold),
        }
        .abi_encode()
        .into())
    }

    /// Calldata for `removeOwner`. The threshold defaults to the current one minus one.
    pub async fn encode_remove_owner(
        &self,
        owner: Address,
        threshold: Option<u64>,
    ) -> SafeResult<Bytes> {
        validate_owner_address(&owner)?;
        let owners = self.get_owners().await?;
        let index = validate_is_owner(&owner, &owners)?;
        let threshold = match threshold {
            Some(threshold) => threshold,
            None => self.get_threshold().await?.saturating_sub(1),
        };
        validate_threshold(threshold, owners.len() as u64 - 1)?;
        let prev_owner = previous_owner(&owners, index);

        tracing::debug!(safe = %self.contract.address(), %prev_owner, %owner, threshold, "Encoding removeOwner");
        Ok(ISafe::removeOwnerCall {
            prevOwner: prev_owner,
            owner,
            _threshold: U256::from(threshold),
        }
        .abi_encode()
        .into())
    }

    /// Calldata for `swapOwner`. Owner count and threshold are unchanged.
    pub async fn encode_swap_owner(&self, old_owner: Address, new_owner: Address) -> SafeResult<Bytes> {
        validate_owner_address(&new_owner)?;
        validate_owner_address(&old_owner)?;
        let owners = self.get_owners().await?;
        validate_not_owner(&new_owner, &owners)?;
        let index = validate_is_owner(&old_owner, &owners)?;
        let prev_owner = previous_owner(&owners, index);

        tracing::debug!(safe = %self.contract.address(), %prev_owner, %old_owner, %new_owner, "Encoding swapOwner");
        Ok(ISafe::swapOwnerCall {
            prevOwner: prev_owner,
            oldOwner: old_owner,
            newOwner: new_owner,
        }
        .abi_encode()
        .into())
    }

    /// Calldata for `changeThreshold`.
    pub async fn encode_change_threshold(&self, threshold: u64) -> SafeResult<Bytes> {
        let owners = self.get_owners().await?;
        validate_threshold(threshold, owners.len() as u64)?;

        tracing::debug!(safe = %self.contract.address(), threshold, "Encoding changeThreshold");
        Ok(ISafe::changeThresholdCall {
            _threshold: U256::from(threshold),
        }
        .abi_encode()
        .into())
    }
}

/// Predecessor of `owners[index]` in the on-chain linked list.
pub fn previous_owner(owners: &[Address], index: usize) -> Address {
    if index == 0 {
        SENTINEL_ADDRESS
    } else {
        owners[index - 1]
    }
}

fn validate_owner_address(owner: &Address) -> SafeResult<()> {
    if is_restricted_address(owner) {
        return Err(SafeError::InvalidAddress(owner.to_string()));
    }
    Ok(())
}

fn validate_threshold(threshold: u64, owners: u64) -> SafeResult<()> {
    if threshold == 0 || threshold > owners {
        return Err(SafeError::InvalidThreshold { threshold, owners });
    }
    Ok(())
}

fn validate_not_owner(address: &Address, owners: &[Address]) -> SafeResult<()> {
    if owners.contains(address) {
        return Err(SafeError::DuplicateOwner(*address));
    }
    Ok(())
}

fn validate_is_owner(address: &Address, owners: &[Address]) -> SafeResult<usize> {
    owners
        .iter()
        .position(|owner| owner == address)
        .ok_or(SafeError::NotAnOwner(*address))
}
