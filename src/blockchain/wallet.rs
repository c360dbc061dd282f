//! Owner key handling and `safeTxHash` signing.
//!
//! Keys come from the process environment only. Neither the key nor anything
//! derived from it besides the address is ever logged.

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, Signer};
use async_trait::async_trait;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

pub const PRIVATE_KEY_ENV_VAR: &str = "SAFE_RELAY_PRIVATE_KEY";

/// Signs 32-byte digests for one owner address.
#[async_trait]
pub trait HashSigner: Send + Sync {
    fn address(&self) -> Address;

    /// ECDSA over `hash` as given, without the `personal_sign` prefix.
    async fn sign_hash(&self, hash: B256) -> BlockchainResult<Signature>;
}

/// An owner key held in memory.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Accepts a 32-byte hex key, `0x` prefix optional.
    pub fn from_private_key(key: &str) -> BlockchainResult<Self> {
        let bytes: B256 = key
            .trim()
            .parse()
            .map_err(|_| BlockchainError::Wallet("Invalid private key: expected 32 hex bytes".into()))?;
        let signer = PrivateKeySigner::from_bytes(&bytes)
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key: {e}")))?;

        tracing::debug!(owner = %signer.address(), "Owner key loaded");
        Ok(Self { signer })
    }

    /// Read the key from `SAFE_RELAY_PRIVATE_KEY`.
    pub fn from_env() -> BlockchainResult<Self> {
        match std::env::var(PRIVATE_KEY_ENV_VAR) {
            Ok(key) => Self::from_private_key(&key),
            Err(_) => Err(BlockchainError::Wallet(format!(
                "{PRIVATE_KEY_ENV_VAR} is not set; an owner key is required to propose"
            ))),
        }
    }
}

#[async_trait]
impl HashSigner for Wallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_hash(&self, hash: B256) -> BlockchainResult<Signature> {
        self.signer
            .sign_hash(&hash)
            .await
            .map_err(|e| BlockchainError::Wallet(e.to_string()))
    }
}
