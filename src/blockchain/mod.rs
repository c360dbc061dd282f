//! Ledger runtime integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key) → wallet.rs (key loading, hash signing)
//! RuntimeConfig (RPC URLs)            → client.rs (RPC connection with timeouts)
//!                                     → runtime.rs (capability consumed by the Safe layer)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod runtime;
pub mod types;
pub mod wallet;

pub use client::RpcRuntime;
pub use runtime::Runtime;
pub use types::{
    BlockTag, BlockchainError, BlockchainResult, CallRequest, Receipt,
    SimulationOutcome,
};
pub use wallet::{HashSigner, Wallet};
