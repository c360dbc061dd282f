//! Safe account subsystem.
//!
//! # Data Flow
//! ```text
//! contracts.rs (sol! ABI)
//!     → contract.rs (typed reads through the Runtime)
//!     → owners.rs (owner list, threshold, owner-mutation calldata)
//!     → gas.rs (safeTxGas / execTransaction estimation)
//!     → transaction.rs (execution parameters, EIP-712 hash, signatures)
//!     → account.rs (Safe: ties the above together for one address)
//! ```

pub mod account;
pub mod address;
pub mod contract;
pub mod contracts;
pub mod gas;
pub mod owners;
pub mod transaction;
pub mod types;

pub use account::{Safe, SafeTransactionOptions};
pub use address::SENTINEL_ADDRESS;
pub use contract::SafeContract;
pub use owners::OwnerManager;
pub use transaction::{SafeSignature, SafeTransaction, SafeTransactionData};
pub use types::{MetaTransaction, Operation, SafeError, SafeResult};
