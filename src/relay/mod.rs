//! Transaction relay subsystem.
//!
//! # Data Flow
//! ```text
//! TransactionIntent
//!     → resolve (Create → DelegateCall through CreateCall)
//!     → service estimate (safeTxGas)
//!     → Safe::create_transaction (nonce from chain)
//!     → EIP-712 hash → owner signature
//!     → service proposal
//!     → SafeTransactionResponse::wait (status poll → receipt poll)
//! ```

pub mod signer;
pub mod types;

pub use signer::{SafeRelaySigner, SafeTransactionResponse};
pub use types::{RelayError, RelayOptions, RelayResult, SafeReceipt, TransactionIntent};
