//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Runtime RPC call:
//!     → timeouts.rs (every request has a deadline)
//! Relay polling (service status, receipts):
//!     → retries.rs (fixed-delay retry, transient errors swallowed,
//!       bounded or unbounded, cancellable by the caller)
//! ```

pub mod retries;
pub mod timeouts;

pub use retries::{RetryError, RetryMode, RetryPolicy};
pub use timeouts::{with_timeout, TimedOut};
