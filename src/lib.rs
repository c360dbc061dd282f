//! Safe multisig owner registry, gas estimator and transaction relay.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod relay;
pub mod resilience;
pub mod safe;
pub mod service;

pub use config::schema::RelayConfig;
pub use relay::{SafeRelaySigner, TransactionIntent};
pub use safe::Safe;
