//! Gas estimation for Safe transactions.
//!
//! # Strategy
//! ```text
//! probe:    simulate requiredTxGas(to, value, data, op) from the Safe
//!           → measured gas in the revert payload tail
//! refine:   dry-run with gas_limit = guess + data cost + headroom,
//!           doubling headroom until the dry-run returns data (max 10 tries)
//! fallback: native estimate of the inner call;
//!           a failing DelegateCall estimate yields 0 (left to the service)
//! ```
//!
//! Gas near memory-expansion and call-stipend boundaries is not monotonic, so
//! the refinement overshoots geometrically instead of modelling exact costs.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::blockchain::runtime::Runtime;
use crate::blockchain::types::{BlockTag, CallRequest};
use crate::observability::metrics;
use crate::safe::contract::SafeContract;
use crate::safe::contracts::ISafe;
use crate::safe::transaction::SafeTransaction;
use crate::safe::types::{Operation, SafeError, SafeResult};

/// Added to the measured `requiredTxGas` before refinement.
pub const SAFE_TX_GAS_MARGIN: u64 = 10_000;
/// First headroom increment of the refinement loop.
pub const INITIAL_ADDITIONAL_GAS: u64 = 10_000;
pub const MAX_REFINEMENT_ATTEMPTS: u32 = 10;

const ZERO_BYTE_GAS: u64 = 4;
const NON_ZERO_BYTE_GAS: u64 = 16;

/// `Error(string)` selector, string offset and string length precede the measurement.
const REQUIRED_GAS_OFFSET: usize = 4 + 32 + 32;

/// Calldata cost: 4 per zero byte, 16 per non-zero byte.
pub fn estimate_data_gas_cost(data: &[u8]) -> u64 {
    data.iter()
        .map(|byte| if *byte == 0 { ZERO_BYTE_GAS } else { NON_ZERO_BYTE_GAS })
        .sum()
}

/// Read the gas figure `requiredTxGas` packs after the revert string header.
pub fn parse_required_tx_gas(output: &[u8]) -> Option<u64> {
    let tail = output.get(REQUIRED_GAS_OFFSET..)?;
    if tail.is_empty() {
        return None;
    }
    let measured = U256::try_from_be_slice(tail)?;
    u64::try_from(measured).ok()
}

/// Estimate `safeTxGas` for a transaction executed by the Safe.
pub async fn estimate_tx_gas(
    contract: &SafeContract,
    to: Address,
    value: U256,
    data: &Bytes,
    operation: Operation,
) -> SafeResult<u64> {
    let safe = contract.address();
    let runtime = contract.runtime().as_ref();

    let estimate_data: Bytes = ISafe::requiredTxGasCall {
        to,
        value,
        data: data.clone(),
        operation: operation.as_u8(),
    }
    .abi_encode()
    .into();
    let probe = CallRequest::new(safe, estimate_data).with_from(safe);

    if let Some(measured) = probe_required_gas(runtime, &probe).await {
        let estimate = refine_gas_estimate(runtime, &probe, measured.saturating_add(SAFE_TX_GAS_MARGIN)).await;
        metrics::record_gas_estimate("refined", estimate);
        tracing::debug!(%safe, %to, measured, estimate, "Refined safeTxGas estimate");
        return Ok(estimate);
    }

    let request = CallRequest::new(to, data.clone())
        .with_from(safe)
        .with_value(value);
    match runtime.estimate_gas(&request, BlockTag::Latest).await {
        Ok(estimate) => {
            metrics::record_gas_estimate("native", estimate);
            tracing::debug!(%safe, %to, estimate, "Native safeTxGas estimate");
            Ok(estimate)
        }
        Err(e) if operation == Operation::DelegateCall => {
            tracing::debug!(%safe, %to, error = %e, "Delegate call not estimable, deferring to service");
            Ok(0)
        }
        Err(e) => Err(SafeError::EstimationFailure(e)),
    }
}

/// Simulate the probe; any failure or empty measurement means "no estimate".
async fn probe_required_gas(runtime: &dyn Runtime, probe: &CallRequest) -> Option<u64> {
    match runtime.simulate(probe, BlockTag::Latest).await {
        Ok(outcome) => parse_required_tx_gas(outcome.output()).filter(|gas| *gas > 0),
        Err(e) => {
            tracing::debug!(error = %e, "requiredTxGas probe failed");
            None
        }
    }
}

/// Grow `initial_estimate` until a dry-run of `probe` returns data.
///
/// The result includes one more headroom increment than the last attempt.
pub async fn refine_gas_estimate(runtime: &dyn Runtime, probe: &CallRequest, initial_estimate: u64) -> u64 {
    let data_gas = estimate_data_gas_cost(&probe.data);
    let mut estimate = initial_estimate;
    let mut additional_gas = INITIAL_ADDITIONAL_GAS;

    for attempt in 1..=MAX_REFINEMENT_ATTEMPTS {
        let gas_limit = estimate
            .saturating_add(data_gas)
            .saturating_add(additional_gas);
        let dry_run = probe.clone().with_gas_price(0).with_gas_limit(gas_limit);
        match runtime.simulate(&dry_run, BlockTag::Latest).await {
            Ok(outcome) if !outcome.output().is_empty() => {
                metrics::record_refinement_attempts(attempt);
                return estimate.saturating_add(additional_gas);
            }
            Ok(_) => tracing::trace!(attempt, gas_limit, "Dry-run returned no data"),
            Err(e) => tracing::trace!(attempt, gas_limit, error = %e, "Dry-run failed"),
        }
        estimate = estimate.saturating_add(additional_gas);
        additional_gas = additional_gas.saturating_mul(2);
    }

    metrics::record_refinement_attempts(MAX_REFINEMENT_ATTEMPTS);
    estimate.saturating_add(additional_gas)
}

/// Estimate gas for submitting `execTransaction` with the collected signatures.
pub async fn estimate_gas_for_transaction_execution(
    contract: &SafeContract,
    from: Address,
    tx: &SafeTransaction,
) -> SafeResult<u64> {
    let data = &tx.data;
    let calldata: Bytes = ISafe::execTransactionCall {
        to: data.to,
        value: data.value,
        data: data.data.clone(),
        operation: data.operation.as_u8(),
        safeTxGas: U256::from(data.safe_tx_gas),
        baseGas: U256::from(data.base_gas),
        gasPrice: U256::from(data.gas_price),
        gasToken: data.gas_token,
        refundReceiver: data.refund_receiver,
        signatures: tx.encoded_signatures(),
    }
    .abi_encode()
    .into();
    let request = CallRequest::new(contract.address(), calldata)
        .with_from(from)
        .with_gas_price(data.gas_price);

    contract
        .runtime()
        .estimate_gas(&request, BlockTag::Latest)
        .await
        .map_err(SafeError::EstimationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_cost_empty() {
        assert_eq!(estimate_data_gas_cost(&[]), 0);
    }

    #[test]
    fn test_data_cost_per_byte() {
        for n in [1usize, 2, 31, 100] {
            assert_eq!(estimate_data_gas_cost(&vec![0u8; n]), 4 * n as u64);
            assert_eq!(estimate_data_gas_cost(&vec![0xffu8; n]), 16 * n as u64);
        }
        assert_eq!(estimate_data_gas_cost(&[0, 1, 0, 2]), 4 + 16 + 4 + 16);
    }

    #[test]
    fn test_parse_required_tx_gas() {
        let mut payload = vec![0u8; REQUIRED_GAS_OFFSET];
        let mut word = [0u8; 32];
        word[30..].copy_from_slice(&42_000u16.to_be_bytes());
        payload.extend_from_slice(&word);
        assert_eq!(parse_required_tx_gas(&payload), Some(42_000));
    }

    #[test]
    fn test_parse_required_tx_gas_short_payload() {
        assert_eq!(parse_required_tx_gas(&[]), None);
        assert_eq!(parse_required_tx_gas(&[0u8; REQUIRED_GAS_OFFSET]), None);
    }

    #[test]
    fn test_parse_required_tx_gas_overflow() {
        let mut payload = vec![0u8; REQUIRED_GAS_OFFSET];
        payload.extend_from_slice(&[0xff; 32]);
        assert_eq!(parse_required_tx_gas(&payload), None);
    }
}
