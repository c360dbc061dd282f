//! Gas estimator behaviour against scripted runtimes.

use std::sync::Arc;

use alloy::primitives::{Bytes, U256};

use safe_relay::blockchain::{CallRequest, HashSigner, Wallet};
use safe_relay::safe::gas::{
    estimate_gas_for_transaction_execution, estimate_tx_gas, refine_gas_estimate,
    INITIAL_ADDITIONAL_GAS, MAX_REFINEMENT_ATTEMPTS, SAFE_TX_GAS_MARGIN,
};
use safe_relay::safe::{
    MetaTransaction, Operation, Safe, SafeContract, SafeError, SafeTransaction,
    SafeTransactionData, SafeTransactionOptions,
};

mod common;
use common::{addr, FakeSafe, ProbeScript, ScriptedGasRuntime};

fn contract(runtime: &Arc<ScriptedGasRuntime>) -> SafeContract {
    SafeContract::new(addr(0x5a), runtime.clone())
}

fn empty_probe() -> CallRequest {
    CallRequest::new(addr(0x5a), Bytes::new())
}

#[tokio::test]
async fn test_refinement_stops_at_first_answer() {
    let runtime = ScriptedGasRuntime::new(ProbeScript::Empty).succeed_from_gas_limit(0);
    let estimate = refine_gas_estimate(&runtime, &empty_probe(), 50_000).await;

    assert_eq!(estimate, 50_000 + INITIAL_ADDITIONAL_GAS);
    assert_eq!(runtime.dry_runs(), vec![60_000]);
}

#[tokio::test]
async fn test_refinement_doubles_headroom() {
    // Limits: 60k, 80k, 120k.
    let runtime = ScriptedGasRuntime::new(ProbeScript::Empty).succeed_from_gas_limit(120_000);
    let estimate = refine_gas_estimate(&runtime, &empty_probe(), 50_000).await;

    assert_eq!(runtime.dry_runs(), vec![60_000, 80_000, 120_000]);
    assert_eq!(estimate, 120_000);
}

#[tokio::test]
async fn test_refinement_includes_data_cost_in_limit() {
    let runtime = ScriptedGasRuntime::new(ProbeScript::Empty).succeed_from_gas_limit(0);
    let probe = CallRequest::new(addr(0x5a), Bytes::from_static(&[0, 0, 1]));
    refine_gas_estimate(&runtime, &probe, 50_000).await;

    assert_eq!(runtime.dry_runs(), vec![50_000 + 4 + 4 + 16 + INITIAL_ADDITIONAL_GAS]);
}

#[tokio::test]
async fn test_refinement_is_bounded() {
    let runtime = ScriptedGasRuntime::new(ProbeScript::Empty);
    let initial = 50_000;
    let estimate = refine_gas_estimate(&runtime, &empty_probe(), initial).await;

    assert_eq!(runtime.dry_runs().len(), MAX_REFINEMENT_ATTEMPTS as usize);
    assert!(estimate > initial);
    // 10 increments of 10k * 2^k, plus the final unused doubling.
    assert_eq!(estimate, initial + 10_000 * 1023 + 10_000 * 1024);
}

#[tokio::test]
async fn test_probe_measurement_is_refined() {
    let runtime = Arc::new(
        ScriptedGasRuntime::new(ProbeScript::Measured(30_000)).succeed_from_gas_limit(0),
    );
    let estimate = estimate_tx_gas(
        &contract(&runtime),
        addr(0x42),
        U256::ZERO,
        &Bytes::from_static(&[0xde, 0xad]),
        Operation::Call,
    )
    .await
    .unwrap();

    assert_eq!(estimate, 30_000 + SAFE_TX_GAS_MARGIN + INITIAL_ADDITIONAL_GAS);
    assert_eq!(runtime.dry_runs().len(), 1);
    assert_eq!(runtime.native_calls(), 0);
}

#[tokio::test]
async fn test_zero_measurement_falls_back_to_native() {
    let runtime = Arc::new(ScriptedGasRuntime::new(ProbeScript::Measured(0)).native_estimate(47_000));
    let estimate = estimate_tx_gas(
        &contract(&runtime),
        addr(0x42),
        U256::from(1),
        &Bytes::new(),
        Operation::Call,
    )
    .await
    .unwrap();

    assert_eq!(estimate, 47_000);
    assert!(runtime.dry_runs().is_empty());
    assert_eq!(runtime.native_calls(), 1);
}

#[tokio::test]
async fn test_failed_probe_falls_back_to_native() {
    let runtime = Arc::new(ScriptedGasRuntime::new(ProbeScript::Fail).native_estimate(21_000));
    let estimate = estimate_tx_gas(
        &contract(&runtime),
        addr(0x42),
        U256::ZERO,
        &Bytes::new(),
        Operation::Call,
    )
    .await
    .unwrap();
    assert_eq!(estimate, 21_000);
}

#[tokio::test]
async fn test_delegate_call_fallback_returns_zero() {
    let runtime = Arc::new(ScriptedGasRuntime::new(ProbeScript::Empty));
    let estimate = estimate_tx_gas(
        &contract(&runtime),
        addr(0x42),
        U256::ZERO,
        &Bytes::from_static(&[1, 2, 3]),
        Operation::DelegateCall,
    )
    .await
    .unwrap();
    assert_eq!(estimate, 0);
}

#[tokio::test]
async fn test_call_fallback_failure_propagates() {
    let runtime = Arc::new(ScriptedGasRuntime::new(ProbeScript::Fail));
    let result = estimate_tx_gas(
        &contract(&runtime),
        addr(0x42),
        U256::ZERO,
        &Bytes::new(),
        Operation::Call,
    )
    .await;
    assert!(matches!(result, Err(SafeError::EstimationFailure(_))));
}

fn unsigned_tx() -> SafeTransaction {
    SafeTransaction::new(SafeTransactionData::new(
        MetaTransaction {
            to: addr(0x42),
            value: U256::ZERO,
            data: Bytes::new(),
            operation: Operation::Call,
        },
        60_000,
        3,
    ))
}

#[tokio::test]
async fn test_execution_gas_estimate() {
    let runtime = Arc::new(ScriptedGasRuntime::new(ProbeScript::Empty).native_estimate(120_000));
    let gas = estimate_gas_for_transaction_execution(&contract(&runtime), addr(0xee), &unsigned_tx())
        .await
        .unwrap();
    assert_eq!(gas, 120_000);
}

#[tokio::test]
async fn test_execution_gas_failure_is_not_retried() {
    let runtime = Arc::new(ScriptedGasRuntime::new(ProbeScript::Empty));
    let result =
        estimate_gas_for_transaction_execution(&contract(&runtime), addr(0xee), &unsigned_tx()).await;

    assert!(matches!(result, Err(SafeError::EstimationFailure(_))));
    assert_eq!(runtime.native_calls(), 1);
}

#[tokio::test]
async fn test_create_transaction_estimates_missing_gas() {
    let fake = Arc::new(FakeSafe::new(addr(0x5a), vec![addr(0x11)], 1));
    fake.set_nonce(7);
    let safe = Safe::new(addr(0x5a), fake.clone());

    let tx = safe
        .create_transaction(
            MetaTransaction {
                to: addr(0x42),
                value: U256::from(5),
                data: Bytes::new(),
                operation: Operation::Call,
            },
            SafeTransactionOptions::default(),
        )
        .await
        .unwrap();

    // The fake measures 21k and answers the first dry-run.
    assert_eq!(tx.data.safe_tx_gas, 21_000 + SAFE_TX_GAS_MARGIN + INITIAL_ADDITIONAL_GAS);
    assert_eq!(tx.data.nonce, 7);
    assert_eq!(tx.data.base_gas, 0);
    assert_eq!(tx.data.gas_price, 0);
}

#[tokio::test]
async fn test_signed_transaction_execution_estimate() {
    let wallet = Wallet::from_private_key(common::OWNER_KEY).unwrap();
    let fake = Arc::new(FakeSafe::new(addr(0x5a), vec![wallet.address()], 1));
    let safe = Safe::new(addr(0x5a), fake.clone());

    let mut tx = unsigned_tx();
    safe.sign_transaction(&wallet, &mut tx).await.unwrap();
    assert_eq!(tx.encoded_signatures().len(), 65);

    let gas = safe.estimate_execution_gas(wallet.address(), &tx).await.unwrap();
    assert_eq!(gas, 95_000);
}
