//! In-memory fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::sol_types::{SolInterface, SolValue};
use async_trait::async_trait;

use safe_relay::blockchain::{
    BlockTag, BlockchainError, BlockchainResult, CallRequest, Receipt, Runtime, SimulationOutcome,
};
use safe_relay::safe::contracts::ISafe::ISafeCalls;
use safe_relay::safe::types::MetaTransaction;
use safe_relay::safe::{SafeSignature, SafeTransaction, SENTINEL_ADDRESS};
use safe_relay::service::{CoordinationService, SafeTxDetails, ServiceError, ServiceResult};

pub const CHAIN_ID: u64 = 31337;

/// Anvil's first dev account.
pub const OWNER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn addr(n: u8) -> Address {
    Address::repeat_byte(n)
}

/// Revert payload of `requiredTxGas`: `Error(string)` whose body is the measured gas.
pub fn required_tx_gas_revert(measured: u64) -> Bytes {
    let mut payload = vec![0x08, 0xc3, 0x79, 0xa0];
    payload.extend_from_slice(&U256::from(32).to_be_bytes::<32>());
    payload.extend_from_slice(&U256::from(32).to_be_bytes::<32>());
    payload.extend_from_slice(&U256::from(measured).to_be_bytes::<32>());
    payload.into()
}

pub fn receipt(tx_hash: TxHash, block_number: u64) -> Receipt {
    Receipt {
        transaction_hash: tx_hash,
        block_hash: Some(B256::repeat_byte(0xbb)),
        block_number: Some(block_number),
        from: addr(0xee),
        to: None,
        contract_address: None,
        gas_used: 84_000,
        status: true,
    }
}

struct SafeState {
    owners: Vec<Address>,
    threshold: u64,
    nonce: u64,
    block_number: u64,
    receipts: HashMap<TxHash, Receipt>,
}

/// A Safe whose owner list behaves like the on-chain linked list.
pub struct FakeSafe {
    address: Address,
    measured_gas: u64,
    execution_gas: u64,
    state: Mutex<SafeState>,
}

impl FakeSafe {
    pub fn new(address: Address, owners: Vec<Address>, threshold: u64) -> Self {
        Self {
            address,
            measured_gas: 21_000,
            execution_gas: 95_000,
            state: Mutex::new(SafeState {
                owners,
                threshold,
                nonce: 0,
                block_number: 100,
                receipts: HashMap::new(),
            }),
        }
    }

    pub fn owners(&self) -> Vec<Address> {
        self.state.lock().unwrap().owners.clone()
    }

    pub fn threshold(&self) -> u64 {
        self.state.lock().unwrap().threshold
    }

    pub fn set_nonce(&self, nonce: u64) {
        self.state.lock().unwrap().nonce = nonce;
    }

    pub fn set_block_number(&self, block_number: u64) {
        self.state.lock().unwrap().block_number = block_number;
    }

    pub fn add_receipt(&self, receipt: Receipt) {
        self.state
            .lock()
            .unwrap()
            .receipts
            .insert(receipt.transaction_hash, receipt);
    }

    /// Execute owner-management calldata the way the Safe contract would,
    /// with the same `GS2xx` checks.
    pub fn apply(&self, calldata: &[u8]) -> Result<(), String> {
        let call = ISafeCalls::abi_decode(calldata).map_err(|e| e.to_string())?;
        let mut state = self.state.lock().unwrap();

        match call {
            ISafeCalls::addOwnerWithThreshold(c) => {
                check_new_owner(&state.owners, c.owner)?;
                state.owners.insert(0, c.owner);
                set_threshold(&mut state, c._threshold)
            }
            ISafeCalls::removeOwner(c) => {
                let index = linked_index(&state.owners, c.prevOwner, c.owner)?;
                if state.owners.len() - 1 < to_u64(c._threshold)? as usize {
                    return Err("GS201".into());
                }
                state.owners.remove(index);
                set_threshold(&mut state, c._threshold)
            }
            ISafeCalls::swapOwner(c) => {
                check_new_owner(&state.owners, c.newOwner)?;
                let index = linked_index(&state.owners, c.prevOwner, c.oldOwner)?;
                state.owners[index] = c.newOwner;
                Ok(())
            }
            ISafeCalls::changeThreshold(c) => set_threshold(&mut state, c._threshold),
            _ => Err("not an owner-management call".into()),
        }
    }
}

fn to_u64(value: U256) -> Result<u64, String> {
    u64::try_from(value).map_err(|e| e.to_string())
}

fn check_new_owner(owners: &[Address], owner: Address) -> Result<(), String> {
    if owner == Address::ZERO || owner == SENTINEL_ADDRESS {
        return Err("GS203".into());
    }
    if owners.contains(&owner) {
        return Err("GS204".into());
    }
    Ok(())
}

fn linked_index(owners: &[Address], prev: Address, owner: Address) -> Result<usize, String> {
    let index = owners.iter().position(|o| *o == owner).ok_or("GS205")?;
    let expected = if index == 0 { SENTINEL_ADDRESS } else { owners[index - 1] };
    if expected != prev {
        return Err("GS205".into());
    }
    Ok(index)
}

fn set_threshold(state: &mut SafeState, threshold: U256) -> Result<(), String> {
    let threshold = to_u64(threshold)?;
    if threshold as usize > state.owners.len() {
        return Err("GS201".into());
    }
    if threshold == 0 {
        return Err("GS202".into());
    }
    state.threshold = threshold;
    Ok(())
}

#[async_trait]
impl Runtime for FakeSafe {
    async fn simulate(
        &self,
        request: &CallRequest,
        _block: BlockTag,
    ) -> BlockchainResult<SimulationOutcome> {
        if request.to != self.address {
            return Ok(SimulationOutcome::Success(Bytes::new()));
        }
        let call = ISafeCalls::abi_decode(&request.data)
            .map_err(|e| BlockchainError::Rpc(e.to_string()))?;
        let state = self.state.lock().unwrap();

        let output = match call {
            ISafeCalls::getOwners(_) => (state.owners.clone(),).abi_encode_params(),
            ISafeCalls::getThreshold(_) => (U256::from(state.threshold),).abi_encode_params(),
            ISafeCalls::isOwner(c) => (state.owners.contains(&c.owner),).abi_encode_params(),
            ISafeCalls::nonce(_) => (U256::from(state.nonce),).abi_encode_params(),
            ISafeCalls::requiredTxGas(_) => {
                return Ok(SimulationOutcome::Reverted(required_tx_gas_revert(self.measured_gas)))
            }
            _ => return Ok(SimulationOutcome::Reverted(Bytes::new())),
        };
        Ok(SimulationOutcome::Success(output.into()))
    }

    async fn estimate_gas(&self, _request: &CallRequest, _block: BlockTag) -> BlockchainResult<u64> {
        Ok(self.execution_gas)
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<Receipt>> {
        Ok(self.state.lock().unwrap().receipts.get(&tx_hash).cloned())
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        Ok(self.state.lock().unwrap().block_number)
    }

    async fn get_chain_id(&self) -> BlockchainResult<u64> {
        Ok(CHAIN_ID)
    }
}

/// How the `requiredTxGas` probe answers.
#[derive(Debug, Clone, Copy)]
pub enum ProbeScript {
    Measured(u64),
    /// Reverts without data.
    Empty,
    /// Transport failure.
    Fail,
}

/// Gas runtime with scripted probe, dry-run and native-estimate answers.
pub struct ScriptedGasRuntime {
    probe: ProbeScript,
    /// Dry-runs with at least this gas limit return data.
    succeed_from_gas_limit: Option<u64>,
    native_estimate: Option<u64>,
    dry_runs: Mutex<Vec<u64>>,
    native_calls: AtomicU32,
}

impl ScriptedGasRuntime {
    pub fn new(probe: ProbeScript) -> Self {
        Self {
            probe,
            succeed_from_gas_limit: None,
            native_estimate: None,
            dry_runs: Mutex::new(Vec::new()),
            native_calls: AtomicU32::new(0),
        }
    }

    pub fn succeed_from_gas_limit(mut self, gas_limit: u64) -> Self {
        self.succeed_from_gas_limit = Some(gas_limit);
        self
    }

    pub fn native_estimate(mut self, gas: u64) -> Self {
        self.native_estimate = Some(gas);
        self
    }

    /// Gas limits of every dry-run, in order.
    pub fn dry_runs(&self) -> Vec<u64> {
        self.dry_runs.lock().unwrap().clone()
    }

    pub fn native_calls(&self) -> u32 {
        self.native_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Runtime for ScriptedGasRuntime {
    async fn simulate(
        &self,
        request: &CallRequest,
        _block: BlockTag,
    ) -> BlockchainResult<SimulationOutcome> {
        if let Some(gas_limit) = request.gas_limit {
            self.dry_runs.lock().unwrap().push(gas_limit);
            return match self.succeed_from_gas_limit {
                Some(threshold) if gas_limit >= threshold => {
                    Ok(SimulationOutcome::Reverted(required_tx_gas_revert(1)))
                }
                _ => Ok(SimulationOutcome::Reverted(Bytes::new())),
            };
        }

        match self.probe {
            ProbeScript::Measured(gas) => Ok(SimulationOutcome::Reverted(required_tx_gas_revert(gas))),
            ProbeScript::Empty => Ok(SimulationOutcome::Reverted(Bytes::new())),
            ProbeScript::Fail => Err(BlockchainError::Rpc("connection refused".into())),
        }
    }

    async fn estimate_gas(&self, _request: &CallRequest, _block: BlockTag) -> BlockchainResult<u64> {
        self.native_calls.fetch_add(1, Ordering::SeqCst);
        self.native_estimate
            .ok_or_else(|| BlockchainError::Reverted(Bytes::new()))
    }

    async fn get_transaction_receipt(&self, _tx_hash: TxHash) -> BlockchainResult<Option<Receipt>> {
        Err(BlockchainError::NotAvailable("eth_getTransactionReceipt".into()))
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        Err(BlockchainError::NotAvailable("eth_blockNumber".into()))
    }

    async fn get_chain_id(&self) -> BlockchainResult<u64> {
        Ok(CHAIN_ID)
    }
}

#[derive(Debug, Clone)]
pub struct Proposal {
    pub safe: Address,
    pub safe_tx_hash: B256,
    pub tx: SafeTransaction,
    pub signature: SafeSignature,
}

/// Coordination service that records proposals and scripts status answers.
pub struct RecordingService {
    safe_tx_gas: u64,
    reject_proposals: bool,
    /// Status polls that fail before any succeeds.
    failing_polls: AtomicU32,
    /// Successful polls reporting "pending" before execution shows up.
    pending_polls: AtomicU32,
    executed_tx: Option<TxHash>,
    status_polls: AtomicU32,
    estimations: Mutex<Vec<MetaTransaction>>,
    proposals: Mutex<Vec<Proposal>>,
}

impl RecordingService {
    pub fn new(safe_tx_gas: u64) -> Self {
        Self {
            safe_tx_gas,
            reject_proposals: false,
            failing_polls: AtomicU32::new(0),
            pending_polls: AtomicU32::new(0),
            executed_tx: None,
            status_polls: AtomicU32::new(0),
            estimations: Mutex::new(Vec::new()),
            proposals: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting_proposals(mut self) -> Self {
        self.reject_proposals = true;
        self
    }

    pub fn failing_polls(self, count: u32) -> Self {
        self.failing_polls.store(count, Ordering::SeqCst);
        self
    }

    pub fn pending_polls(self, count: u32) -> Self {
        self.pending_polls.store(count, Ordering::SeqCst);
        self
    }

    pub fn executed_as(mut self, tx_hash: TxHash) -> Self {
        self.executed_tx = Some(tx_hash);
        self
    }

    pub fn status_polls(&self) -> u32 {
        self.status_polls.load(Ordering::SeqCst)
    }

    pub fn estimations(&self) -> Vec<MetaTransaction> {
        self.estimations.lock().unwrap().clone()
    }

    pub fn proposals(&self) -> Vec<Proposal> {
        self.proposals.lock().unwrap().clone()
    }
}

fn take_one(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl CoordinationService for RecordingService {
    async fn estimate_safe_tx(&self, _safe: Address, tx: &MetaTransaction) -> ServiceResult<u64> {
        self.estimations.lock().unwrap().push(tx.clone());
        Ok(self.safe_tx_gas)
    }

    async fn propose_tx(
        &self,
        safe: Address,
        safe_tx_hash: B256,
        tx: &SafeTransaction,
        signature: &SafeSignature,
    ) -> ServiceResult<()> {
        if self.reject_proposals {
            return Err(ServiceError::Status {
                status: 422,
                body: "{\"nonFieldErrors\":[\"Signer is not an owner\"]}".into(),
            });
        }
        self.proposals.lock().unwrap().push(Proposal {
            safe,
            safe_tx_hash,
            tx: tx.clone(),
            signature: signature.clone(),
        });
        Ok(())
    }

    async fn get_safe_tx_details(&self, safe_tx_hash: B256) -> ServiceResult<SafeTxDetails> {
        self.status_polls.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.failing_polls) {
            return Err(ServiceError::Status {
                status: 503,
                body: "upstream unavailable".into(),
            });
        }

        let mut details = SafeTxDetails {
            safe_tx_hash: Some(safe_tx_hash),
            ..SafeTxDetails::default()
        };
        if !take_one(&self.pending_polls) {
            details.transaction_hash = self.executed_tx;
            details.is_executed = Some(self.executed_tx.is_some());
        }
        Ok(details)
    }
}
