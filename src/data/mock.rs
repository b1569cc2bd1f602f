//! In-memory chain used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;

use crate::data::calls::CallDescriptor;
use crate::data::error::ChainError;
use crate::data::provider::{ChainClient, TransferFilter};
use crate::data::types::{RawTransfer, ReadValue, ReceiptStatus, ReceiptSummary, TxHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptBehavior {
    /// Pending for `polls` lookups, then mined.
    AfterPolls { polls: usize, success: bool },
    Never,
}

pub struct MockChain {
    account: Mutex<Option<Address>>,
    can_sign: Mutex<bool>,
    reads: Mutex<HashMap<(Address, Bytes), Result<ReadValue, ChainError>>>,
    read_delay: Mutex<Duration>,
    natives: Mutex<HashMap<Address, U256>>,
    submit_error: Mutex<Option<ChainError>>,
    submitted: Mutex<Vec<CallDescriptor>>,
    receipt_behavior: Mutex<ReceiptBehavior>,
    logs: Mutex<Vec<RawTransfer>>,
    logs_error: Mutex<Option<ChainError>>,
    timestamps: Mutex<HashMap<u64, u64>>,
    failing_blocks: Mutex<HashSet<u64>>,
    latest: Mutex<u64>,
    read_calls: AtomicUsize,
    receipt_calls: AtomicUsize,
    timestamp_calls: AtomicUsize,
    log_calls: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            account: Mutex::new(None),
            can_sign: Mutex::new(false),
            reads: Mutex::new(HashMap::new()),
            read_delay: Mutex::new(Duration::ZERO),
            natives: Mutex::new(HashMap::new()),
            submit_error: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
            receipt_behavior: Mutex::new(ReceiptBehavior::AfterPolls {
                polls: 0,
                success: true,
            }),
            logs: Mutex::new(Vec::new()),
            logs_error: Mutex::new(None),
            timestamps: Mutex::new(HashMap::new()),
            failing_blocks: Mutex::new(HashSet::new()),
            latest: Mutex::new(100),
            read_calls: AtomicUsize::new(0),
            receipt_calls: AtomicUsize::new(0),
            timestamp_calls: AtomicUsize::new(0),
            log_calls: AtomicUsize::new(0),
        }
    }

    /// A chain with a connected, signing account.
    pub fn with_signer(account: Address) -> Self {
        let chain = Self::new();
        *chain.account.lock().unwrap() = Some(account);
        *chain.can_sign.lock().unwrap() = true;
        chain
    }

    pub fn set_account(&self, account: Option<Address>) {
        *self.account.lock().unwrap() = account;
    }

    pub fn set_read(&self, call: &CallDescriptor, value: Result<ReadValue, ChainError>) {
        self.reads
            .lock()
            .unwrap()
            .insert((call.contract, call.calldata.clone()), value);
    }

    pub fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = delay;
    }

    pub fn set_native(&self, address: Address, balance: U256) {
        self.natives.lock().unwrap().insert(address, balance);
    }

    pub fn fail_submit(&self, err: ChainError) {
        *self.submit_error.lock().unwrap() = Some(err);
    }

    pub fn set_receipt_behavior(&self, behavior: ReceiptBehavior) {
        *self.receipt_behavior.lock().unwrap() = behavior;
    }

    pub fn push_log(&self, log: RawTransfer) {
        self.logs.lock().unwrap().push(log);
    }

    pub fn fail_logs(&self, err: ChainError) {
        *self.logs_error.lock().unwrap() = Some(err);
    }

    pub fn set_timestamp(&self, block: u64, timestamp: u64) {
        self.timestamps.lock().unwrap().insert(block, timestamp);
    }

    pub fn fail_timestamp(&self, block: u64) {
        self.failing_blocks.lock().unwrap().insert(block);
    }

    pub fn submitted(&self) -> Vec<CallDescriptor> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn receipt_calls(&self) -> usize {
        self.receipt_calls.load(Ordering::SeqCst)
    }

    pub fn timestamp_calls(&self) -> usize {
        self.timestamp_calls.load(Ordering::SeqCst)
    }

    pub fn log_calls(&self) -> usize {
        self.log_calls.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        let delay = *self.read_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn account(&self) -> Option<Address> {
        *self.account.lock().unwrap()
    }

    fn can_sign(&self) -> bool {
        *self.can_sign.lock().unwrap()
    }

    async fn read(&self, call: &CallDescriptor) -> Result<ReadValue, ChainError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.reads
            .lock()
            .unwrap()
            .get(&(call.contract, call.calldata.clone()))
            .cloned()
            .unwrap_or_else(|| Err(ChainError::Rpc(format!("no mock for {}", call.signature))))
    }

    async fn native_balance(&self, address: Address) -> Result<U256, ChainError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        Ok(self
            .natives
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn submit(&self, call: &CallDescriptor) -> Result<TxHandle, ChainError> {
        if !self.can_sign() {
            return Err(ChainError::NoSigner);
        }
        if let Some(err) = self.submit_error.lock().unwrap().clone() {
            return Err(err);
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(call.clone());
        Ok(TxHandle {
            hash: B256::with_last_byte(submitted.len() as u8),
            submitted_at: 1_700_000_000,
        })
    }

    async fn receipt(&self, hash: B256) -> Result<Option<ReceiptStatus>, ChainError> {
        let calls = self.receipt_calls.fetch_add(1, Ordering::SeqCst) + 1;
        match *self.receipt_behavior.lock().unwrap() {
            ReceiptBehavior::AfterPolls { polls, success } if calls > polls => {
                Ok(Some(ReceiptStatus {
                    success,
                    summary: ReceiptSummary {
                        tx_hash: hash,
                        block_number: Some(*self.latest.lock().unwrap()),
                        gas_used: 21_000,
                    },
                }))
            }
            _ => Ok(None),
        }
    }

    async fn transfer_logs(
        &self,
        _token: Address,
        filter: TransferFilter,
    ) -> Result<Vec<RawTransfer>, ChainError> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.logs_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| match filter {
                TransferFilter::From(addr) => log.from == addr,
                TransferFilter::To(addr) => log.to == addr,
            })
            .cloned()
            .collect())
    }

    async fn block_timestamp(&self, number: u64) -> Result<u64, ChainError> {
        self.timestamp_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_blocks.lock().unwrap().contains(&number) {
            return Err(ChainError::Rpc(format!("block {number} unavailable")));
        }
        Ok(self
            .timestamps
            .lock()
            .unwrap()
            .get(&number)
            .copied()
            .unwrap_or(1_700_000_000 + number * 12))
    }

    async fn latest_block(&self) -> Result<u64, ChainError> {
        Ok(*self.latest.lock().unwrap())
    }

    fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(5)
    }
}
