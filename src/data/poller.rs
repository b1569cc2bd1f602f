use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, U256};
use futures::future::join_all;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::data::calls::{CallDescriptor, Contracts};
use crate::data::error::ChainError;
use crate::data::lock;
use crate::data::provider::ChainClient;
use crate::data::types::{ReadGroup, ReadKey, ReadValue};
use crate::events::AppEvent;

/// Where a read gets its value from.
#[derive(Debug, Clone)]
pub enum ReadSource {
    Contract(CallDescriptor),
    NativeBalance(Address),
}

#[derive(Debug, Clone)]
pub struct ReadSpec {
    pub key: ReadKey,
    pub source: ReadSource,
    /// Used in place of the result when the call reverts.
    pub fallback: Option<ReadValue>,
}

impl ReadSpec {
    pub fn contract(key: ReadKey, call: CallDescriptor) -> Self {
        Self {
            key,
            source: ReadSource::Contract(call),
            fallback: None,
        }
    }

    pub fn native(key: ReadKey, address: Address) -> Self {
        Self {
            key,
            source: ReadSource::NativeBalance(address),
            fallback: None,
        }
    }

    pub fn or_on_revert(mut self, value: ReadValue) -> Self {
        self.fallback = Some(value);
        self
    }
}

/// Values from one successful batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub values: BTreeMap<ReadKey, ReadValue>,
    pub fetched_at: u64,
}

impl Snapshot {
    pub fn get(&self, key: ReadKey) -> Option<&ReadValue> {
        self.values.get(&key)
    }

    pub fn uint(&self, key: ReadKey) -> Option<U256> {
        self.get(key).and_then(ReadValue::as_uint)
    }

    pub fn text(&self, key: ReadKey) -> Option<&str> {
        self.get(key).and_then(ReadValue::as_text)
    }
}

/// The last committed snapshot plus the error from the most recent batch, if it failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotState {
    pub snapshot: Option<Snapshot>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{key}: {source}")]
pub struct BatchError {
    pub key: ReadKey,
    pub source: ChainError,
}

/// Run every read concurrently. The batch succeeds only if each read
/// succeeded or reverted with a fallback.
pub async fn fetch_batch(
    client: &dyn ChainClient,
    specs: &[ReadSpec],
) -> Result<Snapshot, BatchError> {
    let results = join_all(specs.iter().map(|spec| async move {
        let result = match &spec.source {
            ReadSource::Contract(call) => client.read(call).await,
            ReadSource::NativeBalance(address) => {
                client.native_balance(*address).await.map(ReadValue::Uint)
            }
        };
        (spec, result)
    }))
    .await;

    let mut values = BTreeMap::new();
    for (spec, result) in results {
        let value = match (result, &spec.fallback) {
            (Ok(value), _) => value,
            (Err(e), Some(fallback)) if e.is_revert() => {
                debug!(key = %spec.key, error = %e, "read reverted, using fallback");
                fallback.clone()
            }
            (Err(source), _) => {
                return Err(BatchError {
                    key: spec.key,
                    source,
                });
            }
        };
        values.insert(spec.key, value);
    }

    Ok(Snapshot {
        values,
        fetched_at: chrono::Utc::now().timestamp() as u64,
    })
}

/// Coalesces refresh triggers: at most one run in flight and one queued.
#[derive(Debug, Default)]
pub struct RefreshGate {
    running: bool,
    pending: bool,
}

impl RefreshGate {
    /// Returns `true` if the caller should start a run now.
    pub fn request(&mut self) -> bool {
        if self.running {
            self.pending = true;
            false
        } else {
            self.running = true;
            true
        }
    }

    /// Mark the current run finished. Returns `true` if a queued run should start.
    pub fn finish(&mut self) -> bool {
        if self.pending {
            self.pending = false;
            true
        } else {
            self.running = false;
            false
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Inputs a read plan depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadContext {
    pub account: Option<Address>,
    /// Spender for the allowance read. Defaults to the account itself.
    pub spender: Option<Address>,
}

pub type ReadPlan = Arc<dyn Fn(&ReadContext) -> Vec<ReadSpec> + Send + Sync>;

pub fn token_plan(contracts: Contracts) -> ReadPlan {
    Arc::new(move |ctx: &ReadContext| {
        let mut specs = vec![
            ReadSpec::contract(ReadKey::TokenName, contracts.name()),
            ReadSpec::contract(ReadKey::TokenSymbol, contracts.symbol()),
        ];
        if let Some(account) = ctx.account {
            specs.push(ReadSpec::contract(
                ReadKey::Balance,
                contracts.balance_of(account),
            ));
        }
        specs
    })
}

pub fn allowance_plan(contracts: Contracts) -> ReadPlan {
    Arc::new(move |ctx: &ReadContext| {
        let Some(account) = ctx.account else {
            return vec![];
        };
        let spender = ctx.spender.unwrap_or(account);
        vec![
            ReadSpec::contract(ReadKey::Allowance, contracts.allowance(account, spender))
                .or_on_revert(ReadValue::Uint(U256::ZERO)),
        ]
    })
}

/// `None` when no swap contract is configured.
pub fn pool_plan(contracts: Contracts) -> Option<ReadPlan> {
    let swap = contracts.swap?;
    let rate = contracts.rate()?;
    Some(Arc::new(move |ctx: &ReadContext| {
        let mut specs = vec![
            ReadSpec::native(ReadKey::PoolNativeBalance, swap),
            ReadSpec::contract(ReadKey::PoolTokenBalance, contracts.balance_of(swap)),
            ReadSpec::contract(ReadKey::Rate, rate.clone()),
        ];
        if let Some(account) = ctx.account {
            specs.push(ReadSpec::contract(
                ReadKey::Balance,
                contracts.balance_of(account),
            ));
        }
        specs
    }))
}

/// Keeps one read group's snapshot current.
pub struct ReadPoller {
    group: ReadGroup,
    client: Arc<dyn ChainClient>,
    plan: ReadPlan,
    context: Mutex<ReadContext>,
    gate: Mutex<RefreshGate>,
    state: Mutex<SnapshotState>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl ReadPoller {
    pub fn new(
        group: ReadGroup,
        client: Arc<dyn ChainClient>,
        plan: ReadPlan,
        context: ReadContext,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            group,
            client,
            plan,
            context: Mutex::new(context),
            gate: Mutex::new(RefreshGate::default()),
            state: Mutex::new(SnapshotState::default()),
            event_tx,
        }
    }

    pub fn group(&self) -> ReadGroup {
        self.group
    }

    /// Replace the read context, refreshing if it changed.
    pub fn set_context(self: &Arc<Self>, context: ReadContext) {
        {
            let mut current = lock(&self.context);
            if *current == context {
                return;
            }
            *current = context;
        }
        self.trigger();
    }

    /// Request a refresh. Coalesced with any batch already running.
    pub fn trigger(self: &Arc<Self>) {
        if !lock(&self.gate).request() {
            debug!(group = %self.group, "refresh queued behind running batch");
            return;
        }
        let this = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                this.run_once().await;
                if !lock(&this.gate).finish() {
                    break;
                }
            }
        });
    }

    /// Fetch one batch and commit it, ignoring the gate.
    pub async fn run_once(&self) -> SnapshotState {
        let context = *lock(&self.context);
        let specs = (self.plan)(&context);
        let result = fetch_batch(self.client.as_ref(), &specs).await;

        // The context moved while this batch ran; its set_context queued a newer one.
        if *lock(&self.context) != context {
            debug!(group = %self.group, "context changed mid-batch, dropping result");
            return lock(&self.state).clone();
        }

        let state = {
            let mut state = lock(&self.state);
            match result {
                Ok(snapshot) => {
                    debug!(group = %self.group, reads = snapshot.values.len(), "snapshot committed");
                    state.snapshot = Some(snapshot);
                    state.error = None;
                }
                Err(e) => {
                    warn!(group = %self.group, error = %e, "read batch failed, keeping previous snapshot");
                    state.error = Some(e.to_string());
                }
            }
            state.clone()
        };

        let _ = self.event_tx.send(AppEvent::SnapshotUpdated {
            group: self.group,
            state: state.clone(),
        });
        state
    }

    pub fn is_idle(&self) -> bool {
        !lock(&self.gate).is_running()
    }
}
