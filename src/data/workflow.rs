use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy::primitives::B256;
use tracing::{info, warn};

use crate::data::calls::{ActionKind, ActionRequest, CallDescriptor, Contracts};
use crate::data::error::{ChainError, InputError};
use crate::data::provider::ChainClient;
use crate::data::types::{ReadGroup, ReceiptSummary, TxHandle};

pub type WorkflowId = u64;

/// Lifecycle of one write. Transitions only move forward:
/// `Idle -> Submitting -> AwaitingConfirmation -> Succeeded`, with `Failed`
/// reachable from `Submitting` and `AwaitingConfirmation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Submitting,
    AwaitingConfirmation(TxHandle),
    Succeeded(ReceiptSummary),
    Failed(ChainError),
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Succeeded(_) | WorkflowState::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "Idle",
            WorkflowState::Submitting => "Submitting",
            WorkflowState::AwaitingConfirmation(_) => "Confirming",
            WorkflowState::Succeeded(_) => "Confirmed",
            WorkflowState::Failed(_) => "Failed",
        }
    }

    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            WorkflowState::AwaitingConfirmation(handle) => Some(handle.hash),
            WorkflowState::Succeeded(summary) => Some(summary.tx_hash),
            WorkflowState::Failed(ChainError::Timeout { hash, .. }) => Some(*hash),
            _ => None,
        }
    }
}

/// A single-use state machine driving one write from submission to receipt.
#[derive(Debug, Clone)]
pub struct TxWorkflow {
    pub id: WorkflowId,
    pub kind: ActionKind,
    pub call: CallDescriptor,
    pub state: WorkflowState,
}

impl TxWorkflow {
    pub fn new(id: WorkflowId, kind: ActionKind, call: CallDescriptor) -> Self {
        Self {
            id,
            kind,
            call,
            state: WorkflowState::Idle,
        }
    }

    /// Drive the workflow to a terminal state. `observe` sees every transition.
    pub async fn run<F>(mut self, client: &dyn ChainClient, timeout: Duration, mut observe: F) -> Self
    where
        F: FnMut(&TxWorkflow) + Send,
    {
        self.transition(WorkflowState::Submitting, &mut observe);

        let handle = match client.submit(&self.call).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(id = self.id, action = %self.kind, error = %e, "submission failed");
                self.transition(WorkflowState::Failed(e), &mut observe);
                return self;
            }
        };
        self.transition(WorkflowState::AwaitingConfirmation(handle), &mut observe);

        let outcome = match client.wait_for_confirmation(&handle, timeout).await {
            Ok(summary) => {
                info!(
                    id = self.id,
                    action = %self.kind,
                    hash = %summary.tx_hash,
                    block = ?summary.block_number,
                    gas_used = summary.gas_used,
                    "transaction confirmed"
                );
                WorkflowState::Succeeded(summary)
            }
            Err(e) => {
                warn!(id = self.id, action = %self.kind, error = %e, "confirmation failed");
                WorkflowState::Failed(e)
            }
        };
        self.transition(outcome, &mut observe);
        self
    }

    fn transition<F: FnMut(&TxWorkflow)>(&mut self, next: WorkflowState, observe: &mut F) {
        self.state = next;
        observe(self);
    }
}

/// Receives the read groups made stale by a confirmed write.
pub trait Invalidate: Send + Sync {
    fn invalidate(&self, groups: &[ReadGroup]);
}

/// Validates write requests and runs their workflows.
pub struct TxEngine {
    client: Arc<dyn ChainClient>,
    contracts: Contracts,
    timeout: Duration,
    invalidator: Arc<dyn Invalidate>,
    next_id: AtomicU64,
}

impl TxEngine {
    pub fn new(
        client: Arc<dyn ChainClient>,
        contracts: Contracts,
        timeout: Duration,
        invalidator: Arc<dyn Invalidate>,
    ) -> Self {
        Self {
            client,
            contracts,
            timeout,
            invalidator,
            next_id: AtomicU64::new(0),
        }
    }

    /// Validate and encode a request. Nothing is sent on failure.
    pub fn prepare(&self, request: &ActionRequest) -> Result<TxWorkflow, InputError> {
        let call = self.contracts.build(request)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TxWorkflow::new(id, request.kind(), call))
    }

    /// Run a prepared workflow. On success the affected read groups are invalidated.
    pub async fn execute<F>(&self, workflow: TxWorkflow, observe: F) -> TxWorkflow
    where
        F: FnMut(&TxWorkflow) + Send,
    {
        let done = workflow
            .run(self.client.as_ref(), self.timeout, observe)
            .await;
        if matches!(done.state, WorkflowState::Succeeded(_)) {
            self.invalidator.invalidate(done.kind.invalidates());
        }
        done
    }
}
