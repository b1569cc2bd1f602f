pub mod calls;
pub mod chains;
pub mod error;
pub mod export;
pub mod history;
#[cfg(test)]
pub mod mock;
pub mod poller;
pub mod provider;
pub mod types;
pub mod workflow;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy::primitives::Address;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::data::calls::{ActionRequest, Contracts};
use crate::data::error::InputError;
use crate::data::history::{HistoryAggregator, HistoryService};
use crate::data::poller::{ReadContext, ReadPoller, allowance_plan, pool_plan, token_plan};
use crate::data::provider::ChainClient;
use crate::data::types::ReadGroup;
use crate::data::workflow::{Invalidate, TxEngine, WorkflowId};
use crate::events::{AppEvent, ExportFormat};

/// Lock a std mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Routes invalidated read groups to the pollers and history service that own them.
pub struct RefreshHub {
    pollers: Vec<Arc<ReadPoller>>,
    history: Arc<HistoryService>,
}

impl RefreshHub {
    pub fn new(pollers: Vec<Arc<ReadPoller>>, history: Arc<HistoryService>) -> Self {
        Self { pollers, history }
    }

    pub fn refresh_all(&self) {
        for poller in &self.pollers {
            poller.trigger();
        }
        self.history.trigger();
    }

    /// Whether any refresh is running or queued.
    pub fn is_busy(&self) -> bool {
        !self.history.is_idle() || self.pollers.iter().any(|p| !p.is_idle())
    }

    fn poller(&self, group: ReadGroup) -> Option<&Arc<ReadPoller>> {
        self.pollers.iter().find(|p| p.group() == group)
    }
}

impl Invalidate for RefreshHub {
    fn invalidate(&self, groups: &[ReadGroup]) {
        debug!(?groups, "invalidating read groups");
        for group in groups {
            match group {
                ReadGroup::History => self.history.trigger(),
                other => {
                    if let Some(poller) = self.poller(*other) {
                        poller.trigger();
                    }
                }
            }
        }
    }
}

/// Tunables for the data layer.
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    pub confirm_timeout: Duration,
    pub history_window: usize,
}

pub struct DataService {
    client: Arc<dyn ChainClient>,
    contracts: Contracts,
    engine: Arc<TxEngine>,
    hub: Arc<RefreshHub>,
    context: Mutex<ReadContext>,
    history: Arc<HistoryService>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl DataService {
    pub fn new(
        client: Arc<dyn ChainClient>,
        contracts: Contracts,
        settings: ServiceSettings,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let context = ReadContext {
            account: client.account(),
            spender: None,
        };

        let mut pollers = vec![
            Arc::new(ReadPoller::new(
                ReadGroup::Token,
                Arc::clone(&client),
                token_plan(contracts),
                context,
                event_tx.clone(),
            )),
            Arc::new(ReadPoller::new(
                ReadGroup::Allowance,
                Arc::clone(&client),
                allowance_plan(contracts),
                context,
                event_tx.clone(),
            )),
        ];
        if let Some(plan) = pool_plan(contracts) {
            pollers.push(Arc::new(ReadPoller::new(
                ReadGroup::Pool,
                Arc::clone(&client),
                plan,
                context,
                event_tx.clone(),
            )));
        }

        let history = Arc::new(HistoryService::new(
            HistoryAggregator::new(Arc::clone(&client), contracts.token, settings.history_window),
            context.account,
            event_tx.clone(),
        ));
        let hub = Arc::new(RefreshHub::new(pollers, Arc::clone(&history)));
        let engine = Arc::new(TxEngine::new(
            Arc::clone(&client),
            contracts,
            settings.confirm_timeout,
            hub.clone(),
        ));

        Self {
            client,
            contracts,
            engine,
            hub,
            context: Mutex::new(context),
            history,
            event_tx,
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.client.account()
    }

    pub fn can_sign(&self) -> bool {
        self.client.can_sign()
    }

    pub fn contracts(&self) -> Contracts {
        self.contracts
    }

    /// Load every read group and the history.
    pub fn refresh_all(&self) {
        self.hub.refresh_all();
    }

    pub fn is_refreshing(&self) -> bool {
        self.hub.is_busy()
    }

    pub fn refresh_history(&self) {
        self.history.trigger();
    }

    /// Point the allowance read at a different spender. `None` means the account itself.
    pub fn set_spender(&self, spender: Option<Address>) {
        let context = {
            let mut context = lock(&self.context);
            if context.spender == spender {
                return;
            }
            context.spender = spender;
            *context
        };
        if let Some(poller) = self.hub.poller(ReadGroup::Allowance) {
            poller.set_context(context);
        }
    }

    /// Validate a request and run it in the background.
    ///
    /// Invalid input is returned here and never becomes a workflow. Every
    /// state change of an accepted workflow arrives as `WorkflowUpdated`.
    pub fn submit_action(&self, request: &ActionRequest) -> Result<WorkflowId, InputError> {
        let workflow = self.engine.prepare(request)?;
        let id = workflow.id;
        info!(id, action = %workflow.kind, signature = workflow.call.signature, "workflow started");
        let _ = self.event_tx.send(AppEvent::WorkflowUpdated(workflow.clone()));

        let engine = Arc::clone(&self.engine);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            engine
                .execute(workflow, |wf| {
                    let _ = tx.send(AppEvent::WorkflowUpdated(wf.clone()));
                })
                .await;
        });
        Ok(id)
    }

    /// Fetch the latest block number and send it as an event.
    pub fn fetch_latest_block_number(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match client.latest_block().await {
                Ok(number) => {
                    let _ = tx.send(AppEvent::LatestBlockNumber(number));
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::Error(format!("Failed to get block number: {e}")));
                }
            }
        });
    }

    /// Write the last loaded history to a file in the working directory.
    pub fn export_history(&self, format: ExportFormat) {
        let history = Arc::clone(&self.history);
        let tx = self.event_tx.clone();

        tokio::task::spawn_blocking(move || {
            let Some(outcome) = history.last() else {
                let _ = tx.send(AppEvent::Error("No history loaded to export".to_string()));
                return;
            };
            let entries = outcome.entries();
            let result = match format {
                ExportFormat::Csv => export::export_history_csv(entries, &export::default_path("csv")),
                ExportFormat::Json => {
                    export::export_history_json(entries, &export::default_path("json"))
                }
            };
            let event = match result {
                Ok(msg) => AppEvent::ExportComplete(msg),
                Err(e) => AppEvent::Error(e),
            };
            let _ = tx.send(event);
        });
    }
}
