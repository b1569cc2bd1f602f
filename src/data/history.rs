use std::collections::{BTreeSet, HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use futures::future::join_all;
use lru::LruCache;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::data::error::ChainError;
use crate::data::lock;
use crate::data::poller::RefreshGate;
use crate::data::provider::{ChainClient, TransferFilter};
use crate::data::types::{Direction, RawTransfer, TransferEvent};
use crate::events::AppEvent;

pub const DEFAULT_WINDOW: usize = 10;

/// Block timestamps never change, so this only bounds memory.
const TIMESTAMP_CACHE_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    NoResults,
    /// The most recent `entries` out of `total` merged transfers.
    Transfers {
        entries: Vec<TransferEvent>,
        total: usize,
    },
}

impl HistoryOutcome {
    pub fn entries(&self) -> &[TransferEvent] {
        match self {
            HistoryOutcome::NoResults => &[],
            HistoryOutcome::Transfers { entries, .. } => entries,
        }
    }
}

/// Merge sent and received logs into one list, newest first.
///
/// Entries are unique per `(tx_hash, direction)`, so a transfer to oneself
/// shows up once as sent and once as received.
pub fn merge_transfers(sent: Vec<RawTransfer>, received: Vec<RawTransfer>) -> Vec<TransferEvent> {
    let mut seen = HashSet::new();
    let mut merged: Vec<TransferEvent> = sent
        .into_iter()
        .map(|raw| (raw, Direction::Sent))
        .chain(received.into_iter().map(|raw| (raw, Direction::Received)))
        .filter(|(raw, direction)| seen.insert((raw.tx_hash, *direction)))
        .map(|(raw, direction)| TransferEvent::from_raw(raw, direction))
        .collect();

    merged.sort_by(|a, b| {
        b.block_number
            .cmp(&a.block_number)
            .then(b.log_index.cmp(&a.log_index))
    });
    merged
}

/// Builds an account's transfer history from `Transfer` logs.
pub struct HistoryAggregator {
    client: Arc<dyn ChainClient>,
    token: Address,
    window: usize,
    timestamps: Mutex<LruCache<u64, u64>>,
}

impl HistoryAggregator {
    pub fn new(client: Arc<dyn ChainClient>, token: Address, window: usize) -> Self {
        let capacity = NonZeroUsize::new(TIMESTAMP_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            client,
            token,
            window,
            timestamps: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn load(&self, account: Address) -> Result<HistoryOutcome, ChainError> {
        let (sent, received) = tokio::try_join!(
            self.client
                .transfer_logs(self.token, TransferFilter::From(account)),
            self.client.transfer_logs(self.token, TransferFilter::To(account)),
        )?;
        debug!(%account, sent = sent.len(), received = received.len(), "transfer logs fetched");

        let merged = merge_transfers(sent, received);
        if merged.is_empty() {
            return Ok(HistoryOutcome::NoResults);
        }

        let total = merged.len();
        let mut entries: Vec<TransferEvent> = merged.into_iter().take(self.window).collect();
        self.enrich(&mut entries).await;
        Ok(HistoryOutcome::Transfers { entries, total })
    }

    /// Fill in block timestamps. A failed lookup leaves that entry without one.
    async fn enrich(&self, entries: &mut [TransferEvent]) {
        let blocks: BTreeSet<u64> = entries.iter().map(|e| e.block_number).collect();

        let mut known: HashMap<u64, u64> = HashMap::new();
        let mut missing = Vec::new();
        {
            let mut cache = lock(&self.timestamps);
            for block in blocks {
                match cache.get(&block) {
                    Some(ts) => {
                        known.insert(block, *ts);
                    }
                    None => missing.push(block),
                }
            }
        }

        let fetched = join_all(missing.iter().map(|&block| async move {
            (block, self.client.block_timestamp(block).await)
        }))
        .await;

        {
            let mut cache = lock(&self.timestamps);
            for (block, result) in fetched {
                match result {
                    Ok(ts) => {
                        cache.put(block, ts);
                        known.insert(block, ts);
                    }
                    Err(e) => warn!(block, error = %e, "block timestamp lookup failed"),
                }
            }
        }

        for entry in entries.iter_mut() {
            entry.timestamp = known.get(&entry.block_number).copied();
        }
    }
}

/// Reloads the account's history on demand and on invalidation, one load at a time.
pub struct HistoryService {
    aggregator: HistoryAggregator,
    account: Option<Address>,
    gate: Mutex<RefreshGate>,
    last: Mutex<Option<HistoryOutcome>>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl HistoryService {
    pub fn new(
        aggregator: HistoryAggregator,
        account: Option<Address>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            aggregator,
            account,
            gate: Mutex::new(RefreshGate::default()),
            last: Mutex::new(None),
            event_tx,
        }
    }

    pub fn trigger(self: &Arc<Self>) {
        if !lock(&self.gate).request() {
            debug!("history reload queued");
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

    /// Load once. Does nothing without an account.
    pub async fn run_once(&self) {
        let Some(account) = self.account else {
            debug!("no account, skipping history");
            return;
        };

        match self.aggregator.load(account).await {
            Ok(outcome) => {
                if let HistoryOutcome::Transfers { entries, total } = &outcome {
                    info!(%account, shown = entries.len(), total, "history loaded");
                }
                *lock(&self.last) = Some(outcome.clone());
                let _ = self.event_tx.send(AppEvent::HistoryLoaded(outcome));
            }
            Err(e) => {
                warn!(%account, error = %e, "history load failed");
                let _ = self.event_tx.send(AppEvent::HistoryFailed(e.to_string()));
            }
        }
    }

    /// The most recent successful load.
    pub fn last(&self) -> Option<HistoryOutcome> {
        lock(&self.last).clone()
    }

    pub fn is_idle(&self) -> bool {
        !lock(&self.gate).is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use alloy::primitives::{B256, U256};

    use crate::data::mock::MockChain;

    const ACCOUNT: Address = Address::repeat_byte(0xaa);
    const OTHER: Address = Address::repeat_byte(0xbb);
    const TOKEN: Address = Address::repeat_byte(0x70);

    fn raw(hash: u8, block: u64, log_index: u64, from: Address, to: Address) -> RawTransfer {
        RawTransfer {
            tx_hash: B256::repeat_byte(hash),
            log_index,
            block_number: block,
            from,
            to,
            value: U256::from(1u64),
        }
    }

    #[test]
    fn test_merge_sorts_newest_first() {
        let sent = vec![raw(1, 5, 0, ACCOUNT, OTHER), raw(2, 20, 0, ACCOUNT, OTHER)];
        let received = vec![raw(3, 3, 0, OTHER, ACCOUNT)];

        let merged = merge_transfers(sent, received);
        let blocks: Vec<u64> = merged.iter().map(|e| e.block_number).collect();
        assert_eq!(blocks, vec![20, 5, 3]);
        assert_eq!(merged[2].direction, Direction::Received);
    }

    #[test]
    fn test_merge_breaks_ties_by_log_index() {
        let sent = vec![raw(1, 7, 1, ACCOUNT, OTHER), raw(2, 7, 4, ACCOUNT, OTHER)];
        let merged = merge_transfers(sent, vec![]);
        assert_eq!(merged[0].log_index, 4);
        assert_eq!(merged[1].log_index, 1);
    }

    #[test]
    fn test_self_transfer_appears_in_both_directions() {
        let log = raw(9, 12, 0, ACCOUNT, ACCOUNT);
        let merged = merge_transfers(vec![log.clone()], vec![log]);

        assert_eq!(merged.len(), 2);
        let directions: HashSet<Direction> = merged.iter().map(|e| e.direction).collect();
        assert!(directions.contains(&Direction::Sent));
        assert!(directions.contains(&Direction::Received));
    }

    #[test]
    fn test_duplicate_in_same_direction_is_dropped() {
        let log = raw(9, 12, 0, ACCOUNT, OTHER);
        let merged = merge_transfers(vec![log.clone(), log], vec![]);
        assert_eq!(merged.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_history() {
        let chain = Arc::new(MockChain::new());
        let aggregator = HistoryAggregator::new(chain, TOKEN, DEFAULT_WINDOW);
        let outcome = aggregator.load(ACCOUNT).await.unwrap();
        assert_eq!(outcome, HistoryOutcome::NoResults);
        assert!(outcome.entries().is_empty());
    }

    #[tokio::test]
    async fn test_one_failed_timestamp_of_ten() {
        let chain = Arc::new(MockChain::new());
        for block in 1..=10u64 {
            chain.push_log(raw(block as u8, block, 0, ACCOUNT, OTHER));
        }
        chain.fail_timestamp(4);
        let aggregator = HistoryAggregator::new(chain, TOKEN, DEFAULT_WINDOW);

        let outcome = aggregator.load(ACCOUNT).await.unwrap();
        let entries = outcome.entries();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries.iter().filter(|e| e.timestamp.is_some()).count(), 9);
        let failed = entries.iter().find(|e| e.timestamp.is_none()).unwrap();
        assert_eq!(failed.block_number, 4);
    }

    #[tokio::test]
    async fn test_window_bounds_entries() {
        let chain = Arc::new(MockChain::new());
        for block in 1..=15u64 {
            chain.push_log(raw(block as u8, block, 0, OTHER, ACCOUNT));
        }
        let aggregator = HistoryAggregator::new(chain.clone(), TOKEN, 10);

        match aggregator.load(ACCOUNT).await.unwrap() {
            HistoryOutcome::Transfers { entries, total } => {
                assert_eq!(total, 15);
                assert_eq!(entries.len(), 10);
                assert_eq!(entries[0].block_number, 15);
                assert_eq!(entries[9].block_number, 6);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(chain.timestamp_calls(), 10);
    }

    #[tokio::test]
    async fn test_timestamps_are_cached() {
        let chain = Arc::new(MockChain::new());
        chain.push_log(raw(1, 8, 0, ACCOUNT, OTHER));
        chain.set_timestamp(8, 1_700_000_123);
        let aggregator = HistoryAggregator::new(chain.clone(), TOKEN, DEFAULT_WINDOW);

        aggregator.load(ACCOUNT).await.unwrap();
        let outcome = aggregator.load(ACCOUNT).await.unwrap();

        assert_eq!(chain.timestamp_calls(), 1);
        assert_eq!(outcome.entries()[0].timestamp, Some(1_700_000_123));
    }

    #[tokio::test]
    async fn test_log_failure_is_an_error() {
        let chain = Arc::new(MockChain::new());
        chain.fail_logs(ChainError::Rpc("range too large".to_string()));
        let aggregator = HistoryAggregator::new(chain, TOKEN, DEFAULT_WINDOW);
        assert!(aggregator.load(ACCOUNT).await.is_err());
    }

    #[tokio::test]
    async fn test_service_emits_loaded_event() {
        let chain = Arc::new(MockChain::new());
        chain.push_log(raw(1, 8, 0, OTHER, ACCOUNT));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = Arc::new(HistoryService::new(
            HistoryAggregator::new(chain, TOKEN, DEFAULT_WINDOW),
            Some(ACCOUNT),
            tx,
        ));

        service.trigger();
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        match event {
            Some(AppEvent::HistoryLoaded(outcome)) => assert_eq!(outcome.entries().len(), 1),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(service.last().is_some());
    }

    #[tokio::test]
    async fn test_service_skips_without_account() {
        let chain = Arc::new(MockChain::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let service = HistoryService::new(
            HistoryAggregator::new(chain.clone(), TOKEN, DEFAULT_WINDOW),
            None,
            tx,
        );
        service.run_once().await;
        assert_eq!(chain.log_calls(), 0);
        assert!(service.last().is_none());
    }
}
