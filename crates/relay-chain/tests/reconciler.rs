//! Reconciler behaviour against a scripted log source, under paused time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use parking_lot::Mutex;
use relay_book::{MemoryOrderStore, OrderBook, OrderStore, QueryLimits};
use relay_chain::events::abi;
use relay_chain::{
    BackoffConfig, BackoffPolicy, ChainConfig, ChainSyncError, ChainSyncResult, EventReconciler,
    FilterId, FilterSpec, LogSource, RawLog,
};
use relay_core::{
    BookError, BookResult, ManualClock, MarketInfo, Order, OrderHash, SignedOrder, StoredOrder,
    TokenInfo,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const NOW: u64 = 1_700_000_000;

#[derive(Default)]
struct Script {
    latest_block: VecDeque<ChainSyncResult<u64>>,
    filter_logs: VecDeque<ChainSyncResult<Vec<RawLog>>>,
    filter_changes: VecDeque<ChainSyncResult<Vec<RawLog>>>,
    /// Upcoming `latest_block` calls that never answer.
    hang_latest_block: usize,
    /// Upcoming `filter_changes` calls that never answer.
    hang_changes: usize,
}

#[derive(Default)]
struct Calls {
    latest_block: Vec<Instant>,
    filters: Vec<(Instant, FilterSpec)>,
    changes: Vec<(Instant, FilterId)>,
}

/// Plays back scripted responses; once a script runs dry it answers with a
/// healthy empty chain at block 5000.
#[derive(Default)]
struct ScriptedSource {
    script: Mutex<Script>,
    calls: Mutex<Calls>,
}

#[async_trait]
impl LogSource for ScriptedSource {
    async fn latest_block(&self) -> ChainSyncResult<u64> {
        self.calls.lock().latest_block.push(Instant::now());
        let reply = {
            let mut script = self.script.lock();
            if script.hang_latest_block > 0 {
                script.hang_latest_block -= 1;
                None
            } else {
                Some(script.latest_block.pop_front().unwrap_or(Ok(5_000)))
            }
        };
        match reply {
            Some(reply) => reply,
            None => std::future::pending().await,
        }
    }

    async fn new_filter(&self, spec: &FilterSpec) -> ChainSyncResult<FilterId> {
        let mut calls = self.calls.lock();
        calls.filters.push((Instant::now(), spec.clone()));
        Ok(format!("0x{:x}", calls.filters.len()))
    }

    async fn filter_logs(&self, _id: &FilterId) -> ChainSyncResult<Vec<RawLog>> {
        self.script
            .lock()
            .filter_logs
            .pop_front()
            .unwrap_or(Ok(Vec::new()))
    }

    async fn filter_changes(&self, id: &FilterId) -> ChainSyncResult<Vec<RawLog>> {
        self.calls.lock().changes.push((Instant::now(), id.clone()));
        let reply = {
            let mut script = self.script.lock();
            if script.hang_changes > 0 {
                script.hang_changes -= 1;
                None
            } else {
                Some(script.filter_changes.pop_front().unwrap_or(Ok(Vec::new())))
            }
        };
        match reply {
            Some(reply) => reply,
            None => std::future::pending().await,
        }
    }
}

/// Memory store whose next `fails` fill updates return a storage error.
struct FlakyStore {
    inner: MemoryOrderStore,
    fails: AtomicUsize,
}

#[async_trait]
impl OrderStore for FlakyStore {
    async fn insert(&self, order: SignedOrder) -> BookResult<()> {
        self.inner.insert(order).await
    }

    async fn query_by_side(
        &self,
        buy_tokens: &[Address],
        sell_tokens: &[Address],
        min_expires: u64,
        max_expires: Option<u64>,
    ) -> BookResult<Vec<StoredOrder>> {
        self.inner
            .query_by_side(buy_tokens, sell_tokens, min_expires, max_expires)
            .await
    }

    async fn query_by_user(
        &self,
        user: Address,
        min_expires: u64,
    ) -> BookResult<Vec<StoredOrder>> {
        self.inner.query_by_user(user, min_expires).await
    }

    async fn update_filled(&self, hash: OrderHash, filled_absolute: U256) -> BookResult<bool> {
        let failing = self
            .fails
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BookError::Storage("connection reset".to_string()));
        }
        self.inner.update_filled(hash, filled_absolute).await
    }

    async fn remove(&self, hash: OrderHash) -> BookResult<bool> {
        self.inner.remove(hash).await
    }

    async fn sweep_expired(&self, now: u64) -> BookResult<u64> {
        self.inner.sweep_expired(now).await
    }

    async fn upsert_token(&self, token: TokenInfo) -> BookResult<()> {
        self.inner.upsert_token(token).await
    }

    async fn tokens(&self) -> BookResult<Vec<TokenInfo>> {
        self.inner.tokens().await
    }

    async fn markets(&self, now: u64) -> BookResult<Vec<MarketInfo>> {
        self.inner.markets(now).await
    }
}

fn exchange() -> Address {
    Address::repeat_byte(0xee)
}

fn chain_config() -> ChainConfig {
    ChainConfig::new("testnet", "http://localhost:8545", exchange())
}

fn fill_log(hash: B256, filled: u64, block: u64) -> RawLog {
    let mut data = U256::from(filled).to_be_bytes::<32>().to_vec();
    data.extend_from_slice(&U256::ZERO.to_be_bytes::<32>());
    RawLog {
        address: exchange(),
        topics: vec![abi::OrderStatus::SIGNATURE_HASH, hash],
        data: Bytes::from(data),
        block_number: Some(block),
        transaction_hash: Some(B256::repeat_byte(block as u8)),
        log_index: Some(0),
        removed: false,
    }
}

fn cancel_log(hash: B256, block: u64) -> RawLog {
    RawLog {
        address: exchange(),
        topics: vec![abi::CancelOrder::SIGNATURE_HASH, hash],
        data: Bytes::new(),
        block_number: Some(block),
        transaction_hash: Some(B256::repeat_byte(block as u8)),
        log_index: Some(1),
        removed: false,
    }
}

fn signed(hash: u8) -> SignedOrder {
    SignedOrder {
        hash: B256::repeat_byte(hash),
        order: Order {
            user: Address::repeat_byte(0x99),
            buy_token: Address::repeat_byte(0xa),
            sell_token: Address::repeat_byte(0xb),
            buy_amount: U256::from(10u64),
            sell_amount: U256::from(100u64),
            expiration_time_seconds: NOW + 3_600,
        },
        signature: "0x00".to_string(),
    }
}

fn spawn_reconciler(
    source: Arc<ScriptedSource>,
    store: Arc<dyn OrderStore>,
) -> (CancellationToken, tokio::task::JoinHandle<()>) {
    let book = OrderBook::new(store, Arc::new(ManualClock::new(NOW)), QueryLimits::default());

    let token = CancellationToken::new();
    let reconciler = EventReconciler::new(chain_config(), source, book, token.clone())
        .with_backoff(BackoffPolicy::without_jitter(BackoffConfig::default()));
    let handle = tokio::spawn(reconciler.run());
    (token, handle)
}

async fn setup(
    source: Arc<ScriptedSource>,
    hashes: &[u8],
) -> (Arc<MemoryOrderStore>, CancellationToken, tokio::task::JoinHandle<()>) {
    let store = Arc::new(MemoryOrderStore::new());
    for h in hashes {
        store.insert(signed(*h)).await.unwrap();
    }
    let (token, handle) = spawn_reconciler(source, store.clone());
    (store, token, handle)
}

#[tokio::test(start_paused = true)]
async fn test_filter_targets_exchange_events_with_lookback() {
    let source = Arc::new(ScriptedSource::default());
    let (_store, token, handle) = setup(source.clone(), &[]).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    {
        let calls = source.calls.lock();
        assert_eq!(calls.filters.len(), 1);
        let spec = &calls.filters[0].1;
        assert_eq!(spec.address, exchange());
        assert_eq!(spec.from_block, 4_000);
        assert_eq!(
            spec.event_signatures,
            vec![
                abi::OrderStatus::SIGNATURE_HASH,
                abi::CancelOrder::SIGNATURE_HASH
            ]
        );
    }

    token.cancel();
    tokio_test::assert_ok!(handle.await);
}

#[tokio::test(start_paused = true)]
async fn test_filter_creation_retries_with_backoff() {
    let source = Arc::new(ScriptedSource::default());
    {
        let mut script = source.script.lock();
        script
            .latest_block
            .push_back(Err(ChainSyncError::Transport("connection refused".into())));
        script
            .latest_block
            .push_back(Err(ChainSyncError::Transport("connection refused".into())));
    }
    let start = Instant::now();
    let (_store, token, handle) = setup(source.clone(), &[]).await;

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert!(source.calls.lock().filters.is_empty());

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    {
        let calls = source.calls.lock();
        assert_eq!(calls.latest_block.len(), 3);
        assert_eq!(calls.latest_block[1] - calls.latest_block[0], Duration::from_secs(1));
        assert_eq!(calls.latest_block[2] - calls.latest_block[1], Duration::from_secs(2));
        assert_eq!(calls.filters.len(), 1);
        assert_eq!(calls.filters[0].0 - start, Duration::from_secs(3));
    }

    token.cancel();
    tokio_test::assert_ok!(handle.await);
}

#[tokio::test(start_paused = true)]
async fn test_fill_and_cancel_applied_idempotently() {
    let source = Arc::new(ScriptedSource::default());
    let (a, b, c) = (B256::repeat_byte(1), B256::repeat_byte(2), B256::repeat_byte(3));
    {
        let mut removed_cancel = cancel_log(b, 12);
        removed_cancel.removed = true;

        let mut script = source.script.lock();
        script.filter_changes.push_back(Ok(vec![
            fill_log(a, 40, 10),
            fill_log(a, 40, 10),
            removed_cancel,
            cancel_log(c, 11),
        ]));
        script
            .filter_changes
            .push_back(Ok(vec![fill_log(a, 25, 13), cancel_log(c, 13)]));
    }
    let (store, token, handle) = setup(source.clone(), &[1, 2, 3]).await;

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(store.get(&a).unwrap().filled, U256::from(40u64));
    assert!(store.get(&b).is_some());
    assert!(store.get(&c).is_none());

    tokio::time::sleep(Duration::from_millis(5_000)).await;
    assert_eq!(store.get(&a).unwrap().filled, U256::from(40u64));
    assert_eq!(store.len(), 2);

    token.cancel();
    tokio_test::assert_ok!(handle.await);
}

#[tokio::test(start_paused = true)]
async fn test_backlog_replayed_on_filter_creation() {
    let source = Arc::new(ScriptedSource::default());
    source
        .script
        .lock()
        .filter_logs
        .push_back(Ok(vec![cancel_log(B256::repeat_byte(1), 4_500)]));
    let (store, token, handle) = setup(source.clone(), &[1, 2]).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(store.get(&B256::repeat_byte(1)).is_none());
    assert_eq!(store.len(), 1);

    token.cancel();
    tokio_test::assert_ok!(handle.await);
}

#[tokio::test(start_paused = true)]
async fn test_filter_loss_recreates_immediately() {
    let source = Arc::new(ScriptedSource::default());
    source
        .script
        .lock()
        .filter_changes
        .push_back(Err(ChainSyncError::Rpc {
            code: -32000,
            message: "filter not found".to_string(),
        }));
    let (_store, token, handle) = setup(source.clone(), &[]).await;

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    {
        let calls = source.calls.lock();
        assert_eq!(calls.filters.len(), 2);
        assert_eq!(calls.changes.len(), 1);
        assert_eq!(calls.changes[0].1, "0x1");
        assert_eq!(calls.filters[1].0, calls.changes[0].0);
    }

    tokio::time::sleep(Duration::from_millis(5_000)).await;
    {
        let calls = source.calls.lock();
        assert_eq!(calls.changes.len(), 2);
        assert_eq!(calls.changes[1].1, "0x2");
    }

    token.cancel();
    tokio_test::assert_ok!(handle.await);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_backoff() {
    let source = Arc::new(ScriptedSource::default());
    {
        let mut script = source.script.lock();
        for _ in 0..10 {
            script
                .latest_block
                .push_back(Err(ChainSyncError::Transport("down".into())));
        }
    }
    let (_store, token, handle) = setup(source.clone(), &[]).await;

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    let before = Instant::now();
    token.cancel();
    tokio_test::assert_ok!(handle.await);

    assert_eq!(Instant::now(), before);
    assert!(source.calls.lock().filters.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hung_calls_time_out_and_recover() {
    let source = Arc::new(ScriptedSource::default());
    {
        let mut script = source.script.lock();
        script.hang_latest_block = 1;
        script.hang_changes = 1;
    }
    let start = Instant::now();
    let (_store, token, handle) = setup(source.clone(), &[]).await;

    // 10s request timeout, then 1s backoff before the second attempt.
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert!(source.calls.lock().filters.is_empty());

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    {
        let calls = source.calls.lock();
        assert_eq!(calls.latest_block.len(), 2);
        assert_eq!(calls.filters.len(), 1);
        assert_eq!(calls.filters[0].0 - start, Duration::from_secs(11));
    }

    // First poll at 16s hangs until 26s, then the filter is replaced at once.
    tokio::time::sleep(Duration::from_millis(15_000)).await;
    {
        let calls = source.calls.lock();
        assert_eq!(calls.changes.len(), 1);
        assert_eq!(calls.changes[0].0 - start, Duration::from_secs(16));
        assert_eq!(calls.filters.len(), 2);
        assert_eq!(calls.filters[1].0 - start, Duration::from_secs(26));
    }

    tokio::time::sleep(Duration::from_millis(5_000)).await;
    {
        let calls = source.calls.lock();
        assert_eq!(calls.changes.len(), 2);
        assert_eq!(calls.changes[1].1, "0x2");
    }

    token.cancel();
    tokio_test::assert_ok!(handle.await);
}

#[tokio::test(start_paused = true)]
async fn test_apply_failure_replays_window_on_new_filter() {
    let hash = B256::repeat_byte(1);
    let source = Arc::new(ScriptedSource::default());
    {
        let mut script = source.script.lock();
        script.filter_logs.push_back(Ok(Vec::new()));
        script.filter_logs.push_back(Ok(vec![fill_log(hash, 30, 4_900)]));
        script.filter_changes.push_back(Ok(vec![fill_log(hash, 30, 4_900)]));
    }
    let store = Arc::new(FlakyStore {
        inner: MemoryOrderStore::new(),
        fails: AtomicUsize::new(1),
    });
    store.insert(signed(1)).await.unwrap();
    let start = Instant::now();
    let (token, handle) = spawn_reconciler(source.clone(), store.clone());

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    {
        let calls = source.calls.lock();
        assert_eq!(calls.changes.len(), 1);
        assert_eq!(calls.filters.len(), 2);
        assert_eq!(calls.filters[1].0 - start, Duration::from_secs(5));
    }
    assert_eq!(store.fails.load(Ordering::SeqCst), 0);
    assert_eq!(store.inner.get(&hash).unwrap().filled, U256::from(30u64));

    token.cancel();
    tokio_test::assert_ok!(handle.await);
}
