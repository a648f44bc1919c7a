//! Per-chain event reconciler.
//!
//! State machine:
//! - `Uninitialized`: install a filter on the settlement contract starting
//!   `lookback_blocks` behind the head and replay its logs. Retries with
//!   backoff until it succeeds or shutdown is requested.
//! - `Active`: every poll interval, fetch filter changes and apply them.
//! - `Degraded`: a fetch or apply failed. The filter id is abandoned and a
//!   fresh one is created immediately. Events older than the look-back
//!   window at that point are not replayed; the last block seen is kept
//!   across filters so such a gap is logged.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use relay_book::OrderBook;
use relay_telemetry::Metrics;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backoff::BackoffPolicy;
use crate::config::ChainConfig;
use crate::error::{ChainSyncError, ChainSyncResult};
use crate::events::SettlementEvent;
use crate::source::{FilterId, FilterSpec, LogSource, RawLog};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReconcilerState {
    Uninitialized,
    Active(FilterId),
    Degraded,
}

impl ReconcilerState {
    fn label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Active(_) => "active",
            Self::Degraded => "degraded",
        }
    }
}

/// Keeps the order book in line with one chain's settlement events.
pub struct EventReconciler {
    config: ChainConfig,
    source: Arc<dyn LogSource>,
    book: OrderBook,
    backoff: BackoffPolicy,
    shutdown_token: CancellationToken,
}

impl EventReconciler {
    pub fn new(
        config: ChainConfig,
        source: Arc<dyn LogSource>,
        book: OrderBook,
        shutdown_token: CancellationToken,
    ) -> Self {
        let backoff = BackoffPolicy::new(config.backoff.clone());
        Self {
            config,
            source,
            book,
            backoff,
            shutdown_token,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    fn chain(&self) -> &str {
        &self.config.name
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.config.request_timeout_ms)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }

    fn enter(&self, state: &ReconcilerState) {
        Metrics::reconciler_state_set(self.chain(), state.label());
    }

    /// Run until the shutdown token is cancelled.
    pub async fn run(self) {
        info!(
            chain = %self.chain(),
            exchange = %self.config.exchange_address,
            "Event reconciler started"
        );

        let mut state = ReconcilerState::Uninitialized;
        let mut last_block: Option<u64> = None;
        self.enter(&state);

        loop {
            if self.shutdown_token.is_cancelled() {
                break;
            }

            state = match state {
                ReconcilerState::Uninitialized => {
                    match self.establish_with_retry(last_block).await {
                        Some((filter_id, seen)) => {
                            last_block = seen.max(last_block);
                            ReconcilerState::Active(filter_id)
                        }
                        None => break,
                    }
                }
                ReconcilerState::Active(filter_id) => {
                    tokio::select! {
                        () = tokio::time::sleep(self.poll_interval()) => {}
                        () = self.shutdown_token.cancelled() => break,
                    }

                    match self.poll(&filter_id).await {
                        Ok(seen) => {
                            last_block = seen.max(last_block);
                            ReconcilerState::Active(filter_id)
                        }
                        Err(e) => {
                            warn!(
                                chain = %self.chain(),
                                %filter_id,
                                error = %e,
                                "Filter poll failed, abandoning filter"
                            );
                            ReconcilerState::Degraded
                        }
                    }
                }
                ReconcilerState::Degraded => ReconcilerState::Uninitialized,
            };
            self.enter(&state);
        }

        info!(chain = %self.chain(), "Shutdown requested, stopping event reconciler");
    }

    /// Install a filter, retrying with backoff. `None` on shutdown.
    async fn establish_with_retry(
        &self,
        last_block: Option<u64>,
    ) -> Option<(FilterId, Option<u64>)> {
        let mut attempt = 0u32;
        loop {
            match self.establish(last_block).await {
                Ok(established) => return Some(established),
                Err(e) => {
                    attempt += 1;
                    let delay = self.backoff.delay(attempt);
                    warn!(
                        chain = %self.chain(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Filter creation failed, retrying"
                    );

                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = self.shutdown_token.cancelled() => return None,
                    }
                }
            }
        }
    }

    async fn establish(
        &self,
        last_block: Option<u64>,
    ) -> ChainSyncResult<(FilterId, Option<u64>)> {
        let latest = self
            .timed("latest_block", self.source.latest_block())
            .await?;
        if let Some(gap) = uncovered_blocks(last_block, latest, self.config.lookback_blocks) {
            warn!(
                chain = %self.chain(),
                last_block = ?last_block,
                latest,
                lookback_blocks = self.config.lookback_blocks,
                gap,
                "Head moved past the look-back window, events may have been missed"
            );
        }
        let spec = FilterSpec {
            address: self.config.exchange_address,
            event_signatures: SettlementEvent::signatures(),
            from_block: latest.saturating_sub(self.config.lookback_blocks),
        };

        let filter_id = self
            .timed("new_filter", self.source.new_filter(&spec))
            .await?;
        Metrics::filter_created(self.chain());
        info!(
            chain = %self.chain(),
            %filter_id,
            from_block = spec.from_block,
            latest,
            "Event filter installed"
        );

        let backlog = self
            .timed("filter_logs", self.source.filter_logs(&filter_id))
            .await?;
        let seen = self.apply_batch(backlog).await?;
        Ok((filter_id, seen.max(Some(latest))))
    }

    async fn poll(&self, filter_id: &FilterId) -> ChainSyncResult<Option<u64>> {
        let logs = self
            .timed("filter_changes", self.source.filter_changes(filter_id))
            .await?;
        self.apply_batch(logs).await
    }

    /// Apply a batch concurrently. Returns the highest block seen.
    ///
    /// Fails if any entry could not be applied, so the caller recreates the
    /// filter and the window is replayed.
    async fn apply_batch(&self, logs: Vec<RawLog>) -> ChainSyncResult<Option<u64>> {
        let mut last_block = None;
        let mut events = Vec::with_capacity(logs.len());

        for log in &logs {
            if log.removed {
                Metrics::removed_log_skipped(self.chain());
                debug!(
                    chain = %self.chain(),
                    tx = ?log.transaction_hash,
                    "Skipping log removed by reorg"
                );
                continue;
            }
            last_block = last_block.max(log.block_number);

            match SettlementEvent::decode(log) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) => {
                    warn!(chain = %self.chain(), tx = ?log.transaction_hash, error = %e, "Undecodable log skipped");
                }
            }
        }

        if events.is_empty() {
            return Ok(last_block);
        }
        if let Some(block) = last_block {
            Metrics::last_seen_block(self.chain(), block);
        }

        let results = join_all(events.iter().map(|event| self.apply(*event))).await;
        let failures = results.iter().filter(|r| r.is_err()).count();
        if let Some(Err(e)) = results.into_iter().find(|r| r.is_err()) {
            Metrics::chain_error(self.chain(), "apply");
            error!(chain = %self.chain(), failures, error = %e, "Failed to apply settlement events");
            return Err(e);
        }

        debug!(chain = %self.chain(), applied = events.len(), "Settlement events applied");
        Ok(last_block)
    }

    async fn apply(&self, event: SettlementEvent) -> ChainSyncResult<()> {
        let known = match event {
            SettlementEvent::Fill { order_hash, filled } => {
                self.book.update_filled(order_hash, filled).await?
            }
            SettlementEvent::Cancel { order_hash } => self.book.remove(order_hash).await?,
        };

        Metrics::settlement_event(self.chain(), event.kind());
        debug!(
            chain = %self.chain(),
            kind = event.kind(),
            order_hash = %event.order_hash(),
            known,
            "Settlement event applied"
        );
        Ok(())
    }

    async fn timed<T, F>(&self, op: &'static str, fut: F) -> ChainSyncResult<T>
    where
        F: std::future::Future<Output = ChainSyncResult<T>>,
    {
        let timeout = self.request_timeout();
        let result = match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ChainSyncError::Timeout {
                op,
                after_ms: timeout.as_millis() as u64,
            }),
        };
        if result.is_err() {
            Metrics::chain_error(self.chain(), op);
        }
        result
    }
}

/// Blocks after `last_block` that a filter starting `lookback` behind
/// `latest` will not replay.
fn uncovered_blocks(last_block: Option<u64>, latest: u64, lookback: u64) -> Option<u64> {
    let from_block = latest.saturating_sub(lookback);
    let next = last_block?.saturating_add(1);
    (from_block > next).then(|| from_block - next)
}
