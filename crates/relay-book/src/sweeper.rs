//! Periodic expiry sweeper.

use std::time::Duration;

use relay_core::BookResult;
use relay_telemetry::Metrics;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::book::OrderBook;
use crate::config::SweeperConfig;

/// Deletes expired orders on a fixed interval.
///
/// A failed sweep is logged and retried on the next tick; the loop only
/// exits on cancellation.
pub struct ExpirySweeper {
    book: OrderBook,
    interval: Duration,
    shutdown_token: CancellationToken,
}

impl ExpirySweeper {
    pub fn new(book: OrderBook, config: &SweeperConfig, shutdown_token: CancellationToken) -> Self {
        Self {
            book,
            interval: Duration::from_millis(config.interval_ms),
            shutdown_token,
        }
    }

    pub async fn sweep_once(&self) -> BookResult<u64> {
        let now = self.book.now();
        let removed = self.book.sweep_expired(now).await?;
        if removed > 0 {
            Metrics::orders_swept(removed);
            info!(removed, now, "Swept expired orders");
        }
        Ok(removed)
    }

    pub async fn run(self) {
        info!(interval_ms = self.interval.as_millis() as u64, "Expiry sweeper started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested, stopping expiry sweeper");
                    return;
                }
            }

            if let Err(e) = self.sweep_once().await {
                Metrics::sweep_failed();
                warn!(error = %e, "Expiry sweep failed");
            } else {
                debug!("Expiry sweep complete");
            }
        }
    }
}
