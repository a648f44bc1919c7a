//! Prometheus metrics for the order relay.
//!
//! Covers:
//! - Order submissions by outcome
//! - Expiry sweeps
//! - Settlement-event reconciliation per chain
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, a programming error that should crash at
//! startup. These panics only occur during static initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_gauge_vec, Counter, CounterVec, Encoder,
    GaugeVec, TextEncoder,
};

use crate::error::TelemetryResult;

/// Order submissions.
/// Labels: result (accepted/rejected/duplicate)
pub static ORDERS_SUBMITTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "relay_orders_submitted_total",
        "Order submissions by outcome",
        &["result"]
    )
    .unwrap()
});

/// Orders deleted by the expiry sweeper.
pub static ORDERS_SWEPT_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "relay_orders_swept_total",
        "Expired orders removed by the sweeper"
    )
    .unwrap()
});

/// Failed sweep runs.
pub static SWEEP_FAILURES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!("relay_sweep_failures_total", "Failed expiry sweep runs").unwrap()
});

/// Settlement events applied to the book.
/// Labels: chain, kind (fill/cancel)
pub static SETTLEMENT_EVENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "relay_settlement_events_total",
        "Settlement events applied to the order book",
        &["chain", "kind"]
    )
    .unwrap()
});

/// Log entries dropped because the node flagged them as removed (reorg).
pub static REMOVED_LOGS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "relay_removed_logs_total",
        "Log entries skipped because they were removed by a reorg",
        &["chain"]
    )
    .unwrap()
});

/// Event filters installed on the node.
pub static FILTERS_CREATED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "relay_filters_created_total",
        "Event filters created (initial and after filter loss)",
        &["chain"]
    )
    .unwrap()
});

/// Event-source call failures.
/// Labels: chain, op (latest_block/new_filter/filter_changes/apply)
pub static CHAIN_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "relay_chain_errors_total",
        "Event source and apply failures",
        &["chain", "op"]
    )
    .unwrap()
});

/// Reconciler state machine current state.
/// Labels: chain, state (uninitialized/active/degraded)
pub static RECONCILER_STATE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "relay_reconciler_state",
        "Reconciler state (1=active, 0=inactive)",
        &["chain", "state"]
    )
    .unwrap()
});

/// Highest block seen in a filter batch.
pub static LAST_SEEN_BLOCK: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "relay_last_seen_block",
        "Highest block number seen by the reconciler",
        &["chain"]
    )
    .unwrap()
});

/// Metrics helper for recording common patterns.
pub struct Metrics;

impl Metrics {
    pub fn order_accepted() {
        ORDERS_SUBMITTED_TOTAL.with_label_values(&["accepted"]).inc();
    }

    pub fn order_rejected() {
        ORDERS_SUBMITTED_TOTAL.with_label_values(&["rejected"]).inc();
    }

    pub fn order_duplicate() {
        ORDERS_SUBMITTED_TOTAL.with_label_values(&["duplicate"]).inc();
    }

    pub fn orders_swept(count: u64) {
        ORDERS_SWEPT_TOTAL.inc_by(count as f64);
    }

    pub fn sweep_failed() {
        SWEEP_FAILURES_TOTAL.inc();
    }

    pub fn settlement_event(chain: &str, kind: &str) {
        SETTLEMENT_EVENTS_TOTAL
            .with_label_values(&[chain, kind])
            .inc();
    }

    pub fn removed_log_skipped(chain: &str) {
        REMOVED_LOGS_TOTAL.with_label_values(&[chain]).inc();
    }

    pub fn filter_created(chain: &str) {
        FILTERS_CREATED_TOTAL.with_label_values(&[chain]).inc();
    }

    pub fn chain_error(chain: &str, op: &str) {
        CHAIN_ERRORS_TOTAL.with_label_values(&[chain, op]).inc();
    }

    /// Set the reconciler state for `chain`.
    /// Only the active state is 1, all others are 0.
    pub fn reconciler_state_set(chain: &str, state: &str) {
        for s in &["uninitialized", "active", "degraded"] {
            RECONCILER_STATE.with_label_values(&[chain, s]).set(0.0);
        }
        RECONCILER_STATE.with_label_values(&[chain, state]).set(1.0);
    }

    pub fn last_seen_block(chain: &str, block: u64) {
        LAST_SEEN_BLOCK.with_label_values(&[chain]).set(block as f64);
    }
}

/// Render every registered metric in the Prometheus text format.
pub fn encode_text() -> TelemetryResult<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
