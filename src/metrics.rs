// src/metrics.rs
// Prometheus recorder plus the catalog of series this service emits.

use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// Register descriptions for every series the pipeline emits, once.
pub fn describe() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("poll_cycles_total", "Completed poll cycles.");
        describe_counter!(
            "transactions_seen_total",
            "Canonical transactions produced by the normalizer."
        );
        describe_counter!(
            "transactions_new_total",
            "Transactions that passed the dedup ledger."
        );
        describe_counter!("cards_rendered_total", "Cards rendered and persisted.");
        describe_counter!("render_errors_total", "Per-transaction render failures.");
        describe_counter!("delivery_errors_total", "Alert delivery failures.");
        describe_counter!(
            "ledger_save_errors_total",
            "Failed dedup-ledger flushes (retried next cycle)."
        );
        describe_counter!("feed_errors_total", "Feed fetch failures (cycle abandoned).");
        describe_gauge!("dedup_ledger_keys", "Keys currently held by the dedup ledger.");
        describe_gauge!("pipeline_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder. Call once, before the pipeline
    /// emits its first counter.
    pub fn init() -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");
        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
