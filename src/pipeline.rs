// src/pipeline.rs
// Pipeline coordinator: poll -> normalize -> dedup -> render -> deliver on a
// fixed cadence. All state is owned here and passed down explicitly; cycles
// never overlap, and per-transaction failures never abort a cycle.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Context;
use metrics::{counter, gauge};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::card::CardRenderer;
use crate::error::FeedError;
use crate::feed::{normalize_activities, ActivityFeed, Transaction};
use crate::ledger::{dedup_key, SeenLedger};
use crate::notify::{AlertPayload, AlertSink};

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOutcome {
    pub fetched: usize,
    pub normalized: usize,
    pub newly_seen: usize,
}

pub struct Pipeline {
    feed: Box<dyn ActivityFeed>,
    renderer: Box<dyn CardRenderer>,
    sink: Box<dyn AlertSink>,
    ledger: SeenLedger,
    cards_dir: PathBuf,
    latest_path: PathBuf,
    public_base_url: Option<String>,
    activity_window: usize,
    /// Most recent batch of newly seen transactions, shared with the API.
    last_new: Arc<RwLock<Vec<Transaction>>>,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        feed: Box<dyn ActivityFeed>,
        renderer: Box<dyn CardRenderer>,
        sink: Box<dyn AlertSink>,
        ledger: SeenLedger,
        cards_dir: impl Into<PathBuf>,
        latest_path: impl Into<PathBuf>,
        public_base_url: Option<String>,
        last_new: Arc<RwLock<Vec<Transaction>>>,
    ) -> Self {
        let cards_dir = cards_dir.into();
        if let Err(e) = std::fs::create_dir_all(&cards_dir) {
            tracing::warn!(error = %e, dir = %cards_dir.display(), "could not create cards dir");
        }
        Self {
            feed,
            renderer,
            sink,
            ledger,
            cards_dir,
            latest_path: latest_path.into(),
            public_base_url,
            activity_window: 50,
            last_new,
        }
    }

    pub fn with_activity_window(mut self, size: usize) -> Self {
        self.activity_window = size;
        self
    }

    pub fn ledger(&self) -> &SeenLedger {
        &self.ledger
    }

    /// Run one full cycle. With `deliver == false` the cycle only seeds the
    /// ledger (startup warm-up, so old feed history never triggers alerts);
    /// no cards are rendered for seeded history.
    /// Returns a feed error only; per-transaction errors are contained.
    pub async fn run_cycle(&self, deliver: bool) -> Result<CycleOutcome, FeedError> {
        crate::metrics::describe();

        let activities = match self.feed.recent_activity(self.activity_window).await {
            Ok(a) => a,
            Err(e) => {
                counter!("feed_errors_total").increment(1);
                return Err(e);
            }
        };
        let transactions = normalize_activities(&activities);
        counter!("transactions_seen_total").increment(transactions.len() as u64);

        let mut outcome = CycleOutcome {
            fetched: activities.len(),
            normalized: transactions.len(),
            newly_seen: 0,
        };

        // Keys are recorded only after a successful render, so a cycle-local
        // claim set keeps a repeated event in one window from rendering twice.
        let mut claimed: HashSet<String> = HashSet::new();
        let mut batch_new: Vec<Transaction> = Vec::new();

        for tx in &transactions {
            let key = dedup_key(tx);
            if self.ledger.seen(&key) || !claimed.insert(key.clone()) {
                continue;
            }
            // Warm-up: record the key and move on. Rendering history nobody
            // will be alerted about would cost one asset fetch per event.
            if !deliver {
                self.ledger.mark_seen(&key);
                outcome.newly_seen += 1;
                continue;
            }
            tracing::info!(
                kind = ?tx.kind,
                team = %tx.team_name,
                subject = %tx.subject_name,
                "new transaction"
            );
            match self.process_one(tx, &key).await {
                Ok(()) => {
                    outcome.newly_seen += 1;
                    batch_new.push(tx.clone());
                }
                Err(e) => {
                    counter!("render_errors_total").increment(1);
                    tracing::warn!(
                        kind = ?tx.kind,
                        team = %tx.team_name,
                        subject = %tx.subject_name,
                        error = ?e,
                        "transaction skipped; will retry if the feed re-delivers it"
                    );
                }
            }
        }

        if outcome.newly_seen > 0 {
            counter!("transactions_new_total").increment(outcome.newly_seen as u64);
        }
        if !batch_new.is_empty() {
            *self.last_new.write().expect("last_new rwlock poisoned") = batch_new;
        }

        // Unconditional flush: a save that failed last cycle left the ledger
        // dirty, and quiet cycles must not let that window grow. No-op when
        // nothing changed.
        if let Err(e) = self.ledger.save() {
            counter!("ledger_save_errors_total").increment(1);
            tracing::error!(error = %e, path = %self.ledger.path().display(), "ledger save failed");
        }

        counter!("poll_cycles_total").increment(1);
        gauge!("dedup_ledger_keys").set(self.ledger.len() as f64);
        gauge!("pipeline_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
        Ok(outcome)
    }

    /// Render, persist, mark seen, deliver one transaction. A render or
    /// persist failure leaves the ledger untouched; a delivery failure
    /// does not roll the mark back.
    async fn process_one(&self, tx: &Transaction, key: &str) -> anyhow::Result<()> {
        let card = self.renderer.render(tx).await?;

        let card_path = self.cards_dir.join(format!("{}.png", card.id));
        card.image
            .save(&card_path)
            .with_context(|| format!("writing {}", card_path.display()))?;
        // Best-effort alias; readers of "latest" get no consistency promise.
        if let Err(e) = std::fs::copy(&card_path, &self.latest_path) {
            tracing::warn!(error = %e, "latest-card alias update failed");
        }
        counter!("cards_rendered_total").increment(1);

        self.ledger.mark_seen(key);

        let card_url = self.public_base_url.as_ref().map(|base| {
            format!(
                "{}/cards/{}.png?ts={}",
                base.trim_end_matches('/'),
                card.id,
                chrono::Utc::now().timestamp()
            )
        });
        let payload = AlertPayload::for_transaction(tx, card_url);
        if let Err(e) = self.sink.deliver(&payload).await {
            counter!("delivery_errors_total").increment(1);
            tracing::warn!(
                kind = ?tx.kind,
                team = %tx.team_name,
                subject = %tx.subject_name,
                error = %e,
                "alert delivery failed; not retried"
            );
        }
        Ok(())
    }

    /// Spawn the periodic loop: warm-up cycle first (delivery suppressed),
    /// then one delivering cycle per interval. A new cycle never starts
    /// before the previous one completes, and shutdown waits for the
    /// in-flight cycle so the ledger is never cut mid-flush.
    pub fn spawn(self, interval: Duration) -> PipelineHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            match self.run_cycle(false).await {
                Ok(outcome) => tracing::info!(
                    seeded = outcome.newly_seen,
                    ledger = self.ledger.len(),
                    "warm-up cycle done"
                ),
                Err(e) => tracing::warn!(error = %e, "warm-up cycle failed"),
            }

            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    res = shutdown_rx.changed() => {
                        // A dropped sender also means nobody can stop us later.
                        if res.is_err() || *shutdown_rx.borrow() {
                            tracing::info!("pipeline shutdown requested");
                            break;
                        }
                    }
                }
                match self.run_cycle(true).await {
                    Ok(outcome) => {
                        if outcome.newly_seen > 0 {
                            tracing::info!(
                                fetched = outcome.fetched,
                                normalized = outcome.normalized,
                                new = outcome.newly_seen,
                                "poll cycle done"
                            );
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "poll cycle abandoned"),
                }
            }
        });
        PipelineHandle { shutdown_tx, join }
    }
}

/// Handle for stopping the periodic loop and awaiting its completion.
pub struct PipelineHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl PipelineHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.join.await;
    }
}
