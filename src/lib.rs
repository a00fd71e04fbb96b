// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod app_config;
pub mod card;
pub mod error;
pub mod feed;
pub mod layout;
pub mod ledger;
pub mod metrics;
pub mod notify;
pub mod owners;
pub mod pipeline;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::app_config::AppConfig;
pub use crate::card::{Card, CardLayout, CardRenderer, Compositor};
pub use crate::feed::{ActivityFeed, RawActivity, Transaction, TxKind};
pub use crate::ledger::{dedup_key, SeenLedger};
pub use crate::notify::{AlertPayload, AlertSink};
pub use crate::pipeline::{CycleOutcome, Pipeline, PipelineHandle};
