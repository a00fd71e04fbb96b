// src/error.rs
// Error taxonomy shared across the pipeline. Per-transaction failures are
// caught and logged at the coordinator boundary; only startup-time
// misconfiguration is allowed to be fatal.

use thiserror::Error;

/// Card rendering failures, fatal for a single render only.
#[derive(Debug, Error)]
pub enum CardError {
    /// A field the compositor needs is absent (e.g. no owner nickname for
    /// the transaction's owner id). Caller's data problem, never retried.
    #[error("missing field: {field}")]
    MissingField { field: &'static str },

    /// An image (template, subject photo, owner photo) could not be loaded
    /// or fetched. Retried only if the feed re-delivers the transaction.
    #[error("missing asset {what}: {message}")]
    MissingAsset { what: &'static str, message: String },
}

impl CardError {
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn missing_asset(what: &'static str, err: impl std::fmt::Display) -> Self {
        Self::MissingAsset {
            what,
            message: err.to_string(),
        }
    }
}

/// Dedup ledger load/save failures. Loads fail open to an empty ledger;
/// saves are logged and retried on the next cycle.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("ledger format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Notification submission failures. Logged, never retried, and never roll
/// back a dedup-ledger insertion.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook HTTP status {status}")]
    Http { status: u16 },

    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Activity feed fetch/decode failures; abandon the cycle, next tick retries.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed HTTP status {status}")]
    Http { status: u16 },

    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feed decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}
