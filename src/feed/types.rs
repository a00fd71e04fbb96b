// src/feed/types.rs
use serde_json::Value;

use crate::error::FeedError;

/// One raw activity entry from the league feed. `actions` holds
/// provider-shaped `[teamObject, actionRaw, subjectObject]` triples; a single
/// activity may bundle several concurrent sub-events (e.g. an add+drop swap).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RawActivity {
    pub actions: Vec<Value>,
}

/// Recognized transaction kinds. Everything else in the feed (trades etc.)
/// is filtered out before a `Transaction` ever exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TxKind {
    #[serde(rename = "ADD")]
    Add,
    #[serde(rename = "DROP")]
    Drop,
}

impl TxKind {
    /// Marker string as the feed reports it, used in dedup keys.
    pub fn feed_str(self) -> &'static str {
        match self {
            TxKind::Add => "ADDED",
            TxKind::Drop => "DROPPED",
        }
    }
}

/// Canonical unit of work: one add/drop event, immutable once constructed.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub team_name: String,
    pub owner_id: Option<String>,
    pub kind: TxKind,
    pub subject_name: String,
    pub subject_id: Option<i64>,
    pub subject_image_url: Option<String>,
    pub team_logo_url: Option<String>,
}

#[async_trait::async_trait]
pub trait ActivityFeed: Send + Sync {
    /// Fetch a bounded window of recent raw activity records.
    async fn recent_activity(&self, size: usize) -> Result<Vec<RawActivity>, FeedError>;
    fn name(&self) -> &'static str;
}
