// src/notify/mod.rs
pub mod pushcut;

use serde::Serialize;

use crate::error::DeliveryError;
use crate::feed::{Transaction, TxKind};

pub use pushcut::PushcutNotifier;

/// Payload handed to the delivery channel for one newly seen transaction.
/// Field names are part of the downstream contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    pub kind: TxKind,
    pub text: String,
    pub team_name: String,
    pub team_logo_url: Option<String>,
    pub subject_name: String,
    pub subject_id: Option<i64>,
    pub subject_image_url: Option<String>,
    pub card_image_url: Option<String>,
    pub raw_transaction: Transaction,
}

impl AlertPayload {
    pub fn for_transaction(tx: &Transaction, card_image_url: Option<String>) -> Self {
        Self {
            kind: tx.kind,
            text: alert_text(tx),
            team_name: tx.team_name.clone(),
            team_logo_url: tx.team_logo_url.clone(),
            subject_name: tx.subject_name.clone(),
            subject_id: tx.subject_id,
            subject_image_url: tx.subject_image_url.clone(),
            card_image_url,
            raw_transaction: tx.clone(),
        }
    }
}

/// Short human-readable summary used as the notification text.
pub fn alert_text(tx: &Transaction) -> String {
    match tx.kind {
        TxKind::Add => format!("➕ ADD\n✅ {} added: {}", tx.team_name, tx.subject_name),
        TxKind::Drop => format!("➖ DROP\n🚫 {} dropped: {}", tx.team_name, tx.subject_name),
    }
}

#[async_trait::async_trait]
pub trait AlertSink: Send + Sync {
    /// Submit one alert. Failures are logged by the caller and never rolled
    /// back into the dedup ledger.
    async fn deliver(&self, payload: &AlertPayload) -> Result<(), DeliveryError>;
}

/// Sink used when no webhook is configured: logs and succeeds.
pub struct LogOnlySink;

#[async_trait::async_trait]
impl AlertSink for LogOnlySink {
    async fn deliver(&self, payload: &AlertPayload) -> Result<(), DeliveryError> {
        tracing::info!(
            kind = ?payload.kind,
            team = %payload.team_name,
            subject = %payload.subject_name,
            "no webhook configured; alert logged only"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx() -> Transaction {
        Transaction {
            team_name: "moja".into(),
            owner_id: Some("{OWNER}".into()),
            kind: TxKind::Add,
            subject_name: "Bucky Irving".into(),
            subject_id: Some(2577417),
            subject_image_url: Some(
                "https://a.espncdn.com/i/headshots/nfl/players/full/2577417.png".into(),
            ),
            team_logo_url: None,
        }
    }

    #[test]
    fn payload_serializes_with_contract_field_names() {
        let payload = AlertPayload::for_transaction(&tx(), Some("https://h/cards/abc.png".into()));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "ADD");
        assert_eq!(json["teamName"], "moja");
        assert_eq!(json["subjectId"], 2577417);
        assert_eq!(json["cardImageUrl"], "https://h/cards/abc.png");
        assert_eq!(json["rawTransaction"]["subject_name"], "Bucky Irving");
    }

    #[test]
    fn alert_text_mentions_team_and_subject() {
        let text = alert_text(&tx());
        assert!(text.contains("moja"));
        assert!(text.contains("Bucky Irving"));
        assert!(text.contains("ADD"));
    }
}
