// src/feed/normalize.rs
use serde_json::Value;

use crate::feed::extract;
use crate::feed::types::{RawActivity, Transaction, TxKind};

/// Case-normalize a raw action marker and match it against the recognized
/// kinds. Unrecognized kinds (trades etc.) are expected and return `None`.
pub fn normalize_action(action_raw: &Value) -> Option<TxKind> {
    let text = match action_raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let upper = text.trim().to_uppercase();
    if upper.contains("ADDED") {
        Some(TxKind::Add)
    } else if upper.contains("DROPPED") {
        Some(TxKind::Drop)
    } else {
        None
    }
}

/// Convert one raw `[team, action, subject]` triple into a `Transaction`.
/// Entries missing any of the three parts, or with an unrecognized action,
/// are skipped silently; the feed is allowed to contain unrelated entries.
fn normalize_entry(entry: &Value) -> Option<Transaction> {
    let parts = entry.as_array()?;
    if parts.len() < 3 {
        return None;
    }
    let (team, action_raw, subject) = (&parts[0], &parts[1], &parts[2]);

    let kind = normalize_action(action_raw)?;
    let team_name = extract::team_display_name(team)?;
    let (subject_name, subject_id) = extract::subject_name_and_id(subject)?;

    Some(Transaction {
        team_name,
        owner_id: extract::owner_id(team),
        kind,
        subject_name,
        subject_id,
        subject_image_url: extract::headshot_url(subject_id),
        team_logo_url: extract::team_logo_url(team),
    })
}

/// Canonicalize a window of raw activities. Input order is preserved and no
/// deduplication happens here; that is the ledger's job. One activity may
/// emit several independent transactions.
pub fn normalize_activities(activities: &[RawActivity]) -> Vec<Transaction> {
    let mut out = Vec::new();
    for activity in activities {
        for entry in &activity.actions {
            if let Some(tx) = normalize_entry(entry) {
                out.push(tx);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn activity(entries: Vec<Value>) -> RawActivity {
        RawActivity { actions: entries }
    }

    #[test]
    fn trade_entries_emit_nothing() {
        let raw = activity(vec![json!([
            { "team_name": "moja" },
            "TRADED",
            { "name": "Bucky Irving", "playerId": 2577417 }
        ])]);
        assert!(normalize_activities(&[raw]).is_empty());
    }

    #[test]
    fn action_matching_is_case_insensitive_substring() {
        assert_eq!(normalize_action(&json!("Waiver Added")), Some(TxKind::Add));
        assert_eq!(normalize_action(&json!("dropped")), Some(TxKind::Drop));
        assert_eq!(normalize_action(&json!("TRADED")), None);
    }

    #[test]
    fn swap_activity_emits_two_transactions() {
        let raw = activity(vec![
            json!([{ "team_name": "moja" }, "FA ADDED", { "name": "Bucky Irving", "playerId": 2577417 }]),
            json!([{ "team_name": "moja" }, "DROPPED", { "name": "Gus Edwards", "playerId": 3051926 }]),
        ]);
        let txs = normalize_activities(&[raw]);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].kind, TxKind::Add);
        assert_eq!(txs[1].kind, TxKind::Drop);
        assert_eq!(txs[0].subject_name, "Bucky Irving");
    }

    #[test]
    fn short_or_malformed_entries_are_skipped() {
        let raw = activity(vec![
            json!(["only", "two"]),
            json!("not an array"),
            json!([{ "team_name": "moja" }, "ADDED", { "name": "Bucky Irving" }]),
        ]);
        let txs = normalize_activities(&[raw]);
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn missing_subject_id_leaves_image_absent() {
        let raw = activity(vec![json!([
            { "team_name": "moja" },
            "ADDED",
            { "name": "Bears D/ST" }
        ])]);
        let txs = normalize_activities(&[raw]);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].subject_id, None);
        assert_eq!(txs[0].subject_image_url, None);
    }
}
