// src/ledger.rs
// Dedup ledger: a grow-only set of keys for transactions that have already
// produced a card. Load is fail-open (a damaged file must never prevent
// startup); save is atomic at cycle granularity.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::feed::Transaction;

/// Deterministic identity string for a transaction. The `|` separator does
/// not occur in team or player names, so the key stays human-inspectable.
pub fn dedup_key(tx: &Transaction) -> String {
    let id = tx
        .subject_id
        .map(|v| v.to_string())
        .unwrap_or_else(|| "None".to_string());
    format!(
        "{}|{}|{}|{}",
        tx.team_name,
        tx.kind.feed_str(),
        tx.subject_name,
        id
    )
}

#[derive(Serialize, Deserialize)]
struct LedgerRecord {
    seen_keys: Vec<String>,
    updated_at: u64,
}

struct LedgerState {
    keys: HashSet<String>,
    dirty: bool,
}

pub struct SeenLedger {
    path: PathBuf,
    inner: Mutex<LedgerState>,
}

impl SeenLedger {
    /// Load the ledger from `path`. Missing or corrupt storage is treated as
    /// an empty ledger: the system prefers occasionally re-notifying over
    /// refusing to start.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let keys = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<LedgerRecord>(&content) {
                Ok(record) => record.seen_keys.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt ledger, starting empty");
                    HashSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable ledger, starting empty");
                HashSet::new()
            }
        };
        Self {
            path,
            inner: Mutex::new(LedgerState { keys, dirty: false }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn seen(&self, key: &str) -> bool {
        self.inner.lock().expect("ledger mutex poisoned").keys.contains(key)
    }

    /// Atomic check-and-insert: true at most once per key across any
    /// sequence of calls. Keys are never removed once inserted.
    pub fn mark_seen(&self, key: &str) -> bool {
        let mut state = self.inner.lock().expect("ledger mutex poisoned");
        let inserted = state.keys.insert(key.to_string());
        if inserted {
            state.dirty = true;
        }
        inserted
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("ledger mutex poisoned").keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist the full key set if anything changed since the last save.
    /// Writes to a temp file and renames so readers never observe a torn
    /// ledger. A failed save leaves the dirty flag set for the next cycle.
    pub fn save(&self) -> Result<(), LedgerError> {
        let record = {
            let state = self.inner.lock().expect("ledger mutex poisoned");
            if !state.dirty {
                return Ok(());
            }
            let mut seen_keys: Vec<String> = state.keys.iter().cloned().collect();
            seen_keys.sort();
            LedgerRecord {
                seen_keys,
                updated_at: chrono::Utc::now().timestamp().max(0) as u64,
            }
        };

        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(&record)?;
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &self.path)?;

        self.inner.lock().expect("ledger mutex poisoned").dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::TxKind;

    fn tx(team: &str, kind: TxKind, subject: &str, id: Option<i64>) -> Transaction {
        Transaction {
            team_name: team.into(),
            owner_id: None,
            kind,
            subject_name: subject.into(),
            subject_id: id,
            subject_image_url: None,
            team_logo_url: None,
        }
    }

    #[test]
    fn key_is_pure_function_of_identifying_fields() {
        let a = tx("moja", TxKind::Add, "Bucky Irving", Some(2577417));
        let mut b = a.clone();
        b.owner_id = Some("{SWID}".into());
        b.team_logo_url = Some("https://cdn.example/logo.png".into());
        assert_eq!(dedup_key(&a), dedup_key(&b));
        assert_eq!(dedup_key(&a), "moja|ADDED|Bucky Irving|2577417");
    }

    #[test]
    fn absent_subject_id_is_spelled_out() {
        let a = tx("moja", TxKind::Drop, "Bears D/ST", None);
        assert_eq!(dedup_key(&a), "moja|DROPPED|Bears D/ST|None");
    }

    #[test]
    fn mark_seen_is_true_at_most_once() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = SeenLedger::load(dir.path().join("seen.json"));
        let key = dedup_key(&tx("moja", TxKind::Add, "Bucky Irving", Some(2577417)));
        assert!(ledger.mark_seen(&key));
        assert!(!ledger.mark_seen(&key));
        assert!(ledger.seen(&key));
    }

    #[test]
    fn save_then_load_round_trips_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");

        let ledger = SeenLedger::load(&path);
        ledger.mark_seen("a|ADDED|X|1");
        ledger.mark_seen("b|DROPPED|Y|None");
        ledger.save().unwrap();

        let reloaded = SeenLedger::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.seen("a|ADDED|X|1"));
        assert!(reloaded.seen("b|DROPPED|Y|None"));
    }

    #[test]
    fn corrupt_file_fails_open_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        std::fs::write(&path, "{ not json").unwrap();

        let ledger = SeenLedger::load(&path);
        assert!(ledger.is_empty());
    }

    #[test]
    fn save_without_changes_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        let ledger = SeenLedger::load(&path);
        ledger.save().unwrap();
        assert!(!path.exists());
    }
}
