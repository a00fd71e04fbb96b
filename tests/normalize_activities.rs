// tests/normalize_activities.rs
use roster_activity_alerter::feed::{normalize_activities, RawActivity, TxKind};
use serde_json::json;

fn window() -> Vec<RawActivity> {
    vec![
        // A trade: recognized but intentionally filtered.
        RawActivity {
            actions: vec![json!([
                { "team_name": "Team Chaos" },
                "TRADED",
                { "name": "Some Player", "playerId": 111 }
            ])],
        },
        // A swap bundling an add and a drop in one activity.
        RawActivity {
            actions: vec![
                json!([
                    { "team_name": "moja", "owners": [{ "id": "{OWNER-1}" }] },
                    "FA ADDED",
                    { "name": "Bucky Irving", "playerId": 2577417 }
                ]),
                json!([
                    { "team_name": "moja", "owners": [{ "id": "{OWNER-1}" }] },
                    "DROPPED",
                    { "name": "Gus Edwards", "playerId": 3051926 }
                ]),
            ],
        },
        // Partial entry: missing the subject object entirely.
        RawActivity {
            actions: vec![json!([{ "team_name": "moja" }, "ADDED"])],
        },
    ]
}

#[test]
fn unrecognized_kinds_emit_zero_transactions() {
    let txs = normalize_activities(&window()[..1]);
    assert!(txs.is_empty());
}

#[test]
fn window_order_is_preserved_and_swaps_split() {
    let txs = normalize_activities(&window());
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].kind, TxKind::Add);
    assert_eq!(txs[0].subject_name, "Bucky Irving");
    assert_eq!(txs[0].owner_id.as_deref(), Some("{OWNER-1}"));
    assert_eq!(
        txs[0].subject_image_url.as_deref(),
        Some("https://a.espncdn.com/i/headshots/nfl/players/full/2577417.png")
    );
    assert_eq!(txs[1].kind, TxKind::Drop);
    assert_eq!(txs[1].subject_name, "Gus Edwards");
}

#[test]
fn no_dedup_happens_at_normalization() {
    let one = RawActivity {
        actions: vec![json!([
            { "team_name": "moja" },
            "ADDED",
            { "name": "Bucky Irving", "playerId": 2577417 }
        ])],
    };
    // Same record re-delivered across the window: the normalizer keeps both;
    // the ledger is the only dedup stage.
    let txs = normalize_activities(&[one.clone(), one]);
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0], txs[1]);
}
