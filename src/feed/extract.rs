// src/feed/extract.rs
// Adapter over loosely-typed feed objects. Every lookup is a declared
// priority list of candidate keys; the first non-empty candidate wins and a
// miss is an explicit `None`, never an error.

use serde_json::Value;

/// Headshot URL pattern used when the feed reports a usable subject id.
const HEADSHOT_URL_PREFIX: &str = "https://a.espncdn.com/i/headshots/nfl/players/full/";

const TEAM_NAME_KEYS: &[&str] = &["team_name", "teamName", "name", "nickname"];
const TEAM_LOGO_KEYS: &[&str] = &["logo_url", "logoUrl", "logo", "team_logo", "teamLogo"];
const TEAM_ID_KEYS: &[&str] = &["team_id", "teamId", "id"];
const SUBJECT_NAME_KEYS: &[&str] = &["name", "fullName"];
const SUBJECT_ID_KEYS: &[&str] = &["playerId", "player_id", "id"];

/// First non-empty string value among `keys`.
pub fn first_string(obj: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = obj.get(key).and_then(Value::as_str) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

/// First integer value among `keys`; all-digit strings count too.
pub fn first_int(obj: &Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        match obj.get(key) {
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_i64() {
                    return Some(v);
                }
            }
            Some(Value::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
                if let Ok(v) = s.parse::<i64>() {
                    return Some(v);
                }
            }
            _ => {}
        }
    }
    None
}

/// Team display name, falling back to `"Team {id}"` when only an id exists.
pub fn team_display_name(team: &Value) -> Option<String> {
    if let Some(name) = first_string(team, TEAM_NAME_KEYS) {
        return Some(name);
    }
    first_int(team, TEAM_ID_KEYS).map(|id| format!("Team {id}"))
}

/// Team logo: first candidate that is an http(s) URL.
pub fn team_logo_url(team: &Value) -> Option<String> {
    first_string(team, TEAM_LOGO_KEYS).filter(|s| s.starts_with("http"))
}

/// Primary owner id: `owners[0].id` when present.
pub fn owner_id(team: &Value) -> Option<String> {
    team.get("owners")
        .and_then(Value::as_array)
        .and_then(|owners| owners.first())
        .and_then(|o| o.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Subject display name plus numeric id. A missing name falls back to
/// `"Player {id}"`; a record with neither name nor id yields `None`.
pub fn subject_name_and_id(subject: &Value) -> Option<(String, Option<i64>)> {
    let id = first_int(subject, SUBJECT_ID_KEYS);
    match first_string(subject, SUBJECT_NAME_KEYS) {
        Some(name) => Some((name, id)),
        None => id.map(|id| (format!("Player {id}"), Some(id))),
    }
}

/// Headshot URL for a subject id. Absent or non-positive ids (e.g. team
/// defenses) have no headshot; the transaction stays valid without one.
pub fn headshot_url(subject_id: Option<i64>) -> Option<String> {
    match subject_id {
        Some(id) if id > 0 => Some(format!("{HEADSHOT_URL_PREFIX}{id}.png")),
        _ => None,
    }
}
