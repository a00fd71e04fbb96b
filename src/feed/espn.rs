// src/feed/espn.rs
// Production feed client for the ESPN fantasy v3 API. Authentication is
// cookie-based (ESPN_S2 / SWID); the activity window comes from the league
// communication view and is mapped into raw `[team, action, subject]`
// triples for the normalizer.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::error::FeedError;
use crate::feed::types::{ActivityFeed, RawActivity};

const API_BASE: &str = "https://lm-api-reads.fantasy.espn.com/apis/v3/games/ffl";
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

pub struct EspnActivityFeed {
    client: Client,
    league_id: u64,
    season: u16,
    cookie: String,
    // Lazily filled caches; both views are stable within a season.
    teams: RwLock<HashMap<i64, Value>>,
    player_names: RwLock<HashMap<i64, String>>,
}

impl EspnActivityFeed {
    pub fn new(league_id: u64, season: u16, espn_s2: &str, swid: &str) -> Self {
        Self {
            client: Client::new(),
            league_id,
            season,
            cookie: format!("espn_s2={espn_s2}; SWID={swid}"),
            teams: RwLock::new(HashMap::new()),
            player_names: RwLock::new(HashMap::new()),
        }
    }

    fn league_url(&self) -> String {
        format!(
            "{API_BASE}/seasons/{}/segments/0/leagues/{}",
            self.season, self.league_id
        )
    }

    async fn get_json(&self, url: &str, filter: Option<&Value>) -> Result<Value, FeedError> {
        let mut req = self
            .client
            .get(url)
            .timeout(HTTP_TIMEOUT)
            .header(reqwest::header::USER_AGENT, "Mozilla/5.0")
            .header(reqwest::header::COOKIE, &self.cookie);
        if let Some(f) = filter {
            req = req.header("X-Fantasy-Filter", f.to_string());
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Http {
                status: status.as_u16(),
            });
        }
        Ok(resp.json::<Value>().await?)
    }

    /// Map a message type id to the action marker the normalizer matches on.
    /// Unknown ids stay as-is and fall through the kind filter downstream.
    fn action_for_message(msg_type: i64) -> &'static str {
        match msg_type {
            178 | 180 | 186 => "ADDED",
            179 | 181 | 239 => "DROPPED",
            244 => "TRADED",
            _ => "UNKNOWN",
        }
    }

    /// Which message field carries the acting team depends on the action.
    fn team_field_for(action: &str) -> &'static str {
        match action {
            "DROPPED" | "TRADED" => "for",
            _ => "to",
        }
    }

    async fn ensure_teams(&self) -> Result<(), FeedError> {
        if !self.teams.read().await.is_empty() {
            return Ok(());
        }
        let body = self.get_json(&format!("{}?view=mTeam", self.league_url()), None).await?;
        let mut map = HashMap::new();
        for team in body.get("teams").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]) {
            let Some(id) = team.get("id").and_then(Value::as_i64) else {
                continue;
            };
            let name = team
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| {
                    let loc = team.get("location").and_then(Value::as_str)?;
                    let nick = team.get("nickname").and_then(Value::as_str)?;
                    Some(format!("{loc} {nick}"))
                });
            let owners: Vec<Value> = team
                .get("owners")
                .and_then(Value::as_array)
                .map(|ids| {
                    ids.iter()
                        .filter_map(Value::as_str)
                        .map(|id| json!({ "id": id }))
                        .collect()
                })
                .unwrap_or_default();
            map.insert(
                id,
                json!({
                    "team_name": name,
                    "team_id": id,
                    "logo": team.get("logo").cloned().unwrap_or(Value::Null),
                    "owners": owners,
                }),
            );
        }
        *self.teams.write().await = map;
        Ok(())
    }

    async fn ensure_player_names(&self) -> Result<(), FeedError> {
        if !self.player_names.read().await.is_empty() {
            return Ok(());
        }
        let filter = json!({ "filterActive": { "value": true } });
        let url = format!("{API_BASE}/seasons/{}/players?view=players_wl", self.season);
        let body = self.get_json(&url, Some(&filter)).await?;
        let mut map = HashMap::new();
        for p in body.as_array().map(Vec::as_slice).unwrap_or(&[]) {
            if let (Some(id), Some(name)) = (
                p.get("id").and_then(Value::as_i64),
                p.get("fullName").and_then(Value::as_str),
            ) {
                map.insert(id, name.to_string());
            }
        }
        *self.player_names.write().await = map;
        Ok(())
    }

    async fn subject_value(&self, player_id: i64) -> Value {
        match self.player_names.read().await.get(&player_id) {
            Some(name) => json!({ "playerId": player_id, "name": name }),
            None => json!({ "playerId": player_id }),
        }
    }
}

#[async_trait::async_trait]
impl ActivityFeed for EspnActivityFeed {
    async fn recent_activity(&self, size: usize) -> Result<Vec<RawActivity>, FeedError> {
        self.ensure_teams().await?;
        self.ensure_player_names().await?;

        let filter = json!({
            "topics": {
                "filterType": { "value": ["ACTIVITY_TRANSACTIONS"] },
                "limit": size,
                "limitPerMessageSet": { "value": 25 },
                "offset": 0,
                "sortMessageDate": { "sortPriority": 1, "sortAsc": false },
                "sortFor": { "sortPriority": 2, "sortAsc": false },
            }
        });
        let url = format!("{}/communication/?view=kona_league_communication", self.league_url());
        let body = self.get_json(&url, Some(&filter)).await?;

        let teams = self.teams.read().await;
        let mut out = Vec::new();
        for topic in body.get("topics").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]) {
            let mut actions = Vec::new();
            for msg in topic.get("messages").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]) {
                let msg_type = msg.get("messageTypeId").and_then(Value::as_i64).unwrap_or(0);
                let action = Self::action_for_message(msg_type);
                let team_id = msg
                    .get(Self::team_field_for(action))
                    .and_then(Value::as_i64)
                    .unwrap_or(0);
                let team = teams.get(&team_id).cloned().unwrap_or(Value::Null);
                let player_id = msg.get("targetId").and_then(Value::as_i64).unwrap_or(0);
                let subject = self.subject_value(player_id).await;
                actions.push(json!([team, action, subject]));
            }
            if !actions.is_empty() {
                out.push(RawActivity { actions });
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "espn"
    }
}
