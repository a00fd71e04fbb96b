// src/app_config.rs
// Environment-driven bootstrap configuration. Missing feed credentials are
// the only fatal startup condition; everything else has a default.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub espn_s2: String,
    pub espn_swid: String,
    pub league_id: u64,
    pub season_year: u16,
    pub poll_secs: u64,
    pub activity_window: usize,
    pub bind_addr: String,
    pub pushcut_url: Option<String>,
    pub public_base_url: Option<String>,
    pub cards_dir: PathBuf,
    pub latest_card_path: PathBuf,
    pub seen_state_path: PathBuf,
    pub owner_map_path: PathBuf,
    pub template_path: PathBuf,
    pub owner_image_dir: PathBuf,
    pub caption_font_path: PathBuf,
    pub subject_font_path: PathBuf,
    pub card_layout_path: Option<PathBuf>,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env_opt(key) {
        Some(raw) => raw.parse::<T>().with_context(|| format!("parsing ${key}")),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Read configuration from the environment (after `dotenvy` has had its
    /// chance to populate it).
    pub fn from_env() -> Result<Self> {
        let Some(espn_s2) = env_opt("ESPN_S2") else {
            bail!("Missing ESPN_S2 env var; the activity feed needs cookies");
        };
        let Some(espn_swid) = env_opt("ESPN_SWID") else {
            bail!("Missing ESPN_SWID env var; the activity feed needs cookies");
        };

        Ok(Self {
            espn_s2,
            espn_swid,
            league_id: env_parse("LEAGUE_ID", 1_154_146_516)?,
            season_year: env_parse("SEASON_YEAR", 2025)?,
            poll_secs: env_parse("POLL_SECONDS", 10)?,
            activity_window: env_parse("ACTIVITY_WINDOW", 50)?,
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8000"),
            pushcut_url: env_opt("PUSHCUT_URL"),
            public_base_url: env_opt("PUBLIC_BASE_URL"),
            cards_dir: env_or("CARDS_DIR", "cards").into(),
            latest_card_path: env_or("LATEST_CARD_PATH", "out_add.png").into(),
            seen_state_path: env_or("SEEN_STATE_PATH", "seen_activity.json").into(),
            owner_map_path: env_or("OWNER_MAP_PATH", "owner_map.json").into(),
            template_path: env_or("TEMPLATE_PATH", "templates/template_add_or_drop.png").into(),
            owner_image_dir: env_or("OWNER_IMAGE_DIR", "owner_imgs").into(),
            caption_font_path: env_or("CAPTION_FONT_PATH", "fonts/arial.ttf").into(),
            subject_font_path: env_or("SUBJECT_FONT_PATH", "fonts/arial_bold.ttf").into(),
            card_layout_path: env_opt("CARD_LAYOUT_PATH").map(PathBuf::from),
        })
    }
}
