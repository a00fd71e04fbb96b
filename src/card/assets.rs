// src/card/assets.rs
// Image asset loading: the background template and owner photos come from
// disk, subject headshots from the CDN. Every failure maps to MissingAsset,
// fatal for that single render only.

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::RgbaImage;
use reqwest::Client;

use crate::error::CardError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

pub struct AssetStore {
    client: Client,
    template_path: PathBuf,
    owner_image_dir: PathBuf,
}

impl AssetStore {
    pub fn new(template_path: impl Into<PathBuf>, owner_image_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            template_path: template_path.into(),
            owner_image_dir: owner_image_dir.into(),
        }
    }

    pub fn load_template(&self) -> Result<RgbaImage, CardError> {
        load_local("template", &self.template_path)
    }

    /// Owner photos are pre-normalized files named `{nickname}.jpeg`.
    pub fn load_owner_image(&self, nickname: &str) -> Result<RgbaImage, CardError> {
        let path = self.owner_image_dir.join(format!("{nickname}.jpeg"));
        load_local("owner image", &path)
    }

    pub async fn fetch_subject_image(&self, url: &str) -> Result<RgbaImage, CardError> {
        let resp = self
            .client
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .header(reqwest::header::USER_AGENT, "Mozilla/5.0")
            .send()
            .await
            .map_err(|e| CardError::missing_asset("subject image", e))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| CardError::missing_asset("subject image", e))?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| CardError::missing_asset("subject image", e))?;
        image::load_from_memory(&bytes)
            .map(|img| img.to_rgba8())
            .map_err(|e| CardError::missing_asset("subject image", e))
    }
}

fn load_local(what: &'static str, path: &Path) -> Result<RgbaImage, CardError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| CardError::missing_asset(what, format!("{}: {e}", path.display())))
}
