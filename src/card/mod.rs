// src/card/mod.rs
// Card compositing: background template + subject photo + owner photo + two
// fitted caption lines, flattened into one RGBA image with a deterministic
// content id.

pub mod assets;

use std::path::Path;

use ab_glyph::FontVec;
use anyhow::Context;
use image::{imageops, Rgba, RgbaImage};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::CardError;
use crate::feed::{Transaction, TxKind};
use crate::layout::{centered_x, draw_shadowed_text, fit_font, FontMeasurer, Region, ShadowStyle, TextMeasurer, MIN_FONT_PX};
use crate::ledger::dedup_key;
use crate::owners::OwnerDirectory;

pub use assets::AssetStore;

/// Finished render artifact: a flattened image plus its content id.
pub struct Card {
    pub id: String,
    pub image: RgbaImage,
}

/// Content id for a dedup key: truncated hex digest, stable across renders.
pub fn card_id(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut hex = String::with_capacity(12);
    for byte in digest.iter().take(6) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

/// Kind -> (verb suffix, accent color). Fixed two-entry table.
pub fn verb_and_accent(kind: TxKind, layout: &CardLayout) -> (&'static str, Rgba<u8>) {
    match kind {
        TxKind::Add => (" ADDS", Rgba(layout.accent_add)),
        TxKind::Drop => (" DROPS", Rgba(layout.accent_drop)),
    }
}

/// Pixel geometry and palette of the card template. Defaults match the
/// shipped `template_add_or_drop.png`; a TOML file can override them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CardLayout {
    pub subject_pos: (i64, i64),
    pub owner_pos: (i64, i64),
    pub caption1: Region,
    pub caption2: Region,
    pub caption1_px: u32,
    pub caption2_px: u32,
    pub caption_color: [u8; 4],
    pub accent_add: [u8; 4],
    pub accent_drop: [u8; 4],
    pub shadow_color: [u8; 4],
    pub shadow_offset: (i32, i32),
    pub shadow_blur: f32,
    /// Optional fixed slots for consistent photo sizing; photos are still
    /// clamped to the canvas area right/below their anchor either way.
    pub subject_slot: Option<(u32, u32)>,
    pub owner_slot: Option<(u32, u32)>,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            subject_pos: (0, 156),
            owner_pos: (566, 28),
            caption1: Region {
                left_x: 509.4,
                right_x: 766.0,
                baseline_y: 337,
            },
            caption2: Region {
                left_x: 509.4,
                right_x: 766.0,
                baseline_y: 399,
            },
            caption1_px: 24,
            caption2_px: 35,
            caption_color: [255, 255, 255, 255],
            accent_add: [90, 255, 80, 255],
            accent_drop: [235, 72, 72, 255],
            shadow_color: [0, 0, 0, 160],
            shadow_offset: (3, 3),
            shadow_blur: 2.0,
            subject_slot: None,
            owner_slot: None,
        }
    }
}

impl CardLayout {
    pub fn from_toml_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading card layout from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    fn shadow(&self) -> ShadowStyle {
        ShadowStyle {
            color: Rgba(self.shadow_color),
            offset: self.shadow_offset,
            blur_sigma: self.shadow_blur,
        }
    }
}

/// Caption line 1 (italic-ish) and line 2 (bold) fonts.
pub struct CardFonts {
    pub caption: FontVec,
    pub subject: FontVec,
}

impl CardFonts {
    pub fn load(caption_path: impl AsRef<Path>, subject_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(Self {
            caption: load_font(caption_path.as_ref())?,
            subject: load_font(subject_path.as_ref())?,
        })
    }
}

fn load_font(path: &Path) -> anyhow::Result<FontVec> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    FontVec::try_from_vec(bytes).with_context(|| format!("parsing font {}", path.display()))
}

/// Downscale (never upscale) to fit within `max_w x max_h`, preserving
/// aspect ratio.
pub fn downscale_to_fit(img: &RgbaImage, max_w: u32, max_h: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w <= max_w && h <= max_h {
        return img.clone();
    }
    let scale = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
    let nw = ((w as f64 * scale) as u32).max(1);
    let nh = ((h as f64 * scale) as u32).max(1);
    imageops::resize(img, nw, nh, imageops::FilterType::Lanczos3)
}

#[async_trait::async_trait]
pub trait CardRenderer: Send + Sync {
    /// Produce a finished card for one transaction. Failures are fatal for
    /// this render only, never for the pipeline.
    async fn render(&self, tx: &Transaction) -> Result<Card, CardError>;
}

pub struct Compositor {
    layout: CardLayout,
    fonts: CardFonts,
    assets: AssetStore,
    owners: OwnerDirectory,
}

impl Compositor {
    pub fn new(layout: CardLayout, fonts: CardFonts, assets: AssetStore, owners: OwnerDirectory) -> Self {
        Self {
            layout,
            fonts,
            assets,
            owners,
        }
    }

    fn paste_photo(
        base: &mut RgbaImage,
        photo: RgbaImage,
        pos: (i64, i64),
        slot: Option<(u32, u32)>,
    ) {
        let (x, y) = pos;
        let photo = match slot {
            Some((sw, sh)) => downscale_to_fit(&photo, sw, sh),
            None => photo,
        };
        // Clamp to the canvas area right/below the anchor so the photo never
        // overflows the template.
        let max_w = (base.width() as i64 - x).max(1) as u32;
        let max_h = (base.height() as i64 - y).max(1) as u32;
        let photo = downscale_to_fit(&photo, max_w, max_h);
        imageops::overlay(base, &photo, x, y);
    }

    fn draw_captions(&self, base: &mut RgbaImage, nickname: &str, verb: &str, accent: Rgba<u8>, subject_name: &str) {
        let shadow = self.layout.shadow();
        let caption_fill = Rgba(self.layout.caption_color);

        // Line 1: "<team><verb>" fitted and centered as one block, then the
        // verb drawn in the accent color right after the team segment so the
        // split does not alter total centering.
        let c1 = self.layout.caption1;
        let measurer = FontMeasurer::new(&self.fonts.caption);
        let line1 = format!("{nickname}{verb}");
        let px1 = fit_font(&measurer, &line1, c1, self.layout.caption1_px, MIN_FONT_PX);
        let line1_x = centered_x(&measurer, &line1, px1, c1);
        draw_shadowed_text(
            base,
            line1_x,
            c1.baseline_y,
            nickname,
            &self.fonts.caption,
            px1 as f32,
            caption_fill,
            &shadow,
        );
        let team_w = measurer.text_width(nickname, px1 as f32);
        let verb_x = (line1_x as f32 + team_w).round() as i32;
        draw_shadowed_text(
            base,
            verb_x,
            c1.baseline_y,
            verb,
            &self.fonts.caption,
            px1 as f32,
            accent,
            &shadow,
        );

        // Line 2: subject name, independently fitted and centered.
        let c2 = self.layout.caption2;
        let measurer = FontMeasurer::new(&self.fonts.subject);
        let px2 = fit_font(&measurer, subject_name, c2, self.layout.caption2_px, MIN_FONT_PX);
        let line2_x = centered_x(&measurer, subject_name, px2, c2);
        draw_shadowed_text(
            base,
            line2_x,
            c2.baseline_y,
            subject_name,
            &self.fonts.subject,
            px2 as f32,
            caption_fill,
            &shadow,
        );
    }
}

#[async_trait::async_trait]
impl CardRenderer for Compositor {
    async fn render(&self, tx: &Transaction) -> Result<Card, CardError> {
        if tx.subject_name.is_empty() {
            return Err(CardError::missing_field("subjectName"));
        }
        let owner_id = tx
            .owner_id
            .as_deref()
            .ok_or_else(|| CardError::missing_field("ownerId"))?;
        let nickname = self
            .owners
            .nickname(owner_id)
            .ok_or_else(|| CardError::missing_field("ownerNickname"))?
            .to_string();
        let subject_url = tx
            .subject_image_url
            .as_deref()
            .ok_or_else(|| CardError::missing_field("subjectImageUrl"))?;

        let (verb, accent) = verb_and_accent(tx.kind, &self.layout);

        let mut base = self.assets.load_template()?;
        let subject_img = self.assets.fetch_subject_image(subject_url).await?;
        let owner_img = self.assets.load_owner_image(&nickname)?;

        Self::paste_photo(&mut base, subject_img, self.layout.subject_pos, self.layout.subject_slot);
        Self::paste_photo(&mut base, owner_img, self.layout.owner_pos, self.layout.owner_slot);

        self.draw_captions(&mut base, &nickname, verb, accent, &tx.subject_name);

        Ok(Card {
            id: card_id(&dedup_key(tx)),
            image: base,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_id_is_deterministic_and_short() {
        let a = card_id("moja|ADDED|Bucky Irving|2577417");
        let b = card_id("moja|ADDED|Bucky Irving|2577417");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, card_id("moja|DROPPED|Bucky Irving|2577417"));
    }

    #[test]
    fn verb_table_has_exactly_two_entries() {
        let layout = CardLayout::default();
        let (verb, color) = verb_and_accent(TxKind::Add, &layout);
        assert_eq!(verb, " ADDS");
        assert_eq!(color, Rgba([90, 255, 80, 255]));
        let (verb, color) = verb_and_accent(TxKind::Drop, &layout);
        assert_eq!(verb, " DROPS");
        assert_eq!(color, Rgba([235, 72, 72, 255]));
    }

    #[test]
    fn downscale_never_upscales() {
        let img = RgbaImage::new(100, 50);
        let out = downscale_to_fit(&img, 400, 400);
        assert_eq!(out.dimensions(), (100, 50));
    }

    #[test]
    fn downscale_preserves_aspect_ratio() {
        let img = RgbaImage::new(400, 200);
        let out = downscale_to_fit(&img, 100, 100);
        assert_eq!(out.dimensions(), (100, 50));
    }

    #[test]
    fn layout_toml_overrides_defaults() {
        let text = r#"
            caption1_px = 30
            accent_add = [0, 200, 0, 255]
            subject_slot = [900, 900]
        "#;
        let layout: CardLayout = toml::from_str(text).unwrap();
        assert_eq!(layout.caption1_px, 30);
        assert_eq!(layout.accent_add, [0, 200, 0, 255]);
        assert_eq!(layout.subject_slot, Some((900, 900)));
        // untouched fields keep defaults
        assert_eq!(layout.caption2_px, 35);
    }
}
