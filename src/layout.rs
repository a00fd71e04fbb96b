// src/layout.rs
// Deterministic text layout: fit a string into a fixed horizontal region,
// center it, and draw it with a blurred shadow on a separate layer so the
// foreground glyph edges stay crisp.

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use imageproc::filter::gaussian_blur_f32;
use serde::Deserialize;

/// Smallest size `fit_font` will return; below this, clipping is preferred
/// over an unreadable caption.
pub const MIN_FONT_PX: u32 = 8;

/// Fixed rectangle a caption must fit into. `baseline_y` is the vertical
/// anchor the caption is drawn at.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Region {
    pub left_x: f32,
    pub right_x: f32,
    pub baseline_y: i32,
}

impl Region {
    pub fn width(&self) -> f32 {
        self.right_x - self.left_x
    }
}

/// Measurement seam: production uses a scalable font, tests a fixed-advance
/// fake. Width must be a pure function of `(text, px)`.
pub trait TextMeasurer {
    fn text_width(&self, text: &str, px: f32) -> f32;
}

/// `TextMeasurer` backed by an `ab_glyph` font, advance widths plus kerning.
pub struct FontMeasurer<'a, F: Font> {
    font: &'a F,
}

impl<'a, F: Font> FontMeasurer<'a, F> {
    pub fn new(font: &'a F) -> Self {
        Self { font }
    }
}

impl<F: Font> TextMeasurer for FontMeasurer<'_, F> {
    fn text_width(&self, text: &str, px: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(px));
        let mut width = 0.0;
        let mut prev = None;
        for c in text.chars() {
            let glyph = self.font.glyph_id(c);
            if let Some(prev) = prev {
                width += scaled.kern(prev, glyph);
            }
            width += scaled.h_advance(glyph);
            prev = Some(glyph);
        }
        width
    }
}

/// Largest integer size in `min_px..=start_px` whose measured width fits the
/// region. Monotonic descending search by 1, first fit wins; if nothing fits
/// the floor is returned and overflow is accepted rather than erroring.
pub fn fit_font(m: &impl TextMeasurer, text: &str, region: Region, start_px: u32, min_px: u32) -> u32 {
    let min_px = min_px.max(1);
    let mut px = start_px.max(min_px);
    while px > min_px {
        if m.text_width(text, px as f32) <= region.width() {
            return px;
        }
        px -= 1;
    }
    min_px
}

/// Horizontal origin that centers `text` in the region, floored to an
/// integer pixel coordinate.
pub fn centered_x(m: &impl TextMeasurer, text: &str, px: u32, region: Region) -> i32 {
    let text_w = m.text_width(text, px as f32);
    (region.left_x + (region.width() - text_w) / 2.0).floor() as i32
}

/// Shadow parameters for caption text.
#[derive(Debug, Clone, Copy)]
pub struct ShadowStyle {
    pub color: Rgba<u8>,
    pub offset: (i32, i32),
    pub blur_sigma: f32,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            color: Rgba([0, 0, 0, 160]),
            offset: (3, 3),
            blur_sigma: 2.0,
        }
    }
}

/// Draw `text` at `(x, y)` with a drop shadow. The shadow run is drawn on an
/// isolated transparent layer offset by `shadow.offset`, the blur is applied
/// to that layer only, the layer is composited under the glyphs, and the
/// foreground run is drawn crisp on top. The two-layer pass is a hard
/// requirement: blurring must never soften the foreground edges.
#[allow(clippy::too_many_arguments)]
pub fn draw_shadowed_text(
    canvas: &mut RgbaImage,
    x: i32,
    y: i32,
    text: &str,
    font: &impl Font,
    px: f32,
    fill: Rgba<u8>,
    shadow: &ShadowStyle,
) {
    let scale = PxScale::from(px);

    let mut layer = RgbaImage::new(canvas.width(), canvas.height());
    draw_text_mut(
        &mut layer,
        shadow.color,
        x + shadow.offset.0,
        y + shadow.offset.1,
        scale,
        font,
        text,
    );
    let layer = if shadow.blur_sigma > 0.0 {
        gaussian_blur_f32(&layer, shadow.blur_sigma)
    } else {
        layer
    };
    image::imageops::overlay(canvas, &layer, 0, 0);

    draw_text_mut(canvas, fill, x, y, scale, font, text);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-advance fake: every char is `0.6 * px` wide.
    struct Monospace;

    impl TextMeasurer for Monospace {
        fn text_width(&self, text: &str, px: f32) -> f32 {
            text.chars().count() as f32 * px * 0.6
        }
    }

    fn region(left: f32, right: f32) -> Region {
        Region {
            left_x: left,
            right_x: right,
            baseline_y: 0,
        }
    }

    #[test]
    fn fit_keeps_start_size_when_text_fits() {
        // 10 chars at 24px -> 144.0 wide, region is 200 wide.
        assert_eq!(fit_font(&Monospace, "abcdefghij", region(0.0, 200.0), 24, 8), 24);
    }

    #[test]
    fn overflowing_text_shrinks_below_start_size() {
        let r = region(509.4, 766.0);
        let text = "An Extremely Long Team Name ADDS";
        let px = fit_font(&Monospace, text, r, 24, 8);
        assert!(px < 24);
        assert!(Monospace.text_width(text, px as f32) <= r.width());
    }

    #[test]
    fn floor_is_returned_when_nothing_fits() {
        let r = region(0.0, 10.0);
        assert_eq!(fit_font(&Monospace, "wide wide wide", r, 24, 8), 8);
    }

    #[test]
    fn widening_the_region_never_shrinks_the_choice() {
        let text = "Bucky Irving";
        for width in (40..400).step_by(7) {
            let narrow = fit_font(&Monospace, text, region(0.0, width as f32), 35, 8);
            let wide = fit_font(&Monospace, text, region(0.0, width as f32 + 25.0), 35, 8);
            assert!(wide >= narrow, "width {width}: {wide} < {narrow}");
        }
    }

    #[test]
    fn centered_origin_centers_within_one_pixel() {
        let r = region(509.4, 766.0);
        let text = "Bucky Irving";
        let px = fit_font(&Monospace, text, r, 35, 8);
        let x = centered_x(&Monospace, text, px, r);
        let mid = (r.left_x + r.right_x) / 2.0;
        let text_mid = x as f32 + Monospace.text_width(text, px as f32) / 2.0;
        assert!((text_mid - mid).abs() <= 1.0);
    }
}
