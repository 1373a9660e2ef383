//! Label glyphs: measuring and rasterizing text with the bundled UI font.
//!
//! The font is the one egui paints proportional text with, so widths used for
//! hit testing agree with what the desktop host shows.

use ab_glyph::{point, Font, FontRef, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use crate::error::Result;
use crate::geometry::Point;

#[derive(Clone, Debug)]
pub struct LabelFont {
    font: FontRef<'static>,
}

impl LabelFont {
    pub fn new() -> Result<Self> {
        let font = FontRef::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT)?;
        Ok(Self { font })
    }

    fn scale(font_size: u32) -> PxScale {
        PxScale::from(font_size as f32)
    }

    /// Advance width of `text` on one line, kerning included.
    pub fn measure(&self, text: &str, font_size: u32) -> f32 {
        let scaled = self.font.as_scaled(Self::scale(font_size));
        let mut width = 0.0;
        let mut prev: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    /// Distance from the baseline to the top of the tallest glyph.
    pub fn ascent(&self, font_size: u32) -> f32 {
        self.font.as_scaled(Self::scale(font_size)).ascent()
    }

    /// Blends `text` into `pixels` with its baseline starting at `at`.
    pub fn draw(&self, pixels: &mut RgbaImage, text: &str, at: Point, color: [u8; 4], font_size: u32) {
        let scale = Self::scale(font_size);
        let scaled = self.font.as_scaled(scale);
        let (w, h) = (pixels.width() as i64, pixels.height() as i64);
        let mut caret = at.x;
        let mut prev: Option<GlyphId> = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, at.y));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + gx as i64;
                let py = bounds.min.y as i64 + gy as i64;
                if px < 0 || py < 0 || px >= w || py >= h {
                    return;
                }
                let dst = pixels.get_pixel_mut(px as u32, py as u32);
                *dst = blend(*dst, color, coverage);
            });
        }
    }
}

/// Source-over blend of `color` at `coverage` onto `dst`.
fn blend(dst: Rgba<u8>, color: [u8; 4], coverage: f32) -> Rgba<u8> {
    let alpha = coverage.clamp(0.0, 1.0) * color[3] as f32 / 255.0;
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    if out_alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let value = (color[i] as f32 * alpha + dst[i] as f32 * dst_alpha * (1.0 - alpha)) / out_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([channel(0), channel(1), channel(2), (out_alpha * 255.0).round() as u8])
}
