//! The drawing surface the renderer paints on.
//!
//! [`RasterCanvas`] is the built-in implementation: a plain RGBA buffer that
//! can be encoded to PNG for the snapshot, with labels rasterized into it.

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use std::io::Cursor;

use crate::error::Result;
use crate::geometry::{CanvasSize, Point, Rect};
use crate::text::LabelFont;

pub trait Canvas {
    fn size(&self) -> CanvasSize;

    /// Changes the pixel dimensions; contents are discarded.
    fn resize(&mut self, width: u32, height: u32);

    fn clear(&mut self);

    /// Draws `image` scaled to fill the whole canvas.
    fn draw_image(&mut self, image: &RgbaImage);

    /// Strokes the outline of `rect`, centered on its edges.
    fn stroke_rect(&mut self, rect: Rect, color: [u8; 4], line_width: f32);

    /// Draws one line of text with its baseline at `at.y`.
    fn fill_text(&mut self, text: &str, at: Point, color: [u8; 4], font_size: u32);

    fn measure_text(&self, text: &str, font_size: u32) -> f32;

    /// Encodes the current contents as PNG.
    fn to_png(&self) -> Result<Vec<u8>>;
}

pub struct RasterCanvas {
    pixels: RgbaImage,
    font: LabelFont,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            pixels: RgbaImage::new(width.max(1), height.max(1)),
            font: LabelFont::new()?,
        })
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    fn fill_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: [u8; 4]) {
        let (w, h) = (self.pixels.width() as i64, self.pixels.height() as i64);
        let left = (x0.round() as i64).clamp(0, w);
        let right = (x1.round() as i64).clamp(0, w);
        let top = (y0.round() as i64).clamp(0, h);
        let bottom = (y1.round() as i64).clamp(0, h);
        for py in top..bottom {
            for px in left..right {
                self.pixels.put_pixel(px as u32, py as u32, Rgba(color));
            }
        }
    }
}

impl Canvas for RasterCanvas {
    fn size(&self) -> CanvasSize {
        CanvasSize::new(self.pixels.width() as f32, self.pixels.height() as f32)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::new(width.max(1), height.max(1));
    }

    fn clear(&mut self) {
        self.pixels.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    fn draw_image(&mut self, image: &RgbaImage) {
        let (w, h) = self.pixels.dimensions();
        if image.dimensions() == (w, h) {
            self.pixels = image.clone();
        } else {
            self.pixels = image::imageops::resize(image, w, h, FilterType::Triangle);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: [u8; 4], line_width: f32) {
        let half = line_width / 2.0;
        let (left, top, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
        self.fill_rect(left - half, top - half, right + half, top + half, color);
        self.fill_rect(left - half, bottom - half, right + half, bottom + half, color);
        self.fill_rect(left - half, top + half, left + half, bottom - half, color);
        self.fill_rect(right - half, top + half, right + half, bottom - half, color);
    }

    fn fill_text(&mut self, text: &str, at: Point, color: [u8; 4], font_size: u32) {
        self.font.draw(&mut self.pixels, text, at, color, font_size);
    }

    fn measure_text(&self, text: &str, font_size: u32) -> f32 {
        self.font.measure(text, font_size)
    }

    fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}
