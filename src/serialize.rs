//! The output blob written to the host's form field.

use base64::{engine::general_purpose, Engine as _};
use image::imageops::FilterType;
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Cursor;

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::model::{Annotation, ImageRecord, SavedState};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// The full decorated canvas as a PNG data URL.
    pub canvas: String,
    pub saved_state: SavedState,
    /// Cropped interior of each annotation, keyed by `annotation_name`.
    pub rectangles: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", general_purpose::STANDARD.encode(bytes))
}

pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let (header, payload) = url.split_once(',').ok_or(Error::InvalidDataUrl)?;
    if !header.starts_with("data:") || !header.ends_with(";base64") {
        return Err(Error::InvalidDataUrl);
    }
    Ok(general_purpose::STANDARD.decode(payload.trim())?)
}

pub fn png_data_url(image: &RgbaImage) -> Result<String> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(encode_data_url("image/png", &bytes))
}

/// The undecorated base image under an annotation.
///
/// The source region is inset by half the border on each side so no border
/// pixels bleed in, then stretched back to the annotation's own size.
pub fn crop_interior(base: &RgbaImage, annotation: &Annotation) -> RgbaImage {
    let out_w = (annotation.width.trunc() as u32).max(1);
    let out_h = (annotation.height.trunc() as u32).max(1);

    let border = annotation.border_width as f32;
    let inset = (border / 2.0).ceil();
    let src_x = (annotation.x + inset).round() as i64;
    let src_y = (annotation.y + inset).round() as i64;
    let src_w = (annotation.width - border).round() as i64;
    let src_h = (annotation.height - border).round() as i64;

    let (img_w, img_h) = (base.width() as i64, base.height() as i64);
    let left = src_x.clamp(0, img_w);
    let top = src_y.clamp(0, img_h);
    let right = (src_x + src_w).clamp(0, img_w);
    let bottom = (src_y + src_h).clamp(0, img_h);
    if right <= left || bottom <= top {
        return RgbaImage::new(out_w, out_h);
    }

    let region = image::imageops::crop_imm(
        base,
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    )
    .to_image();
    if region.dimensions() == (out_w, out_h) {
        region
    } else {
        image::imageops::resize(&region, out_w, out_h, FilterType::Triangle)
    }
}

/// Builds the snapshot from the current canvas and model.
///
/// Without a decoded base image the crops come out fully transparent.
pub fn snapshot<C: Canvas>(
    canvas: &C,
    base: Option<&RgbaImage>,
    files: &[ImageRecord],
    annotations: &[Annotation],
) -> Result<Snapshot> {
    let canvas_url = encode_data_url("image/png", &canvas.to_png()?);
    let mut rectangles = BTreeMap::new();
    for annotation in annotations {
        let crop = match base {
            Some(base) => crop_interior(base, annotation),
            None => RgbaImage::new(
                (annotation.width as u32).max(1),
                (annotation.height as u32).max(1),
            ),
        };
        rectangles.insert(annotation.annotation_name.clone(), png_data_url(&crop)?);
    }
    Ok(Snapshot {
        canvas: canvas_url,
        saved_state: SavedState {
            files: files.to_vec(),
            annotations: annotations.to_vec(),
        },
        rectangles,
    })
}
