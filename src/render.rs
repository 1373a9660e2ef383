use image::RgbaImage;

use crate::canvas::Canvas;
use crate::color::to_rgba;
use crate::geometry::{label_height, label_placement, split_label, LabelPlacement, Point, LABEL_GAP};
use crate::model::Annotation;

/// Baseline positions for each label line of `annotation`.
///
/// Above the rectangle the lines stack upward so the last one sits nearest
/// the border; below it they stack downward from the border.
pub fn label_baselines<'a>(annotation: &'a Annotation) -> Vec<(&'a str, Point)> {
    let lines = split_label(&annotation.label);
    let rect = annotation.rect();
    let font = annotation.font_size as f32;
    let count = lines.len();
    let placement = label_placement(&rect, label_height(count, annotation.font_size));

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let y = match placement {
                LabelPlacement::Above => rect.y - LABEL_GAP - (count - 1 - i) as f32 * font,
                LabelPlacement::Below => rect.bottom() + LABEL_GAP + (i as f32 + 0.6) * font,
            };
            (line, Point::new(rect.x, y))
        })
        .collect()
}

/// Draws one annotation: border first, then its label.
pub fn draw_annotation<C: Canvas>(canvas: &mut C, annotation: &Annotation) {
    let color = to_rgba(&annotation.color);
    canvas.stroke_rect(annotation.rect(), color, annotation.border_width as f32);
    for (line, at) in label_baselines(annotation) {
        canvas.fill_text(line, at, color, annotation.font_size);
    }
}

/// Full redraw: clear, base image, then every annotation in paint order.
pub fn render<C: Canvas>(canvas: &mut C, base: &RgbaImage, annotations: &[Annotation]) {
    canvas.clear();
    canvas.draw_image(base);
    for annotation in annotations {
        draw_annotation(canvas, annotation);
    }
}
