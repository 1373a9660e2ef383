//! Canvas-space geometry: rectangles, label boxes, hit-testing and
//! resize-handle detection.

use serde::{Deserialize, Serialize};

use crate::model::Annotation;

/// Gap between a rectangle edge and its label box.
pub const LABEL_GAP: f32 = 10.0;
/// Padding added to the stacked line height of a label.
pub const LABEL_PADDING: f32 = 10.0;

/// Rectangles thinner than this get a 1px grace margin when hit-testing.
const SMALL_RECT: f32 = 10.0;
const SMALL_RECT_GRACE: f32 = 1.0;

/// Rectangles thinner than this get the wider handle threshold.
const SMALL_HANDLE_RECT: f32 = 20.0;
const HANDLE_THRESHOLD: f32 = 10.0;
const SMALL_HANDLE_THRESHOLD: f32 = 15.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle, origin at the top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Edges are inclusive.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn expand(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Square of side `2 * half` centered on `center`.
    fn around(center: Point, half: f32) -> Rect {
        Rect::new(center.x - half, center.y - half, half * 2.0, half * 2.0)
    }
}

/// Splits a label into display lines.
///
/// Literal newlines and the HTML entities `&#10;` / `&#xA;` all break a line.
/// An empty label has no lines at all.
pub fn split_label(label: &str) -> Vec<&str> {
    if label.is_empty() {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut rest = label;
    loop {
        let next = [("\n", 1), ("&#10;", 5), ("&#xA;", 5)]
            .iter()
            .filter_map(|(sep, len)| rest.find(sep).map(|at| (at, *len)))
            .min_by_key(|(at, _)| *at);
        match next {
            Some((at, len)) => {
                lines.push(&rest[..at]);
                rest = &rest[at + len..];
            }
            None => {
                lines.push(rest);
                return lines;
            }
        }
    }
}

pub fn label_height(line_count: usize, font_size: u32) -> f32 {
    line_count as f32 * font_size as f32 + LABEL_PADDING
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelPlacement {
    Above,
    Below,
}

/// Above when the whole label box fits between the canvas top and the
/// rectangle, otherwise below.
pub fn label_placement(rect: &Rect, label_height: f32) -> LabelPlacement {
    if rect.y - LABEL_GAP - label_height >= 0.0 {
        LabelPlacement::Above
    } else {
        LabelPlacement::Below
    }
}

/// Where an annotation's label goes and how much room it takes.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelLayout<'a> {
    pub lines: Vec<&'a str>,
    pub placement: LabelPlacement,
    pub bounds: Rect,
}

pub fn label_layout<'a, F>(annotation: &'a Annotation, measure: F) -> LabelLayout<'a>
where
    F: Fn(&str, u32) -> f32,
{
    let rect = annotation.rect();
    let lines = split_label(&annotation.label);
    let width = lines
        .iter()
        .map(|line| measure(line, annotation.font_size))
        .fold(0.0_f32, f32::max);
    let height = label_height(lines.len(), annotation.font_size);
    let placement = label_placement(&rect, height);
    let y = match placement {
        LabelPlacement::Above => rect.y - height - LABEL_GAP,
        LabelPlacement::Below => rect.bottom() + LABEL_GAP,
    };
    LabelLayout {
        lines,
        placement,
        bounds: Rect::new(rect.x, y, width, height),
    }
}

/// The clickable area of an annotation: its rectangle plus its label box,
/// grown by a pixel when the rectangle is thin.
pub fn bounding_box<F>(annotation: &Annotation, measure: F) -> Rect
where
    F: Fn(&str, u32) -> f32,
{
    let rect = annotation.rect();
    let combined = rect.union(&label_layout(annotation, measure).bounds);
    if rect.width < SMALL_RECT || rect.height < SMALL_RECT {
        combined.expand(SMALL_RECT_GRACE)
    } else {
        combined
    }
}

/// Index of the topmost annotation under `point`. Later entries are painted
/// last, so the search runs back to front.
pub fn hit_test<F>(point: Point, annotations: &[Annotation], measure: F) -> Option<usize>
where
    F: Fn(&str, u32) -> f32,
{
    annotations
        .iter()
        .enumerate()
        .rev()
        .find(|(_, ann)| bounding_box(ann, &measure).contains(point))
        .map(|(i, _)| i)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResizeDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl ResizeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeDirection::N => "n",
            ResizeDirection::NE => "ne",
            ResizeDirection::E => "e",
            ResizeDirection::SE => "se",
            ResizeDirection::S => "s",
            ResizeDirection::SW => "sw",
            ResizeDirection::W => "w",
            ResizeDirection::NW => "nw",
        }
    }

    /// CSS cursor name for hovering this handle.
    pub fn cursor_name(&self) -> &'static str {
        match self {
            ResizeDirection::NW | ResizeDirection::SE => "nwse-resize",
            ResizeDirection::NE | ResizeDirection::SW => "nesw-resize",
            ResizeDirection::N | ResizeDirection::S => "ns-resize",
            ResizeDirection::E | ResizeDirection::W => "ew-resize",
        }
    }
}

/// Which resize handle, if any, sits under `p`.
///
/// Corners win over edges. Edge zones stop short of the corner zones.
pub fn resize_direction(rect: &Rect, p: Point) -> Option<ResizeDirection> {
    let t = if rect.width < SMALL_HANDLE_RECT || rect.height < SMALL_HANDLE_RECT {
        SMALL_HANDLE_THRESHOLD
    } else {
        HANDLE_THRESHOLD
    };
    let (left, top, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());

    let corners = [
        (ResizeDirection::NW, Point::new(left, top)),
        (ResizeDirection::NE, Point::new(right, top)),
        (ResizeDirection::SW, Point::new(left, bottom)),
        (ResizeDirection::SE, Point::new(right, bottom)),
    ];
    if let Some((dir, _)) = corners
        .iter()
        .find(|(_, corner)| Rect::around(*corner, t).contains(p))
    {
        return Some(*dir);
    }

    let between_x = p.x > left + t && p.x < right - t;
    let between_y = p.y > top + t && p.y < bottom - t;
    if (p.y - top).abs() <= t && between_x {
        Some(ResizeDirection::N)
    } else if (p.y - bottom).abs() <= t && between_x {
        Some(ResizeDirection::S)
    } else if (p.x - left).abs() <= t && between_y {
        Some(ResizeDirection::W)
    } else if (p.x - right).abs() <= t && between_y {
        Some(ResizeDirection::E)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_width(text: &str, font_size: u32) -> f32 {
        text.chars().count() as f32 * font_size as f32 * 0.5
    }

    fn ann(kind: &str, x: f32, y: f32, w: f32, h: f32) -> Annotation {
        Annotation {
            kind: kind.into(),
            x,
            y,
            width: w,
            height: h,
            color: "#FF0000".into(),
            label: String::new(),
            annotation_name: kind.into(),
            font_size: 14,
            border_width: 2,
            resizable: true,
        }
    }

    #[test]
    fn label_separators_are_equivalent() {
        assert_eq!(split_label("A\nB"), vec!["A", "B"]);
        assert_eq!(split_label("A&#10;B"), vec!["A", "B"]);
        assert_eq!(split_label("A&#xA;B"), vec!["A", "B"]);
        assert_eq!(split_label("one"), vec!["one"]);
        assert!(split_label("").is_empty());
    }

    #[test]
    fn mixed_separators() {
        assert_eq!(split_label("a&#xA;b\nc&#10;"), vec!["a", "b", "c", ""]);
    }

    #[test]
    fn label_goes_above_when_it_fits() {
        let mut a = ann("t", 20.0, 100.0, 50.0, 50.0);
        a.label = "Two\nLines".into();
        let layout = label_layout(&a, fixed_width);
        assert_eq!(layout.placement, LabelPlacement::Above);
        // 2 lines * 14px + 10 padding
        assert_eq!(layout.bounds.height, 38.0);
        assert_eq!(layout.bounds.y, 100.0 - 38.0 - 10.0);
        assert_eq!(layout.bounds.width, 5.0 * 7.0);
    }

    #[test]
    fn label_goes_below_near_top() {
        let mut a = ann("t", 20.0, 5.0, 50.0, 50.0);
        a.label = "L".into();
        let layout = label_layout(&a, fixed_width);
        assert_eq!(layout.placement, LabelPlacement::Below);
        assert_eq!(layout.bounds.y, 65.0);
    }

    #[test]
    fn label_box_is_part_of_hit_area() {
        let mut a = ann("t", 20.0, 100.0, 50.0, 50.0);
        a.label = "A very long label".into();
        let point_on_label = Point::new(100.0, 80.0);
        assert_eq!(hit_test(point_on_label, &[a], fixed_width), Some(0));
    }

    #[test]
    fn topmost_annotation_wins() {
        let list = vec![
            ann("under", 10.0, 50.0, 100.0, 100.0),
            ann("over", 60.0, 60.0, 100.0, 100.0),
        ];
        assert_eq!(hit_test(Point::new(80.0, 80.0), &list, fixed_width), Some(1));
        assert_eq!(hit_test(Point::new(20.0, 140.0), &list, fixed_width), Some(0));
        assert_eq!(hit_test(Point::new(400.0, 400.0), &list, fixed_width), None);
    }

    #[test]
    fn thin_rectangles_get_a_grace_pixel() {
        let a = ann("thin", 50.0, 50.0, 100.0, 6.0);
        let just_left = Point::new(49.5, 52.0);
        assert_eq!(hit_test(just_left, std::slice::from_ref(&a), fixed_width), Some(0));
        let wide = ann("wide", 50.0, 50.0, 100.0, 60.0);
        assert_eq!(hit_test(just_left, &[wide], fixed_width), None);
    }

    #[test]
    fn corners_take_priority() {
        let r = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(resize_direction(&r, Point::new(52.0, 48.0)), Some(ResizeDirection::NW));
        assert_eq!(resize_direction(&r, Point::new(150.0, 50.0)), Some(ResizeDirection::NE));
        assert_eq!(resize_direction(&r, Point::new(45.0, 158.0)), Some(ResizeDirection::SW));
        assert_eq!(resize_direction(&r, Point::new(159.0, 159.0)), Some(ResizeDirection::SE));
    }

    #[test]
    fn edges_between_corner_zones() {
        let r = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(resize_direction(&r, Point::new(100.0, 45.0)), Some(ResizeDirection::N));
        assert_eq!(resize_direction(&r, Point::new(100.0, 155.0)), Some(ResizeDirection::S));
        assert_eq!(resize_direction(&r, Point::new(55.0, 100.0)), Some(ResizeDirection::W));
        assert_eq!(resize_direction(&r, Point::new(142.0, 100.0)), Some(ResizeDirection::E));
        assert_eq!(resize_direction(&r, Point::new(100.0, 100.0)), None);
    }

    #[test]
    fn small_rectangles_use_wider_threshold() {
        let r = Rect::new(50.0, 50.0, 100.0, 15.0);
        // 13px off the left edge is outside the normal 10px zone
        assert_eq!(resize_direction(&r, Point::new(37.0, 50.0)), Some(ResizeDirection::NW));
        let big = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(resize_direction(&big, Point::new(37.0, 50.0)), None);
    }

    #[test]
    fn cursor_names() {
        assert_eq!(ResizeDirection::NW.cursor_name(), "nwse-resize");
        assert_eq!(ResizeDirection::SW.cursor_name(), "nesw-resize");
        assert_eq!(ResizeDirection::S.cursor_name(), "ns-resize");
        assert_eq!(ResizeDirection::W.cursor_name(), "ew-resize");
    }
}
