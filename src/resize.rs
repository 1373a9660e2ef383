//! Drag and resize geometry, with the canvas clamping applied after every
//! step.

use crate::geometry::{label_height, split_label, CanvasSize, Point, Rect, ResizeDirection};
use crate::model::Annotation;

/// Smallest width or height a resize may leave behind.
pub const MIN_SIZE: f32 = 5.0;

/// Moves `rect` so it lies inside the canvas. A rectangle larger than the
/// canvas is pinned to the origin.
pub fn clamp_into(rect: Rect, canvas: CanvasSize) -> Rect {
    let x = rect.x.min(canvas.width - rect.width).max(0.0);
    let y = rect.y.min(canvas.height - rect.height).max(0.0);
    Rect::new(x, y, rect.width, rect.height)
}

/// Shrinks `rect` to at most the canvas size, then moves it inside. Used on
/// geometry that did not come from an edit, such as a restored session.
pub fn fit_into(rect: Rect, canvas: CanvasSize) -> Rect {
    let width = rect.width.min(canvas.width).max(MIN_SIZE.min(canvas.width));
    let height = rect.height.min(canvas.height).max(MIN_SIZE.min(canvas.height));
    clamp_into(Rect::new(rect.x, rect.y, width, height), canvas)
}

/// Places the annotation's origin at `cursor - offset`, kept inside the canvas.
pub fn drag_to(annotation: &mut Annotation, cursor: Point, offset: Point, canvas: CanvasSize) {
    let origin = cursor - offset;
    let moved = Rect::new(origin.x, origin.y, annotation.width, annotation.height);
    annotation.set_rect(clamp_into(moved, canvas));
}

/// Moves the edges named by `direction` to the cursor, leaving the opposite
/// edges anchored. No clamping; the result may be inverted.
pub fn resize_toward(rect: Rect, direction: ResizeDirection, p: Point) -> Rect {
    let Rect {
        mut x,
        mut y,
        mut width,
        mut height,
    } = rect;

    let (west, east, north, south) = match direction {
        ResizeDirection::NW => (true, false, true, false),
        ResizeDirection::N => (false, false, true, false),
        ResizeDirection::NE => (false, true, true, false),
        ResizeDirection::E => (false, true, false, false),
        ResizeDirection::SE => (false, true, false, true),
        ResizeDirection::S => (false, false, false, true),
        ResizeDirection::SW => (true, false, false, true),
        ResizeDirection::W => (true, false, false, false),
    };

    if west {
        width += x - p.x;
        x = p.x;
    }
    if east {
        width = p.x - x;
    }
    if north {
        height += y - p.y;
        y = p.y;
    }
    if south {
        height = p.y - y;
    }
    Rect::new(x, y, width, height)
}

/// Resizes toward the cursor, then clamps to the canvas and enforces
/// [`MIN_SIZE`].
///
/// Overflow past the left or top edge is cut from the size and the origin is
/// pinned to zero; overflow past the top also gives up room for the label.
/// A dimension that ends below the minimum is restored, together with its
/// origin coordinate, to its value before this step.
pub fn apply_resize(
    annotation: &mut Annotation,
    direction: ResizeDirection,
    cursor: Point,
    canvas: CanvasSize,
) {
    let original = annotation.rect();
    let mut r = resize_toward(original, direction, cursor);
    let label_h = label_height(split_label(&annotation.label).len(), annotation.font_size);

    if r.x < 0.0 {
        r.width += r.x;
        r.x = 0.0;
    }
    if r.y < 0.0 {
        r.height += r.y - label_h;
        r.y = 0.0;
    }
    if r.right() > canvas.width {
        r.width = canvas.width - r.x;
    }
    if r.bottom() > canvas.height {
        r.height = canvas.height - r.y;
    }

    if r.width < MIN_SIZE {
        r.width = original.width;
        r.x = original.x;
    }
    if r.height < MIN_SIZE {
        r.height = original.height;
        r.y = original.y;
    }
    annotation.set_rect(r);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann(x: f32, y: f32, w: f32, h: f32) -> Annotation {
        Annotation {
            kind: "t".into(),
            x,
            y,
            width: w,
            height: h,
            color: "#FF0000".into(),
            label: "T".into(),
            annotation_name: "t".into(),
            font_size: 14,
            border_width: 2,
            resizable: true,
        }
    }

    fn big_canvas() -> CanvasSize {
        CanvasSize::new(500.0, 400.0)
    }

    #[test]
    fn fit_shrinks_and_moves_inside() {
        let canvas = CanvasSize::new(300.0, 200.0);
        let fitted = fit_into(Rect::new(250.0, -20.0, 1.0e6, 80.0), canvas);
        assert_eq!(fitted, Rect::new(0.0, 0.0, 300.0, 80.0));
        let fitted = fit_into(Rect::new(280.0, 190.0, 50.0, 2.0), canvas);
        assert_eq!(fitted, Rect::new(250.0, 190.0, 50.0, 5.0));
        let inside = Rect::new(10.0, 10.0, 50.0, 50.0);
        assert_eq!(fit_into(inside, canvas), inside);
    }

    fn assert_inside(a: &Annotation, canvas: CanvasSize) {
        assert!(a.x >= 0.0 && a.y >= 0.0, "{a:?}");
        assert!(a.x + a.width <= canvas.width, "{a:?}");
        assert!(a.y + a.height <= canvas.height, "{a:?}");
        assert!(a.width >= MIN_SIZE && a.height >= MIN_SIZE, "{a:?}");
    }

    #[test]
    fn east_moves_only_right_edge() {
        let r = resize_toward(
            Rect::new(50.0, 50.0, 100.0, 100.0),
            ResizeDirection::E,
            Point::new(200.0, 999.0),
        );
        assert_eq!(r, Rect::new(50.0, 50.0, 150.0, 100.0));
    }

    #[test]
    fn north_west_anchors_bottom_right() {
        let r = resize_toward(
            Rect::new(50.0, 50.0, 100.0, 100.0),
            ResizeDirection::NW,
            Point::new(30.0, 20.0),
        );
        assert_eq!(r, Rect::new(30.0, 20.0, 120.0, 130.0));
    }

    #[test]
    fn every_direction_keeps_its_anchor() {
        let start = Rect::new(100.0, 100.0, 100.0, 100.0);
        let p = Point::new(80.0, 260.0);
        assert_eq!(resize_toward(start, ResizeDirection::SW, p), Rect::new(80.0, 100.0, 120.0, 160.0));
        assert_eq!(resize_toward(start, ResizeDirection::S, p), Rect::new(100.0, 100.0, 100.0, 160.0));
        assert_eq!(resize_toward(start, ResizeDirection::W, p), Rect::new(80.0, 100.0, 120.0, 100.0));
        let p = Point::new(260.0, 80.0);
        assert_eq!(resize_toward(start, ResizeDirection::NE, p), Rect::new(100.0, 80.0, 160.0, 120.0));
        assert_eq!(resize_toward(start, ResizeDirection::N, p), Rect::new(100.0, 80.0, 100.0, 120.0));
        assert_eq!(resize_toward(start, ResizeDirection::SE, Point::new(150.0, 170.0)), Rect::new(100.0, 100.0, 50.0, 70.0));
    }

    #[test]
    fn east_resize_applied() {
        let mut a = ann(50.0, 50.0, 100.0, 100.0);
        apply_resize(&mut a, ResizeDirection::E, Point::new(200.0, 75.0), big_canvas());
        assert_eq!(a.rect(), Rect::new(50.0, 50.0, 150.0, 100.0));
    }

    #[test]
    fn right_overflow_is_truncated() {
        let mut a = ann(400.0, 50.0, 50.0, 50.0);
        apply_resize(&mut a, ResizeDirection::SE, Point::new(900.0, 900.0), big_canvas());
        assert_eq!(a.rect(), Rect::new(400.0, 50.0, 100.0, 350.0));
    }

    #[test]
    fn left_overflow_is_cut_and_pinned() {
        let mut a = ann(20.0, 50.0, 50.0, 50.0);
        apply_resize(&mut a, ResizeDirection::W, Point::new(-30.0, 60.0), big_canvas());
        assert_eq!(a.rect(), Rect::new(0.0, 50.0, 70.0, 50.0));
    }

    #[test]
    fn top_overflow_gives_up_label_room() {
        let mut a = ann(20.0, 100.0, 50.0, 100.0);
        apply_resize(&mut a, ResizeDirection::N, Point::new(40.0, -10.0), big_canvas());
        // 210 tall before clamping, minus 10 overflow, minus a 24px label
        assert_eq!(a.rect(), Rect::new(20.0, 0.0, 50.0, 176.0));
    }

    #[test]
    fn collapse_reverts_that_dimension_only() {
        let mut a = ann(50.0, 50.0, 100.0, 100.0);
        apply_resize(&mut a, ResizeDirection::NW, Point::new(148.0, 20.0), big_canvas());
        assert_eq!(a.rect(), Rect::new(50.0, 20.0, 100.0, 130.0));
    }

    #[test]
    fn inversion_reverts() {
        let mut a = ann(50.0, 50.0, 100.0, 100.0);
        apply_resize(&mut a, ResizeDirection::SE, Point::new(10.0, 10.0), big_canvas());
        assert_eq!(a.rect(), Rect::new(50.0, 50.0, 100.0, 100.0));
    }

    #[test]
    fn resize_never_leaves_canvas() {
        let canvas = big_canvas();
        let dirs = [
            ResizeDirection::N,
            ResizeDirection::NE,
            ResizeDirection::E,
            ResizeDirection::SE,
            ResizeDirection::S,
            ResizeDirection::SW,
            ResizeDirection::W,
            ResizeDirection::NW,
        ];
        let cursors = [
            Point::new(-100.0, -100.0),
            Point::new(700.0, 700.0),
            Point::new(120.0, 120.0),
            Point::new(0.0, 399.0),
            Point::new(-5.0, 250.0),
        ];
        for dir in dirs {
            for cursor in cursors {
                let mut a = ann(100.0, 100.0, 60.0, 60.0);
                apply_resize(&mut a, dir, cursor, canvas);
                assert_inside(&a, canvas);
            }
        }
    }

    #[test]
    fn drag_is_clamped() {
        let canvas = CanvasSize::new(300.0, 200.0);
        let mut a = ann(10.0, 10.0, 50.0, 40.0);
        let offset = Point::new(5.0, 5.0);
        drag_to(&mut a, Point::new(-20.0, 100.0), offset, canvas);
        assert_eq!(a.rect(), Rect::new(0.0, 95.0, 50.0, 40.0));
        drag_to(&mut a, Point::new(400.0, 400.0), offset, canvas);
        assert_eq!(a.rect(), Rect::new(250.0, 160.0, 50.0, 40.0));
        assert_inside(&a, canvas);
    }
}
