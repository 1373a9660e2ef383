use image::{Rgba, RgbaImage};
use rect_annotate::geometry::Point;
use rect_annotate::{
    AnnotateWidget, ParsedSubmission, PointerEvent, RasterCanvas, Snapshot, WidgetOptions,
};
use std::io::Cursor;

const OPTIONS: &str = r##"{
    "acceptedFiles": [".jpg", ".jpeg", ".png", ".gif"],
    "width": "300",
    "height": "100",
    "rectangleAnnotations": [
        {"key": "src", "label": "Source&#10;MAC", "color": "green", "width": "80", "height": "40", "required": "true"},
        {"key": "dst", "label": "Destination", "color": "#00f", "width": "50", "height": "50", "font_size": "12"}
    ]
}"##;

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 128, 255]))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn uploaded() -> AnnotateWidget<RasterCanvas> {
    let options = WidgetOptions::from_json(OPTIONS).unwrap();
    let mut widget = AnnotateWidget::new(options, RasterCanvas::new(1, 1).unwrap()).unwrap();
    let pending = widget.add_file("Switch.PNG", &png(150, 100)).unwrap();
    assert!(widget.complete_decode(pending.run().unwrap()));
    widget
}

fn assert_all_inside(widget: &AnnotateWidget<RasterCanvas>) {
    let size = widget.canvas_size();
    for a in widget.annotations() {
        assert!(a.x >= 0.0 && a.y >= 0.0, "{a:?}");
        assert!(a.x + a.width <= size.width && a.y + a.height <= size.height, "{a:?}");
        assert!(a.width >= 5.0 && a.height >= 5.0, "{a:?}");
    }
}

#[test]
fn edit_session_keeps_annotations_inside_canvas() {
    let mut widget = uploaded();
    assert_eq!(widget.canvas_size().height, 200.0);
    widget.toggle("src").unwrap();
    widget.toggle("dst").unwrap();

    // drag "dst" (centered at 125,75 50x50) far off the bottom right
    widget.handle_pointer(PointerEvent::Down(Point::new(150.0, 100.0)));
    widget.handle_pointer(PointerEvent::Move(Point::new(1000.0, 1000.0)));
    widget.handle_pointer(PointerEvent::Up);
    let dst = widget.annotations()[1].clone();
    assert_eq!((dst.x, dst.y), (250.0, 150.0));

    // grab its north-west corner and pull past the origin
    widget.handle_pointer(PointerEvent::Down(Point::new(250.0, 150.0)));
    widget.handle_pointer(PointerEvent::Move(Point::new(-40.0, -40.0)));
    widget.handle_pointer(PointerEvent::Leave);
    assert_all_inside(&widget);
    assert_eq!(widget.annotations()[1].x, 0.0);
    assert!(widget.interaction().is_idle());
}

#[test]
fn saved_state_restores_the_same_session() {
    let mut widget = uploaded();
    widget.toggle("dst").unwrap();
    widget.toggle("src").unwrap();
    let snapshot: Snapshot = serde_json::from_str(widget.output()).unwrap();

    let mut options = WidgetOptions::from_json(OPTIONS).unwrap();
    let configs = options.configs().to_vec();
    options.rectangle_annotations = rect_annotate::config::RectangleAnnotations::Wrapped {
        config: configs,
        saved_state: Some(snapshot.saved_state.clone()),
    };
    let mut restored = AnnotateWidget::new(options, RasterCanvas::new(1, 1).unwrap()).unwrap();
    assert_eq!(restored.annotations(), widget.annotations());
    assert_eq!(restored.files(), widget.files());

    let pending = restored.take_pending_decode().expect("restore queues a decode");
    assert!(restored.complete_decode(pending.run().unwrap()));
    assert_eq!(restored.canvas_size(), widget.canvas_size());
    assert_eq!(restored.annotations(), widget.annotations());

    let again: Snapshot = serde_json::from_str(restored.output()).unwrap();
    assert_eq!(again.saved_state, snapshot.saved_state);
    assert_eq!(again.rectangles.keys().collect::<Vec<_>>(), ["dst", "src"]);
}

#[test]
fn submission_checks_required_types() {
    let mut widget = uploaded();
    widget.toggle("dst").unwrap();
    let parsed = ParsedSubmission::parse(widget.output()).unwrap();
    let err = parsed.check_required(widget.configs()).unwrap_err();
    assert_eq!(err.to_string(), "Missing required annotations: Source&#10;MAC");

    widget.toggle("src").unwrap();
    let parsed = ParsedSubmission::parse(widget.output()).unwrap();
    assert!(parsed.check_required(widget.configs()).is_ok());
    assert!(!parsed.canvas.starts_with("data:"));
}

#[test]
fn colors_resolve_from_palette() {
    let mut widget = uploaded();
    widget.toggle("src").unwrap();
    widget.toggle("dst").unwrap();
    assert_eq!(widget.annotations()[0].color, "#00FF00");
    assert_eq!(widget.annotations()[1].color, "#00f");
}
