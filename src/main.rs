use anyhow::{anyhow, Context};
use eframe::egui;
use rect_annotate::decode::{DecodedImage, PendingDecode};
use rect_annotate::geometry::{split_label, Point, ResizeDirection};
use rect_annotate::{AnnotateWidget, CursorHint, PointerEvent, RasterCanvas, WidgetOptions};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

// ── Decode worker ───────────────────────────────────────────────────────────

type DecodeResult = rect_annotate::Result<DecodedImage>;

fn spawn_decode(pending: PendingDecode, tx: Sender<DecodeResult>, ctx: egui::Context) {
    std::thread::spawn(move || {
        let _ = tx.send(pending.run());
        ctx.request_repaint();
    });
}

fn cursor_icon(hint: CursorHint) -> egui::CursorIcon {
    match hint {
        CursorHint::Default => egui::CursorIcon::Default,
        CursorHint::Move => egui::CursorIcon::Move,
        CursorHint::Resize(dir) => match dir {
            ResizeDirection::NW | ResizeDirection::SE => egui::CursorIcon::ResizeNwSe,
            ResizeDirection::NE | ResizeDirection::SW => egui::CursorIcon::ResizeNeSw,
            ResizeDirection::N | ResizeDirection::S => egui::CursorIcon::ResizeVertical,
            ResizeDirection::E | ResizeDirection::W => egui::CursorIcon::ResizeHorizontal,
        },
    }
}

// ── App ─────────────────────────────────────────────────────────────────────

struct AnnotateApp {
    widget: AnnotateWidget<RasterCanvas>,
    texture: Option<egui::TextureHandle>,
    texture_dirty: bool,
    accepted: Vec<String>,

    decode_tx: Sender<DecodeResult>,
    decode_rx: Receiver<DecodeResult>,
    started: bool,

    was_hovered: bool,
    last_pos: Option<egui::Pos2>,

    output_path: Option<PathBuf>,
    written: String,
}

impl AnnotateApp {
    fn new(widget: AnnotateWidget<RasterCanvas>, accepted: Vec<String>, output_path: Option<PathBuf>) -> Self {
        let (decode_tx, decode_rx) = channel();
        Self {
            widget,
            texture: None,
            texture_dirty: true,
            accepted,
            decode_tx,
            decode_rx,
            started: false,
            was_hovered: false,
            last_pos: None,
            output_path,
            written: String::new(),
        }
    }

    fn upload(&mut self, ctx: &egui::Context) {
        let extensions: Vec<&str> = self
            .accepted
            .iter()
            .map(|ext| ext.trim_start_matches('.'))
            .collect();
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &extensions)
            .pick_file()
        else {
            return;
        };
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("could not read {}: {err}", path.display());
                return;
            }
        };
        // Rejections are recorded as widget warnings and shown below.
        if let Ok(pending) = self.widget.add_file(&name, &bytes) {
            spawn_decode(pending, self.decode_tx.clone(), ctx.clone());
        }
    }

    fn poll_decodes(&mut self) {
        while let Ok(result) = self.decode_rx.try_recv() {
            match result {
                Ok(decoded) => {
                    if self.widget.complete_decode(decoded) {
                        self.texture_dirty = true;
                    }
                }
                Err(err) => log::warn!("image decode failed: {err}"),
            }
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if !self.texture_dirty && self.texture.is_some() {
            return;
        }
        let pixels = self.widget.canvas().pixels();
        let size = [pixels.width() as usize, pixels.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_flat_samples().as_slice());
        match &mut self.texture {
            Some(tex) => tex.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("annotate-canvas", image, egui::TextureOptions::LINEAR));
            }
        }
        self.texture_dirty = false;
    }

    fn send(&mut self, event: PointerEvent) {
        if self.widget.handle_pointer(event).redraw {
            self.texture_dirty = true;
        }
    }

    /// Turns egui pointer input into widget events, in canvas space.
    fn handle_input(&mut self, ctx: &egui::Context, response: &egui::Response, origin: egui::Pos2) {
        let hovered = response.hovered();
        let pos = response.hover_pos();
        let to_canvas = |p: egui::Pos2| Point::new(p.x - origin.x, p.y - origin.y);

        if let Some(pos) = pos {
            if ctx.input(|i| i.pointer.primary_pressed()) {
                self.send(PointerEvent::Down(to_canvas(pos)));
            }
            if self.last_pos != Some(pos) {
                self.send(PointerEvent::Move(to_canvas(pos)));
            }
        }
        if ctx.input(|i| i.pointer.primary_released()) {
            self.send(PointerEvent::Up);
        }
        if self.was_hovered && !hovered {
            self.send(PointerEvent::Leave);
        }
        if hovered {
            ctx.set_cursor_icon(cursor_icon(self.widget.cursor()));
        }
        self.was_hovered = hovered;
        self.last_pos = pos;
    }

    fn write_output(&mut self) {
        let Some(path) = &self.output_path else {
            return;
        };
        if self.widget.output() == self.written {
            return;
        }
        match std::fs::write(path, self.widget.output()) {
            Ok(()) => self.written = self.widget.output().to_string(),
            Err(err) => log::error!("could not write {}: {err}", path.display()),
        }
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for AnnotateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.started {
            self.started = true;
            if let Some(pending) = self.widget.take_pending_decode() {
                spawn_decode(pending, self.decode_tx.clone(), ctx.clone());
            }
        }
        self.poll_decodes();

        // Type palette
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                if ui.button("Upload image…").clicked() {
                    self.upload(ctx);
                }
                ui.separator();
                let entries: Vec<(String, String)> = self
                    .widget
                    .configs()
                    .iter()
                    .map(|c| (c.kind.clone(), split_label(&c.label).join("\n")))
                    .collect();
                for (kind, text) in entries {
                    let active = self.widget.annotations().iter().any(|a| a.kind == kind);
                    if ui.selectable_label(active, text).clicked() {
                        if let Err(err) = self.widget.toggle(&kind) {
                            log::warn!("{err}");
                        }
                        self.texture_dirty = true;
                    }
                }
            });
        });

        if !self.widget.warnings().is_empty() {
            egui::TopBottomPanel::bottom("warnings").show(ctx, |ui| {
                for warning in self.widget.warnings() {
                    ui.colored_label(egui::Color32::from_rgb(200, 60, 40), warning);
                }
                if ui.button("Dismiss").clicked() {
                    self.widget.take_warnings();
                }
            });
        }

        // Canvas
        egui::CentralPanel::default().show(ctx, |ui| {
            self.ensure_texture(ctx);
            let size = self.widget.canvas_size();
            let (response, painter) =
                ui.allocate_painter(egui::vec2(size.width, size.height), egui::Sense::click_and_drag());
            let canvas_rect = response.rect;

            painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));
            if let Some(ref tex) = self.texture {
                painter.image(
                    tex.id(),
                    canvas_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }

            self.handle_input(ctx, &response, canvas_rect.min);
        });

        self.write_output();
    }
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: rect-annotate <options.json> [output.json]");
        std::process::exit(1);
    }

    let options_path = PathBuf::from(&args[1]);
    let raw = std::fs::read_to_string(&options_path)
        .with_context(|| format!("reading {}", options_path.display()))?;
    let options = WidgetOptions::from_json(&raw)
        .with_context(|| format!("parsing {}", options_path.display()))?;
    let accepted = options.accepted_files.clone();
    let output_path = args.get(2).map(PathBuf::from);

    let canvas = RasterCanvas::new(1, 1).context("loading label font")?;
    let widget = AnnotateWidget::new(options, canvas).context("initializing annotation widget")?;
    let size = widget.canvas_size();

    let title = format!(
        "rect-annotate — {}",
        options_path
            .file_name()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("")
    );

    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([size.width.max(640.0) + 40.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        native,
        Box::new(move |_cc| Ok(Box::new(AnnotateApp::new(widget, accepted, output_path)))),
    )
    .map_err(|err| anyhow!("failed to run eframe: {err}"))
}
