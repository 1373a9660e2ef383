use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use crate::canvas::Canvas;
use crate::config::{AnnotationConfig, WidgetOptions};
use crate::decode::{DecodeOrigin, DecodedImage, PendingDecode};
use crate::error::{Error, Result};
use crate::geometry::CanvasSize;
use crate::interaction::{handle_event, CursorHint, EventResponse, InteractionState, PointerEvent};
use crate::model::{Annotation, AnnotationSet, ImageRecord, SavedState, Toggled};
use crate::render::render;
use crate::serialize::snapshot;

/// One annotation widget: the image, its annotations, the pointer state and
/// the serialized output, all driven from a single thread.
pub struct AnnotateWidget<C: Canvas> {
    options: WidgetOptions,
    canvas: C,
    files: Vec<ImageRecord>,
    annotations: AnnotationSet,
    interaction: InteractionState,
    /// Base image already scaled to the canvas size.
    base: Option<RgbaImage>,
    generation: u64,
    pending: Option<PendingDecode>,
    cursor: CursorHint,
    warnings: Vec<String>,
    output: String,
}

impl<C: Canvas> AnnotateWidget<C> {
    /// Builds a widget, restoring any saved session carried by `options`.
    ///
    /// Duplicate type keys or output names abort construction.
    pub fn new(options: WidgetOptions, mut canvas: C) -> Result<Self> {
        options.validate()?;
        canvas.resize(options.canvas_width(), options.canvas_height());
        log::info!(
            "annotation canvas {}x{}, {} annotation types",
            options.canvas_width(),
            options.canvas_height(),
            options.configs().len()
        );

        let saved = options.saved_state().cloned().unwrap_or_default();
        let pending = saved
            .files
            .first()
            .cloned()
            .map(|record| PendingDecode::restore(0, record));

        Ok(Self {
            annotations: AnnotationSet::from_saved(&saved.annotations),
            files: saved.files,
            options,
            canvas,
            interaction: InteractionState::Idle,
            base: None,
            generation: 0,
            pending,
            cursor: CursorHint::Default,
            warnings: Vec::new(),
            output: String::new(),
        })
    }

    /// The decode queued by a restored session, if any.
    pub fn take_pending_decode(&mut self) -> Option<PendingDecode> {
        self.pending.take()
    }

    /// Accepts an uploaded file and returns the decode to run for it.
    ///
    /// Unsupported extensions leave the widget untouched and add a warning.
    pub fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<PendingDecode> {
        if !self.options.is_accepted(name) {
            let err = Error::UnsupportedFile(name.to_string());
            log::warn!("rejected upload: {err}");
            self.warnings.push(err.to_string());
            return Err(err);
        }
        self.generation += 1;
        self.pending = None;
        log::info!("accepted upload {name} ({} bytes)", bytes.len());
        Ok(PendingDecode::upload(self.generation, name, bytes))
    }

    /// Applies a finished decode. Returns `false` if a newer upload made it
    /// stale.
    pub fn complete_decode(&mut self, decoded: DecodedImage) -> bool {
        if decoded.ticket.generation != self.generation {
            log::debug!(
                "discarding stale decode of {} (generation {} != {})",
                decoded.record.name,
                decoded.ticket.generation,
                self.generation
            );
            return false;
        }

        let width = self.options.canvas_width();
        let height = scaled_height(&decoded.image, width);
        self.canvas.resize(width, height);
        self.base = Some(
            decoded
                .image
                .resize_exact(width, height, FilterType::Triangle)
                .to_rgba8(),
        );

        if decoded.origin == DecodeOrigin::Upload {
            self.files = vec![decoded.record];
            self.annotations.clear();
            self.interaction = InteractionState::Idle;
        } else {
            self.annotations.fit_into(self.canvas.size());
        }
        self.render();
        true
    }

    /// Adds the annotation of this type, or removes it if it already exists.
    pub fn toggle(&mut self, kind: &str) -> Result<Toggled> {
        let config = self
            .config(kind)
            .cloned()
            .ok_or_else(|| Error::UnknownType(kind.to_string()))?;
        let size = self.canvas.size();
        if self.interaction.target() == Some(kind) {
            self.interaction = InteractionState::Idle;
        }
        let toggled = self
            .annotations
            .toggle(&config, &self.options.selectable_colors, size);
        log::debug!("toggled {kind}: {toggled:?}");
        if self.has_image() {
            self.render();
        } else {
            self.save_logged();
        }
        Ok(toggled)
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> EventResponse {
        let state = std::mem::take(&mut self.interaction);
        let size = self.canvas.size();
        let canvas = &self.canvas;
        let (next, response) = handle_event(
            state,
            event,
            &mut self.annotations,
            size,
            |text, font_size| canvas.measure_text(text, font_size),
        );
        self.interaction = next;
        if let Some(cursor) = response.cursor {
            self.cursor = cursor;
        }
        if response.redraw {
            self.render();
        }
        if response.persist {
            self.save_logged();
        }
        response
    }

    /// Redraws everything and refreshes the output. Does nothing until an
    /// image has been decoded.
    pub fn render(&mut self) {
        let Some(base) = &self.base else {
            return;
        };
        render(&mut self.canvas, base, self.annotations.as_slice());
        self.save_logged();
    }

    /// Serializes the current state into the output field.
    pub fn save(&mut self) -> Result<()> {
        let snap = snapshot(
            &self.canvas,
            self.base.as_ref(),
            &self.files,
            self.annotations.as_slice(),
        )?;
        self.output = snap.to_json()?;
        Ok(())
    }

    fn save_logged(&mut self) {
        if let Err(err) = self.save() {
            log::error!("failed to serialize annotations: {err}");
        }
    }

    pub fn config(&self, kind: &str) -> Option<&AnnotationConfig> {
        self.options.configs().iter().find(|c| c.kind == kind)
    }

    pub fn configs(&self) -> &[AnnotationConfig] {
        self.options.configs()
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.annotations.as_slice()
    }

    pub fn files(&self) -> &[ImageRecord] {
        &self.files
    }

    pub fn saved_state(&self) -> SavedState {
        SavedState {
            files: self.files.clone(),
            annotations: self.annotations.as_slice().to_vec(),
        }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas.size()
    }

    pub fn has_image(&self) -> bool {
        self.base.is_some()
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// The serialized snapshot, empty until the first save.
    pub fn output(&self) -> &str {
        &self.output
    }
}

/// Canvas height that keeps the image's aspect ratio at `width`.
fn scaled_height(image: &DynamicImage, width: u32) -> u32 {
    if image.width() == 0 {
        return 1;
    }
    let height = image.height() as f32 / image.width() as f32 * width as f32;
    (height.trunc() as u32).max(1)
}
