use serde::{Deserialize, Serialize};

use crate::color::{resolve_color, SelectableColor};
use crate::config::{AnnotationConfig, DEFAULT_BORDER_WIDTH, DEFAULT_FONT_SIZE};
use crate::error::{Error, Result};
use crate::geometry::{CanvasSize, Rect};
use crate::resize::{clamp_into, fit_into, MIN_SIZE};

/// The uploaded image, kept as a `data:` URL so it can be written back out
/// verbatim in the saved state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub name: String,
    pub contents: String,
}

/// A placed rectangle.
///
/// Geometry is in canvas space. `kind` is serialized as `type` and is unique
/// within an [`AnnotationSet`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    #[serde(default)]
    pub label: String,
    pub annotation_name: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_border_width")]
    pub border_width: u32,
    #[serde(default = "default_resizable")]
    pub resizable: bool,
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_border_width() -> u32 {
    DEFAULT_BORDER_WIDTH
}

fn default_resizable() -> bool {
    true
}

impl Annotation {
    /// Builds a fresh annotation centered on the canvas, shrunk if the
    /// configured size does not fit.
    pub fn from_config(
        config: &AnnotationConfig,
        palette: &[SelectableColor],
        canvas: CanvasSize,
    ) -> Self {
        let width = (config.rect_width() as f32).min(canvas.width).max(MIN_SIZE);
        let height = (config.rect_height() as f32).min(canvas.height).max(MIN_SIZE);
        let rect = clamp_into(
            Rect::new(
                (canvas.width - width) / 2.0,
                (canvas.height - height) / 2.0,
                width,
                height,
            ),
            canvas,
        );
        Self {
            kind: config.kind.clone(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            color: resolve_color(&config.color, palette),
            label: config.label.clone(),
            annotation_name: config.annotation_name.clone(),
            font_size: config.font_size(),
            border_width: config.border_width(),
            resizable: config.resizable,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }
}

/// Everything needed to rebuild a widget without a re-upload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    #[serde(default)]
    pub files: Vec<ImageRecord>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Ordered annotations with at most one entry per `type`.
///
/// List order is paint order: the last entry is drawn on top.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationSet {
    items: Vec<Annotation>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a set from saved annotations, keeping the first entry of any
    /// repeated `type`.
    pub fn from_saved(saved: &[Annotation]) -> Self {
        let mut set = Self::new();
        for ann in saved {
            if let Err(err) = set.insert(ann.clone()) {
                log::warn!("dropping restored annotation: {err}");
            }
        }
        set
    }

    pub fn insert(&mut self, annotation: Annotation) -> Result<()> {
        if self.contains(&annotation.kind) {
            return Err(Error::DuplicateType(annotation.kind));
        }
        self.items.push(annotation);
        Ok(())
    }

    pub fn remove(&mut self, kind: &str) -> Option<Annotation> {
        let index = self.position(kind)?;
        Some(self.items.remove(index))
    }

    /// Removes the annotation of this type if present, otherwise creates one.
    pub fn toggle(
        &mut self,
        config: &AnnotationConfig,
        palette: &[SelectableColor],
        canvas: CanvasSize,
    ) -> Toggled {
        if self.remove(&config.kind).is_some() {
            return Toggled::Removed;
        }
        self.items
            .push(Annotation::from_config(config, palette, canvas));
        Toggled::Added
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.position(kind).is_some()
    }

    pub fn position(&self, kind: &str) -> Option<usize> {
        self.items.iter().position(|a| a.kind == kind)
    }

    pub fn get(&self, kind: &str) -> Option<&Annotation> {
        self.items.iter().find(|a| a.kind == kind)
    }

    pub fn get_mut(&mut self, kind: &str) -> Option<&mut Annotation> {
        self.items.iter_mut().find(|a| a.kind == kind)
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Moves and shrinks every annotation so it lies inside `canvas`.
    pub fn fit_into(&mut self, canvas: CanvasSize) {
        for annotation in &mut self.items {
            let rect = annotation.rect();
            let fitted = fit_into(rect, canvas);
            if fitted != rect {
                log::debug!("fitted {} into {}x{}", annotation.kind, canvas.width, canvas.height);
                annotation.set_rect(fitted);
            }
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
