//! Rectangle annotation widget: place, drag and resize labelled regions on an
//! uploaded image and serialize the result for a host form.

pub mod canvas;
pub mod color;
pub mod config;
pub mod decode;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod model;
pub mod render;
pub mod resize;
pub mod serialize;
pub mod submission;
pub mod text;
pub mod widget;

pub use canvas::{Canvas, RasterCanvas};
pub use config::{AnnotationConfig, WidgetOptions};
pub use error::{Error, Result};
pub use interaction::{CursorHint, EventResponse, InteractionState, PointerEvent};
pub use model::{Annotation, ImageRecord, SavedState};
pub use serialize::Snapshot;
pub use submission::ParsedSubmission;
pub use widget::AnnotateWidget;
