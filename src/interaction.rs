//! Pointer handling as an explicit state machine.
//!
//! The state is a value passed in and returned by [`handle_event`]; the
//! annotation being moved is named by its `type`, which is unique in the set.

use crate::geometry::{hit_test, resize_direction, CanvasSize, Point, ResizeDirection};
use crate::model::AnnotationSet;
use crate::resize::{apply_resize, drag_to};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging {
        target: String,
        offset: Point,
    },
    Resizing {
        target: String,
        direction: ResizeDirection,
    },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Dragging { target, .. } | InteractionState::Resizing { target, .. } => {
                Some(target)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Leave,
    /// The platform's own drag gesture starting on the canvas.
    NativeDragStart,
}

/// Hover affordance; carries no behavior of its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorHint {
    #[default]
    Default,
    Move,
    Resize(ResizeDirection),
}

impl CursorHint {
    pub fn css_name(&self) -> &'static str {
        match self {
            CursorHint::Default => "default",
            CursorHint::Move => "move",
            CursorHint::Resize(dir) => dir.cursor_name(),
        }
    }
}

/// What the caller must do after an event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EventResponse {
    pub redraw: bool,
    pub persist: bool,
    /// Set when the hover cursor should change.
    pub cursor: Option<CursorHint>,
    /// The platform default for this event must be suppressed.
    pub prevent_default: bool,
}

impl EventResponse {
    fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }
}

/// Advances the state machine by one pointer event, mutating `annotations`
/// as needed.
pub fn handle_event<F>(
    state: InteractionState,
    event: PointerEvent,
    annotations: &mut AnnotationSet,
    canvas: CanvasSize,
    measure: F,
) -> (InteractionState, EventResponse)
where
    F: Fn(&str, u32) -> f32,
{
    match event {
        PointerEvent::Down(p) => {
            let Some(index) = hit_test(p, annotations.as_slice(), &measure) else {
                return (state, EventResponse::default());
            };
            let hit = &annotations.as_slice()[index];
            let target = hit.kind.clone();
            if let Some(direction) = resize_direction(&hit.rect(), p).filter(|_| hit.resizable) {
                log::debug!("resize {target} from {}", direction.as_str());
                return (
                    InteractionState::Resizing { target, direction },
                    EventResponse::default(),
                );
            }
            let offset = p - Point::new(hit.x, hit.y);
            log::debug!("drag {target}");
            (
                InteractionState::Dragging { target, offset },
                EventResponse::redraw(),
            )
        }
        PointerEvent::Move(p) => {
            if state.is_idle() {
                let cursor = hover_cursor(p, annotations, &measure);
                let response = EventResponse {
                    cursor: Some(cursor),
                    ..EventResponse::default()
                };
                return (state, response);
            }
            let applied = match &state {
                InteractionState::Dragging { target, offset } => annotations
                    .get_mut(target)
                    .map(|ann| drag_to(ann, p, *offset, canvas)),
                InteractionState::Resizing { target, direction } => annotations
                    .get_mut(target)
                    .map(|ann| apply_resize(ann, *direction, p, canvas)),
                InteractionState::Idle => None,
            };
            match applied {
                Some(()) => (state, EventResponse::redraw()),
                // target was toggled away mid-gesture
                None => (InteractionState::Idle, EventResponse::default()),
            }
        }
        PointerEvent::Up | PointerEvent::Leave => {
            let persist = !state.is_idle();
            (
                InteractionState::Idle,
                EventResponse {
                    persist,
                    ..EventResponse::default()
                },
            )
        }
        PointerEvent::NativeDragStart => (
            state,
            EventResponse {
                prevent_default: true,
                ..EventResponse::default()
            },
        ),
    }
}

fn hover_cursor<F>(p: Point, annotations: &AnnotationSet, measure: F) -> CursorHint
where
    F: Fn(&str, u32) -> f32,
{
    let Some(index) = hit_test(p, annotations.as_slice(), measure) else {
        return CursorHint::Default;
    };
    let hovered = &annotations.as_slice()[index];
    match resize_direction(&hovered.rect(), p) {
        Some(dir) => CursorHint::Resize(dir),
        None => CursorHint::Move,
    }
}
