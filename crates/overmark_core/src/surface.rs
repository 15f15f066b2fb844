//! Overlay interaction surface.
//!
//! # Responsibility
//! - Classify raw pointer gestures as clicks or drag-selections.
//! - Register comments (and indicator boxes) in the store.
//! - Own the transient selection preview and click-catcher rules.
//!
//! # Invariants
//! - Only one comment is composed at a time: pointer-down while editing,
//!   saving or resolving is refused without touching the store.
//! - One pointer drives a gesture; events from other pointers are ignored.
//! - The preview rectangle is cleared on every pointer-up.
//! - A `Placement` is only returned for a draft the store actually created.
//! - Drag selections anchor their comment at the bottom-right corner.

use crate::geometry::{movement, normalize_rect, relative_position, ContentBounds, SelectionRect};
use crate::model::comment::{Comment, CommentId, Indicator, Position};
use crate::model::overlay::OverlayState;
use crate::store::handle::CommentStore;
use log::{debug, warn};
use std::fmt::{Display, Formatter};

/// Minimum pointer travel (px) that turns a press into a drag.
pub const DRAG_THRESHOLD: f64 = 4.0;

/// Raw pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: i64,
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerEvent {
    pub fn new(pointer_id: i64, client_x: f64, client_y: f64) -> Self {
        Self {
            pointer_id,
            client_x,
            client_y,
        }
    }
}

/// Blocking warning shown to the user instead of starting a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureWarning {
    EditingInProgress,
    CommitInProgress,
}

impl GestureWarning {
    pub fn message(self) -> &'static str {
        match self {
            Self::EditingInProgress => {
                "Can not add a new comment. You are currently editing a comment. \
                 Please finish editing before adding a new one."
            }
            Self::CommitInProgress => {
                "Can not add a new comment while comments are being saved or resolved."
            }
        }
    }
}

impl Display for GestureWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDown {
    /// Gesture started; the host should capture this pointer.
    Captured(i64),
    /// Gesture refused; show the warning.
    Blocked(GestureWarning),
    /// Overlay inactive; the event belongs to the content.
    Ignored,
}

/// Draft created on pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub id: CommentId,
    pub position: Position,
    pub indicator: Option<Indicator>,
}

/// What presentation collaborators should draw for the current state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderLayers {
    /// `false` when the overlay is inactive; only content is shown then.
    pub overlay_visible: bool,
    pub draft_comments: Vec<Comment>,
    pub comments: Vec<Comment>,
    pub preview: Option<SelectionRect>,
    /// Full-surface guard below the active comment.
    pub click_catcher: bool,
    /// Content pointer events pass through while editing.
    pub pointer_events_disabled: bool,
}

/// Pointer gesture state machine: `idle -> down -> move* -> up`.
#[derive(Debug, Clone)]
pub struct OverlaySurface {
    drag_threshold: f64,
    pointer_id: Option<i64>,
    start: Option<Position>,
    dragging: bool,
    preview: Option<SelectionRect>,
}

impl Default for OverlaySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlaySurface {
    pub fn new() -> Self {
        Self::with_threshold(DRAG_THRESHOLD)
    }

    pub fn with_threshold(drag_threshold: f64) -> Self {
        Self {
            drag_threshold,
            pointer_id: None,
            start: None,
            dragging: false,
            preview: None,
        }
    }

    pub fn drag_threshold(&self) -> f64 {
        self.drag_threshold
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Live selection rectangle while dragging.
    pub fn preview(&self) -> Option<SelectionRect> {
        self.preview
    }

    pub fn pointer_down(
        &mut self,
        store: &CommentStore,
        event: PointerEvent,
        bounds: &ContentBounds,
    ) -> PointerDown {
        if self.start.is_some() && !self.tracks(event) {
            debug!("event=pointer_down module=surface status=skip reason=foreign_pointer");
            return PointerDown::Ignored;
        }
        match store.overlay_state() {
            OverlayState::Editing => {
                warn!("event=pointer_down module=surface status=skip reason=editing");
                return PointerDown::Blocked(GestureWarning::EditingInProgress);
            }
            state if state.is_transitional() => {
                warn!("event=pointer_down module=surface status=skip overlay_state={state}");
                return PointerDown::Blocked(GestureWarning::CommitInProgress);
            }
            OverlayState::Inactive => return PointerDown::Ignored,
            _ => {}
        }

        self.pointer_id = Some(event.pointer_id);
        self.start = Some(relative_position(event.client_x, event.client_y, bounds));
        self.dragging = false;
        self.preview = None;
        PointerDown::Captured(event.pointer_id)
    }

    /// Updates drag state; returns the preview rectangle when dragging.
    pub fn pointer_move(
        &mut self,
        event: PointerEvent,
        bounds: &ContentBounds,
    ) -> Option<SelectionRect> {
        if !self.tracks(event) {
            return None;
        }
        let start = self.start?;
        let current = relative_position(event.client_x, event.client_y, bounds);

        if !self.dragging && movement(start, current) >= self.drag_threshold {
            self.dragging = true;
            debug!("event=drag_start module=surface status=ok");
        }
        if self.dragging {
            self.preview = Some(normalize_rect(start, current));
        }
        self.preview
    }

    /// Finishes the gesture and registers a comment.
    ///
    /// Returns `None` when no gesture was in progress, the event belongs to
    /// another pointer, the overlay was deactivated, or the store refused
    /// the register.
    pub fn pointer_up(
        &mut self,
        store: &CommentStore,
        event: PointerEvent,
        bounds: &ContentBounds,
    ) -> Option<Placement> {
        if !self.tracks(event) {
            return None;
        }
        let start = self.start?;
        let end = relative_position(event.client_x, event.client_y, bounds);
        let was_dragging = self.dragging;
        self.cancel();

        if store.overlay_state() == OverlayState::Inactive {
            debug!("event=pointer_up module=surface status=skip reason=inactive");
            return None;
        }

        let (position, indicator) = if !was_dragging {
            (start, None)
        } else {
            let rect = normalize_rect(start, end);
            if rect.is_smaller_than(self.drag_threshold) {
                (start, None)
            } else {
                (rect.bottom_right(), Some(rect.indicator()))
            }
        };

        let Some(id) = store.register_comment(position, indicator) else {
            warn!("event=pointer_up module=surface status=skip reason=register_refused");
            return None;
        };
        debug!(
            "event=pointer_up module=surface status=ok indicator={}",
            indicator.is_some()
        );
        Some(Placement {
            id,
            position,
            indicator,
        })
    }

    /// Drops an in-progress gesture without registering anything.
    pub fn cancel(&mut self) {
        self.pointer_id = None;
        self.start = None;
        self.dragging = false;
        self.preview = None;
    }

    fn tracks(&self, event: PointerEvent) -> bool {
        self.pointer_id.map_or(true, |id| id == event.pointer_id)
    }

    pub fn show_click_catcher(&self, store: &CommentStore) -> bool {
        store.active_comment().is_some()
    }

    /// Click on the guard: defocus and return to idle.
    pub fn dismiss_click_catcher(&self, store: &CommentStore) {
        store.focus_on_comment(None);
        store.change_overlay_state(OverlayState::Idle);
    }

    pub fn render_layers(&self, store: &CommentStore) -> RenderLayers {
        store.read(|state| {
            if state.overlay_state == OverlayState::Inactive {
                return RenderLayers::default();
            }
            RenderLayers {
                overlay_visible: true,
                draft_comments: state.draft_comments(),
                comments: state.confirmed_comments(),
                preview: self.preview,
                click_catcher: state.active_comment().is_some(),
                pointer_events_disabled: state.overlay_state == OverlayState::Editing,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::OverlaySurface;
    use crate::geometry::ContentBounds;
    use crate::surface::PointerEvent;

    #[test]
    fn move_without_down_is_ignored() {
        let mut surface = OverlaySurface::new();
        let preview = surface.pointer_move(
            PointerEvent::new(1, 40.0, 40.0),
            &ContentBounds::origin(100.0, 100.0),
        );
        assert!(preview.is_none());
        assert!(!surface.is_dragging());
    }

    #[test]
    fn cancel_clears_gesture() {
        let mut surface = OverlaySurface::with_threshold(2.0);
        surface.cancel();
        assert!(surface.preview().is_none());
        assert_eq!(surface.drag_threshold(), 2.0);
    }
}
