//! Store action set.

use crate::model::comment::{Comment, CommentId, CommentPatch, Indicator, Position};
use crate::model::overlay::{OverlayState, VisibilityPatch};

/// Every mutation the reducer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentAction {
    /// Append a new draft at `position`, optionally with an indicator box.
    Register {
        position: Position,
        indicator: Option<Indicator>,
    },
    /// Replace all comments with an external snapshot.
    UpdateComments(Vec<Comment>),
    Delete(CommentId),
    Edit {
        id: CommentId,
        patch: CommentPatch,
    },
    Focus(Option<CommentId>),
    ToggleOverlay,
    ChangeOverlayState(OverlayState),
    UpdateVisibility(VisibilityPatch),
    ResetDraftComments,
    ResetResolvingComments,
    /// Action type not recognized at an untyped boundary.
    Unknown(String),
}

impl CommentAction {
    /// Stable action name used in log events.
    pub fn kind(&self) -> &str {
        match self {
            Self::Register { .. } => "register",
            Self::UpdateComments(_) => "update_comments",
            Self::Delete(_) => "delete",
            Self::Edit { .. } => "edit",
            Self::Focus(_) => "focus",
            Self::ToggleOverlay => "toggle_overlay",
            Self::ChangeOverlayState(_) => "change_overlay_state",
            Self::UpdateVisibility(_) => "update_visibility",
            Self::ResetDraftComments => "reset_draft_comments",
            Self::ResetResolvingComments => "reset_resolving_comments",
            Self::Unknown(kind) => kind.as_str(),
        }
    }
}
