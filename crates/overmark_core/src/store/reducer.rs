//! Pure state transition function.
//!
//! # Invariants
//! - `reduce` is total: every action yields a complete new state.
//! - `Register` while editing, saving or resolving is refused; only one
//!   comment is composed at a time and commits see a stable draft set.
//! - `ToggleOverlay` only flips `inactive <-> idle`.

use crate::model::comment::Comment;
use crate::model::overlay::OverlayState;
use crate::model::status::CommentStatus;
use crate::store::action::CommentAction;
use crate::store::state::CommentState;
use log::{debug, warn};

/// Applies `action` to `state`, returning the next state.
pub fn reduce(state: &CommentState, action: CommentAction) -> CommentState {
    let kind = action.kind().to_string();
    let mut next = state.clone();

    match action {
        CommentAction::Register {
            position,
            indicator,
        } => {
            if state.overlay_state == OverlayState::Editing
                || state.overlay_state.is_transitional()
            {
                warn!(
                    "event=reduce module=store action={kind} status=skip overlay_state={}",
                    state.overlay_state
                );
                return next;
            }
            let comment = Comment::draft(
                state.config.effective_id_prefix(),
                position,
                indicator,
                state.current_user.clone(),
            );
            next.focussed_comment = Some(comment.id.clone());
            next.overlay_state = OverlayState::Editing;
            next.comments.push(comment);
        }
        CommentAction::UpdateComments(comments) => {
            next.comments = comments;
        }
        CommentAction::Delete(id) => {
            next.comments.retain(|comment| comment.id != id);
            next.overlay_state = OverlayState::Idle;
            next.focussed_comment = None;
        }
        CommentAction::Edit { id, patch } => {
            if let Some(comment) = next.comments.iter_mut().find(|comment| comment.id == id) {
                comment.apply(&patch);
            }
            next.overlay_state = OverlayState::Idle;
            next.focussed_comment = None;
        }
        CommentAction::Focus(id) => {
            if id.is_some() {
                next.overlay_state = OverlayState::Editing;
            }
            next.focussed_comment = id;
        }
        CommentAction::ToggleOverlay => {
            next.overlay_state = match state.overlay_state {
                OverlayState::Inactive => OverlayState::Idle,
                OverlayState::Idle => OverlayState::Inactive,
                other => {
                    debug!(
                        "event=reduce module=store action={kind} status=skip overlay_state={other}"
                    );
                    other
                }
            };
        }
        CommentAction::ChangeOverlayState(to) => {
            next.overlay_state = to;
        }
        CommentAction::UpdateVisibility(patch) => {
            next.visibility.merge(patch);
        }
        CommentAction::ResetDraftComments => {
            next.comments
                .retain(|comment| comment.status != CommentStatus::Draft);
            next.focussed_comment = None;
        }
        CommentAction::ResetResolvingComments => {
            next.comments
                .retain(|comment| comment.status != CommentStatus::Resolving);
            next.focussed_comment = None;
        }
        CommentAction::Unknown(_) => {
            warn!("event=reduce module=store action={kind} status=skip reason=unhandled_action");
            return next;
        }
    }

    debug!(
        "event=reduce module=store action={kind} status=ok overlay_state={} comments={}",
        next.overlay_state,
        next.comments.len()
    );
    next
}

#[cfg(test)]
mod tests {
    use super::reduce;
    use crate::model::comment::{Comment, CommentPatch, Position};
    use crate::model::overlay::OverlayState;
    use crate::model::status::CommentStatus;
    use crate::store::action::CommentAction;
    use crate::store::state::CommentState;

    #[test]
    fn register_appends_focused_draft() {
        let state = CommentState {
            overlay_state: OverlayState::Idle,
            ..CommentState::default()
        };
        let next = reduce(
            &state,
            CommentAction::Register {
                position: Position::new(3.0, 4.0),
                indicator: None,
            },
        );
        assert_eq!(next.comments.len(), 1);
        let created = &next.comments[0];
        assert_eq!(created.status, CommentStatus::Draft);
        assert_eq!(next.focussed_comment.as_deref(), Some(created.id.as_str()));
        assert_eq!(next.overlay_state, OverlayState::Editing);
        assert!(state.comments.is_empty());
    }

    #[test]
    fn register_during_commit_is_refused() {
        for overlay_state in [OverlayState::Saving, OverlayState::Resolving] {
            let state = CommentState {
                overlay_state,
                ..CommentState::default()
            };
            let next = reduce(
                &state,
                CommentAction::Register {
                    position: Position::new(1.0, 1.0),
                    indicator: None,
                },
            );
            assert_eq!(next, state);
        }
    }

    #[test]
    fn unknown_action_is_a_no_op() {
        let state = CommentState::default();
        let next = reduce(&state, CommentAction::Unknown("EXPLODE".to_string()));
        assert_eq!(next, state);
    }

    #[test]
    fn edit_of_missing_id_still_resets_focus() {
        let state = CommentState {
            comments: vec![Comment::published("a", Position::default(), "x", None)],
            overlay_state: OverlayState::Editing,
            focussed_comment: Some("a".to_string()),
            ..CommentState::default()
        };
        let next = reduce(
            &state,
            CommentAction::Edit {
                id: "zzz".to_string(),
                patch: CommentPatch::content("nope"),
            },
        );
        assert_eq!(next.comments, state.comments);
        assert_eq!(next.overlay_state, OverlayState::Idle);
        assert!(next.focussed_comment.is_none());
    }

    #[test]
    fn focus_none_keeps_overlay_state() {
        let state = CommentState {
            overlay_state: OverlayState::Editing,
            focussed_comment: Some("a".to_string()),
            ..CommentState::default()
        };
        let next = reduce(&state, CommentAction::Focus(None));
        assert!(next.focussed_comment.is_none());
        assert_eq!(next.overlay_state, OverlayState::Editing);
    }
}
