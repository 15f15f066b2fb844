//! Store state and derived selectors.
//!
//! Selectors are recomputed on every call; nothing is cached.

use crate::config::{OverlayConfig, OverlayOptions};
use crate::model::comment::{Comment, CommentId, User};
use crate::model::overlay::{CommentVisibility, OverlayState};
use crate::model::status::{has_status, CommentStatus};

/// Process-wide overlay state owned by a `CommentStore`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentState {
    /// Insertion order is render order.
    pub comments: Vec<Comment>,
    pub overlay_state: OverlayState,
    pub focussed_comment: Option<CommentId>,
    pub current_user: Option<User>,
    pub visibility: CommentVisibility,
    pub config: OverlayConfig,
}

impl CommentState {
    /// Builds the initial state; options are expected to be validated.
    pub fn from_options(options: OverlayOptions) -> Self {
        Self {
            comments: options.initial_comments,
            overlay_state: options.initial_state,
            focussed_comment: None,
            current_user: options.current_user,
            visibility: options.config.comment_visibility,
            config: options.config,
        }
    }

    pub fn find(&self, id: &str) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == id)
    }

    /// Focused comment, if it still exists.
    pub fn active_comment(&self) -> Option<&Comment> {
        let id = self.focussed_comment.as_deref()?;
        self.find(id)
    }

    pub fn comments_with_status(&self, status: CommentStatus) -> Vec<Comment> {
        let matches = has_status(status);
        self.comments
            .iter()
            .filter(|comment| matches(comment))
            .cloned()
            .collect()
    }

    pub fn draft_comments(&self) -> Vec<Comment> {
        self.comments_with_status(CommentStatus::Draft)
    }

    /// Published comments only.
    pub fn confirmed_comments(&self) -> Vec<Comment> {
        self.comments_with_status(CommentStatus::Published)
    }

    pub fn resolving_comments(&self) -> Vec<Comment> {
        self.comments_with_status(CommentStatus::Resolving)
    }

    pub fn resolved_comments(&self) -> Vec<Comment> {
        self.comments_with_status(CommentStatus::Resolved)
    }

    pub fn all_comments(&self) -> Vec<Comment> {
        self.comments.clone()
    }

    /// Non-draft comments allowed by the current visibility flags.
    pub fn visible_comments(&self) -> Vec<Comment> {
        self.comments
            .iter()
            .filter(|comment| match comment.status {
                CommentStatus::Draft => false,
                CommentStatus::Published => true,
                CommentStatus::Resolving => self.visibility.show_resolving,
                CommentStatus::Resolved => self.visibility.show_resolved,
            })
            .cloned()
            .collect()
    }
}

impl Default for CommentState {
    fn default() -> Self {
        Self::from_options(OverlayOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::CommentState;
    use crate::model::comment::{Comment, Position};
    use crate::model::status::CommentStatus;

    fn comment(id: &str, status: CommentStatus) -> Comment {
        let mut comment = Comment::published(id, Position::default(), id, None);
        comment.status = status;
        comment
    }

    fn mixed_state() -> CommentState {
        CommentState {
            comments: vec![
                comment("d", CommentStatus::Draft),
                comment("p", CommentStatus::Published),
                comment("g", CommentStatus::Resolving),
                comment("r", CommentStatus::Resolved),
            ],
            ..CommentState::default()
        }
    }

    #[test]
    fn selectors_partition_by_status() {
        let state = mixed_state();
        assert_eq!(state.draft_comments()[0].id, "d");
        assert_eq!(state.confirmed_comments()[0].id, "p");
        assert_eq!(state.resolving_comments()[0].id, "g");
        assert_eq!(state.resolved_comments()[0].id, "r");
        assert_eq!(state.all_comments().len(), 4);
    }

    #[test]
    fn visible_comments_follow_visibility_flags() {
        let mut state = mixed_state();
        let ids: Vec<_> = state
            .visible_comments()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["p", "g"]);

        state.visibility.show_resolved = true;
        state.visibility.show_resolving = false;
        let ids: Vec<_> = state
            .visible_comments()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["p", "r"]);
    }

    #[test]
    fn active_comment_ignores_stale_focus() {
        let mut state = mixed_state();
        state.focussed_comment = Some("missing".to_string());
        assert!(state.active_comment().is_none());
        state.focussed_comment = Some("p".to_string());
        assert_eq!(state.active_comment().map(|c| c.id.as_str()), Some("p"));
    }
}
