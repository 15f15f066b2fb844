//! Per-comment editing scope.
//!
//! # Responsibility
//! - Hold the draft text of one rendered comment outside the shared store.
//! - Gate confirm/resolve/delete actions for that comment.
//!
//! # Invariants
//! - The draft is never written to the store except by `confirm`, which only
//!   merges `content`.
//! - Resolve toggling is only offered for published or resolving comments.

use crate::config::IndicatorVisibility;
use crate::geometry::SelectionRect;
use crate::model::comment::{Comment, CommentId};
use crate::model::status::CommentStatus;
use crate::store::handle::CommentStore;
use log::error;

/// Ephemeral state owned by one rendered comment.
pub struct CommentScope {
    store: CommentStore,
    comment: Comment,
    draft: String,
}

impl CommentScope {
    /// Opens a scope; the draft starts from `default_draft` or the content.
    pub fn new(store: &CommentStore, comment: Comment, default_draft: Option<&str>) -> Self {
        let draft = default_draft
            .map(str::to_string)
            .unwrap_or_else(|| comment.content.clone());
        Self {
            store: store.clone(),
            comment,
            draft,
        }
    }

    pub fn comment(&self) -> &Comment {
        &self.comment
    }

    pub fn id(&self) -> &CommentId {
        &self.comment.id
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Whether this comment is the store's focused comment.
    pub fn is_active(&self) -> bool {
        self.store
            .read(|state| state.focussed_comment.as_deref() == Some(self.comment.id.as_str()))
    }

    pub fn focus(&self) {
        self.store.focus_on_comment(Some(self.comment.id.as_str()));
    }

    pub fn can_confirm(&self) -> bool {
        !self.draft.is_empty()
    }

    /// Writes the draft into the store as the comment's content.
    ///
    /// Returns `false` and changes nothing while the draft is empty.
    pub fn confirm(&mut self) -> bool {
        if !self.can_confirm() {
            return false;
        }
        self.store
            .update_comment(self.comment.id.as_str(), self.draft.clone());
        self.comment.content = self.draft.clone();
        true
    }

    pub fn delete(self) {
        self.store.delete_comment(self.comment.id.as_str());
    }

    pub fn can_toggle_resolving(&self) -> bool {
        match self.comment.status {
            CommentStatus::Published | CommentStatus::Resolving => true,
            CommentStatus::Draft | CommentStatus::Resolved => {
                error!(
                    "event=resolve_guard module=scope status=error comment_status={}",
                    self.comment.status
                );
                false
            }
        }
    }

    pub fn toggle_resolving(&mut self) -> bool {
        if !self.can_toggle_resolving() {
            return false;
        }
        let toggled = self
            .store
            .toggle_resolving_comment(self.comment.id.as_str());
        if toggled {
            if let Some(next) = self.comment.status.toggled_resolving() {
                self.comment.status = next;
            }
        }
        toggled
    }

    pub fn show_indicator(&self) -> bool {
        if self.comment.indicator.is_none() {
            return false;
        }
        match self.store.read(|state| state.config.indicator_visibility) {
            IndicatorVisibility::Always => true,
            IndicatorVisibility::Active => self.is_active(),
        }
    }

    /// Indicator box relative to the comment anchor.
    ///
    /// The anchor is the selection's bottom-right corner, so the box extends
    /// up and to the left.
    pub fn indicator_frame(&self) -> Option<SelectionRect> {
        self.comment.indicator.map(|indicator| SelectionRect {
            x: -indicator.width,
            y: -indicator.height,
            width: indicator.width,
            height: indicator.height,
        })
    }
}
