//! Shared store handle.
//!
//! # Responsibility
//! - Give presentation code a narrow read/dispatch interface over one state.
//! - Expose the imperative actions of the rendering contract.
//! - Run confirm/resolve flows against `CommentPersistence`.
//!
//! # Invariants
//! - Every mutation goes through `reduce` under the write lock.
//! - The lock is never held across an `.await`.
//! - Confirm/resolve never mutate local statuses; success removes the
//!   pre-transition copies, failure keeps them.

use crate::config::{OptionsError, OverlayConfig, OverlayOptions};
use crate::errors::{CallbackError, OverlayError, OverlayErrorKind};
use crate::model::comment::{Comment, CommentId, CommentPatch, Indicator, Position, User};
use crate::model::overlay::{CommentVisibility, OverlayState, VisibilityPatch};
use crate::model::status::CommentStatus;
use crate::store::action::CommentAction;
use crate::store::reducer::reduce;
use crate::store::state::CommentState;
use crate::subscription::{CommentSource, SubscriptionGuard};
use crate::tx::{execute_async, TransitionGuard, TxResult};
use log::{error, info};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Future returned by persistence callbacks.
pub type CommitFuture = Pin<Box<dyn Future<Output = Result<(), CallbackError>> + Send + 'static>>;

/// Outbound persistence collaborator.
///
/// The core never assumes a write succeeded; it only reacts to the returned
/// result.
pub trait CommentPersistence: Send + Sync {
    /// Receives all drafts re-tagged as `published`.
    fn on_confirm(&self, comments: Vec<Comment>) -> CommitFuture;

    /// Receives all resolving comments re-tagged as `resolved`.
    fn on_resolve(&self, comments: Vec<Comment>) -> CommitFuture;

    /// Called once per failed confirm/resolve.
    fn on_error(&self, _error: &OverlayError) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommitKind {
    Confirm,
    Resolve,
}

impl CommitKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Resolve => "resolve",
        }
    }

    fn transitional_state(self) -> OverlayState {
        match self {
            Self::Confirm => OverlayState::Saving,
            Self::Resolve => OverlayState::Resolving,
        }
    }

    fn source_status(self) -> CommentStatus {
        match self {
            Self::Confirm => CommentStatus::Draft,
            Self::Resolve => CommentStatus::Resolving,
        }
    }

    fn target_status(self) -> CommentStatus {
        match self {
            Self::Confirm => CommentStatus::Published,
            Self::Resolve => CommentStatus::Resolved,
        }
    }

    fn error_kind(self) -> OverlayErrorKind {
        match self {
            Self::Confirm => OverlayErrorKind::Confirm,
            Self::Resolve => OverlayErrorKind::Resolve,
        }
    }

    fn reset_action(self) -> CommentAction {
        match self {
            Self::Confirm => CommentAction::ResetDraftComments,
            Self::Resolve => CommentAction::ResetResolvingComments,
        }
    }
}

/// Cloneable handle to one overlay's state.
///
/// Clones share the same state; the handle is passed explicitly to whatever
/// needs to read or mutate comments.
#[derive(Clone)]
pub struct CommentStore {
    state: Arc<RwLock<CommentState>>,
    persistence: Arc<dyn CommentPersistence>,
}

impl CommentStore {
    /// Creates a store from validated initialization input.
    ///
    /// # Errors
    /// - Returns an error when the config is invalid.
    /// - Returns an error when an initial comment is not published/resolved.
    pub fn new(
        options: OverlayOptions,
        persistence: Arc<dyn CommentPersistence>,
    ) -> Result<Self, OptionsError> {
        options.validate()?;
        info!(
            "event=store_init module=store status=ok comments={} overlay_state={}",
            options.initial_comments.len(),
            options.initial_state
        );
        Ok(Self {
            state: Arc::new(RwLock::new(CommentState::from_options(options))),
            persistence,
        })
    }

    /// Applies one action atomically.
    pub fn dispatch(&self, action: CommentAction) {
        apply(&self.state, action);
    }

    /// Runs `f` against the current state under the read lock.
    pub fn read<T>(&self, f: impl FnOnce(&CommentState) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Returns a full copy of the current state.
    pub fn snapshot(&self) -> CommentState {
        self.read(CommentState::clone)
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.read(|state| state.overlay_state)
    }

    pub fn focussed_comment(&self) -> Option<CommentId> {
        self.read(|state| state.focussed_comment.clone())
    }

    pub fn current_user(&self) -> Option<User> {
        self.read(|state| state.current_user.clone())
    }

    pub fn comment_visibility(&self) -> CommentVisibility {
        self.read(|state| state.visibility)
    }

    pub fn config(&self) -> OverlayConfig {
        self.read(|state| state.config.clone())
    }

    pub fn find_comment(&self, id: &str) -> Option<Comment> {
        self.read(|state| state.find(id).cloned())
    }

    pub fn active_comment(&self) -> Option<Comment> {
        self.read(|state| state.active_comment().cloned())
    }

    pub fn draft_comments(&self) -> Vec<Comment> {
        self.read(CommentState::draft_comments)
    }

    pub fn confirmed_comments(&self) -> Vec<Comment> {
        self.read(CommentState::confirmed_comments)
    }

    pub fn resolving_comments(&self) -> Vec<Comment> {
        self.read(CommentState::resolving_comments)
    }

    pub fn resolved_comments(&self) -> Vec<Comment> {
        self.read(CommentState::resolved_comments)
    }

    pub fn all_comments(&self) -> Vec<Comment> {
        self.read(CommentState::all_comments)
    }

    pub fn visible_comments(&self) -> Vec<Comment> {
        self.read(CommentState::visible_comments)
    }

    /// Registers a draft at `position`; returns its id.
    ///
    /// Returns `None` when the reducer refused the register (editing, saving
    /// or resolving).
    pub fn register_comment(
        &self,
        position: Position,
        indicator: Option<Indicator>,
    ) -> Option<CommentId> {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let next = reduce(
            &guard,
            CommentAction::Register {
                position,
                indicator,
            },
        );
        let created = next
            .comments
            .last()
            .filter(|_| next.comments.len() > guard.comments.len())
            .map(|comment| comment.id.clone());
        *guard = next;
        created
    }

    pub fn delete_comment(&self, id: &str) {
        self.dispatch(CommentAction::Delete(id.to_string()));
    }

    /// Replaces the content of one comment; other fields are untouched.
    pub fn update_comment(&self, id: &str, content: impl Into<String>) {
        self.dispatch(CommentAction::Edit {
            id: id.to_string(),
            patch: CommentPatch::content(content),
        });
    }

    pub fn focus_on_comment(&self, id: Option<&str>) {
        self.dispatch(CommentAction::Focus(id.map(str::to_string)));
    }

    pub fn toggle_overlay(&self) {
        self.dispatch(CommentAction::ToggleOverlay);
    }

    pub fn change_overlay_state(&self, to: OverlayState) {
        self.dispatch(CommentAction::ChangeOverlayState(to));
    }

    pub fn update_comment_visibility(&self, patch: VisibilityPatch) {
        self.dispatch(CommentAction::UpdateVisibility(patch));
    }

    /// Flips one comment between `published` and `resolving`.
    ///
    /// Returns `false` without any change for unknown, draft or resolved
    /// comments.
    pub fn toggle_resolving_comment(&self, id: &str) -> bool {
        let Some(status) = self.read(|state| state.find(id).map(|comment| comment.status)) else {
            error!("event=toggle_resolving module=store status=error reason=not_found");
            return false;
        };
        let Some(next) = status.toggled_resolving() else {
            error!(
                "event=toggle_resolving module=store status=error reason=invalid_status comment_status={status}"
            );
            return false;
        };
        self.dispatch(CommentAction::Edit {
            id: id.to_string(),
            patch: CommentPatch::status(next),
        });
        true
    }

    /// Sends all drafts, re-tagged `published`, to `on_confirm`.
    pub async fn confirm_comments(&self) -> TxResult {
        self.commit(CommitKind::Confirm).await
    }

    /// Sends all resolving comments, re-tagged `resolved`, to `on_resolve`.
    pub async fn resolve_comments(&self) -> TxResult {
        self.commit(CommitKind::Resolve).await
    }

    async fn commit(&self, kind: CommitKind) -> TxResult {
        let guard = TransitionGuard::acquire(self, kind.transitional_state());
        let batch: Vec<Comment> = self
            .read(|state| state.comments_with_status(kind.source_status()))
            .iter()
            .map(|comment| comment.retagged(kind.target_status()))
            .collect();
        info!(
            "event=commit_start module=store kind={} status=ok count={}",
            kind.as_str(),
            batch.len()
        );

        let persistence = Arc::clone(&self.persistence);
        let result = execute_async(move || match kind {
            CommitKind::Confirm => persistence.on_confirm(batch),
            CommitKind::Resolve => persistence.on_resolve(batch),
        })
        .await;

        match result.error {
            Some(err) => {
                let err = err.into_kind(kind.error_kind());
                error!(
                    "event=commit_finish module=store kind={} status=error code={}",
                    kind.as_str(),
                    err.code()
                );
                guard.finish(OverlayState::Error);
                self.persistence.on_error(&err);
                TxResult::failed(err)
            }
            None => {
                self.dispatch(kind.reset_action());
                guard.finish(OverlayState::Idle);
                info!(
                    "event=commit_finish module=store kind={} status=ok",
                    kind.as_str()
                );
                TxResult::ok()
            }
        }
    }

    /// Subscribes to external snapshots; each one replaces all comments.
    ///
    /// The returned guard unsubscribes when dropped. The callback only holds a
    /// weak reference, so it never keeps the store alive.
    pub fn attach_subscription(&self, source: Arc<dyn CommentSource>) -> SubscriptionGuard {
        let weak: Weak<RwLock<CommentState>> = Arc::downgrade(&self.state);
        source.subscribe(Box::new(move |comments| {
            if let Some(state) = weak.upgrade() {
                apply(&state, CommentAction::UpdateComments(comments));
            }
        }));
        info!("event=subscription_attach module=store status=ok");
        SubscriptionGuard::new(source)
    }
}

fn apply(state: &RwLock<CommentState>, action: CommentAction) {
    let mut guard = state.write().unwrap_or_else(PoisonError::into_inner);
    let next = reduce(&guard, action);
    *guard = next;
}
