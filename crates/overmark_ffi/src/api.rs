//! FFI overlay API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the overlay rendering contract to Dart via FRB.
//! - Translate flat FFI records to and from core comment types.
//! - Bridge Dart persistence callbacks into `CommentPersistence`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Dart callbacks report success with an empty string and failure with a
//!   non-empty error message.

use chrono::{DateTime, TimeZone, Utc};
use flutter_rust_bridge::{frb, DartFnFuture};
use log::warn;
use overmark_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CallbackError, Comment, CommentAction, CommentPersistence, CommentScope, CommentStatus,
    CommentStore, CommitFuture, ContentBounds, Indicator, OverlayConfig, OverlayOptions,
    OverlayState, OverlaySurface, PointerDown, PointerEvent, Position, SelectionRect, TxResult,
    User, VisibilityPatch,
};
use std::sync::{Arc, Mutex, PoisonError};

type DartCommitFn = Box<dyn Fn(Vec<FfiComment>) -> DartFnFuture<String> + Send + Sync + 'static>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Flat comment record exchanged with Dart.
#[derive(Debug, Clone, PartialEq)]
pub struct FfiComment {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_avatar: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
    pub resolved_at_ms: Option<i64>,
    /// `draft|published|resolving|resolved`.
    pub status: String,
    pub indicator_width: Option<f64>,
    pub indicator_height: Option<f64>,
}

impl From<&Comment> for FfiComment {
    fn from(comment: &Comment) -> Self {
        let user = comment.user.as_ref();
        Self {
            id: comment.id.clone(),
            x: comment.position.x,
            y: comment.position.y,
            content: comment.content.clone(),
            user_id: user.and_then(|user| user.id.clone()),
            user_name: user.map(|user| user.name.clone()),
            user_avatar: user.and_then(|user| user.avatar.clone()),
            created_at_ms: comment.created_at.timestamp_millis(),
            resolved_at_ms: comment.resolved_at.map(|at| at.timestamp_millis()),
            status: comment.status.as_str().to_string(),
            indicator_width: comment.indicator.map(|indicator| indicator.width),
            indicator_height: comment.indicator.map(|indicator| indicator.height),
        }
    }
}

impl FfiComment {
    fn into_comment(self) -> Result<Comment, String> {
        let status = CommentStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown comment status `{}`", self.status))?;
        let indicator = match (self.indicator_width, self.indicator_height) {
            (Some(width), Some(height)) => Some(Indicator::new(width, height)),
            _ => None,
        };
        let user = self.user_name.map(|name| User {
            id: self.user_id,
            name,
            avatar: self.user_avatar,
        });
        Ok(Comment {
            id: self.id,
            position: Position::new(self.x, self.y),
            content: self.content,
            user,
            created_at: millis_to_utc(self.created_at_ms)?,
            resolved_at: self.resolved_at_ms.map(millis_to_utc).transpose()?,
            status,
            indicator,
        })
    }
}

fn millis_to_utc(value: i64) -> Result<DateTime<Utc>, String> {
    Utc.timestamp_millis_opt(value)
        .single()
        .ok_or_else(|| format!("timestamp out of range: {value}"))
}

fn to_ffi_comments(comments: &[Comment]) -> Vec<FfiComment> {
    comments.iter().map(FfiComment::from).collect()
}

/// Rectangle record for selection previews and indicator frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FfiRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<SelectionRect> for FfiRect {
    fn from(rect: SelectionRect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

/// Pointer-down response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiPointerDown {
    /// Whether the host should capture the pointer.
    pub captured: bool,
    /// Blocking warning to show, if the gesture was refused.
    pub warning: Option<String>,
}

/// Snapshot of everything the Flutter layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct FfiOverlayView {
    pub overlay_state: String,
    pub overlay_visible: bool,
    pub draft_comments: Vec<FfiComment>,
    pub comments: Vec<FfiComment>,
    pub resolving_comments: Vec<FfiComment>,
    pub resolved_comments: Vec<FfiComment>,
    pub visible_comments: Vec<FfiComment>,
    pub focussed_comment: Option<String>,
    pub preview: Option<FfiRect>,
    pub click_catcher: bool,
    pub show_resolved: bool,
    pub show_resolving: bool,
}

/// Confirm/resolve outcome envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiCommitResponse {
    pub ok: bool,
    /// `CONFIRM_ERROR|RESOLVE_ERROR|UNKNOWN_ERROR` on failure.
    pub code: Option<String>,
    pub message: String,
}

impl From<TxResult> for FfiCommitResponse {
    fn from(result: TxResult) -> Self {
        match result.error {
            None => Self {
                ok: true,
                code: None,
                message: String::new(),
            },
            Some(err) => Self {
                ok: false,
                code: Some(err.code().to_string()),
                message: err.to_string(),
            },
        }
    }
}

struct DartPersistence {
    on_confirm: DartCommitFn,
    on_resolve: DartCommitFn,
}

impl DartPersistence {
    fn forward(callback: &DartCommitFn, comments: Vec<Comment>) -> CommitFuture {
        let pending = callback(to_ffi_comments(&comments));
        Box::pin(async move {
            let message = pending.await;
            if message.is_empty() {
                Ok(())
            } else {
                Err(CallbackError::from(message))
            }
        })
    }
}

impl CommentPersistence for DartPersistence {
    fn on_confirm(&self, comments: Vec<Comment>) -> CommitFuture {
        Self::forward(&self.on_confirm, comments)
    }

    fn on_resolve(&self, comments: Vec<Comment>) -> CommitFuture {
        Self::forward(&self.on_resolve, comments)
    }
}

/// One overlay instance owned by a Flutter widget.
#[frb(opaque)]
pub struct OverlaySession {
    store: CommentStore,
    surface: Mutex<OverlaySurface>,
    bounds: Mutex<ContentBounds>,
}

/// Opens an overlay session.
///
/// Input semantics:
/// - `config_json`: camelCase `OverlayConfig` document; empty means defaults.
/// - `initial_state`: overlay mode name; empty means `inactive`.
/// - `initial_comments`: published/resolved comments loaded by the caller.
///
/// # Errors
/// Returns a message for invalid config, state or initial comments.
pub fn open_overlay_session(
    user_name: Option<String>,
    user_id: Option<String>,
    config_json: String,
    initial_state: String,
    initial_comments: Vec<FfiComment>,
    on_confirm: impl Fn(Vec<FfiComment>) -> DartFnFuture<String> + Send + Sync + 'static,
    on_resolve: impl Fn(Vec<FfiComment>) -> DartFnFuture<String> + Send + Sync + 'static,
) -> Result<OverlaySession, String> {
    let config = if config_json.trim().is_empty() {
        OverlayConfig::default()
    } else {
        OverlayConfig::from_json_str(&config_json).map_err(|err| err.to_string())?
    };
    let initial_state = if initial_state.trim().is_empty() {
        OverlayState::Inactive
    } else {
        OverlayState::parse(&initial_state)
            .ok_or_else(|| format!("unknown overlay state `{initial_state}`"))?
    };
    let comments = initial_comments
        .into_iter()
        .map(FfiComment::into_comment)
        .collect::<Result<Vec<_>, _>>()?;
    let current_user = user_name.map(|name| User {
        id: user_id,
        name,
        avatar: None,
    });

    let options = OverlayOptions::new(current_user)
        .with_initial_comments(comments)
        .with_initial_state(initial_state)
        .with_config(config);
    let persistence = DartPersistence {
        on_confirm: Box::new(on_confirm),
        on_resolve: Box::new(on_resolve),
    };
    let store = CommentStore::new(options, Arc::new(persistence)).map_err(|err| err.to_string())?;

    Ok(OverlaySession {
        store,
        surface: Mutex::new(OverlaySurface::new()),
        bounds: Mutex::new(ContentBounds::default()),
    })
}

impl OverlaySession {
    fn with_surface<T>(&self, f: impl FnOnce(&mut OverlaySurface) -> T) -> T {
        let mut surface = self.surface.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut surface)
    }

    fn current_bounds(&self) -> ContentBounds {
        *self.bounds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Updates the viewport rect of the content under the overlay.
    #[frb(sync)]
    pub fn set_content_bounds(&self, left: f64, top: f64, width: f64, height: f64) {
        *self.bounds.lock().unwrap_or_else(PoisonError::into_inner) =
            ContentBounds::new(left, top, width, height);
    }

    #[frb(sync)]
    pub fn pointer_down(&self, pointer_id: i64, client_x: f64, client_y: f64) -> FfiPointerDown {
        let bounds = self.current_bounds();
        let event = PointerEvent::new(pointer_id, client_x, client_y);
        match self.with_surface(|surface| surface.pointer_down(&self.store, event, &bounds)) {
            PointerDown::Captured(_) => FfiPointerDown {
                captured: true,
                warning: None,
            },
            PointerDown::Blocked(warning) => FfiPointerDown {
                captured: false,
                warning: Some(warning.message().to_string()),
            },
            PointerDown::Ignored => FfiPointerDown {
                captured: false,
                warning: None,
            },
        }
    }

    /// Returns the live selection preview, if dragging.
    #[frb(sync)]
    pub fn pointer_move(&self, pointer_id: i64, client_x: f64, client_y: f64) -> Option<FfiRect> {
        let bounds = self.current_bounds();
        let event = PointerEvent::new(pointer_id, client_x, client_y);
        self.with_surface(|surface| surface.pointer_move(event, &bounds))
            .map(FfiRect::from)
    }

    /// Finishes a gesture; returns the newly registered draft, or `None` when
    /// nothing was registered.
    #[frb(sync)]
    pub fn pointer_up(&self, pointer_id: i64, client_x: f64, client_y: f64) -> Option<FfiComment> {
        let bounds = self.current_bounds();
        let event = PointerEvent::new(pointer_id, client_x, client_y);
        let placement =
            self.with_surface(|surface| surface.pointer_up(&self.store, event, &bounds))?;
        self.store
            .find_comment(&placement.id)
            .map(|comment| FfiComment::from(&comment))
    }

    #[frb(sync)]
    pub fn pointer_cancel(&self) {
        self.with_surface(OverlaySurface::cancel);
    }

    #[frb(sync)]
    pub fn dismiss_click_catcher(&self) {
        self.with_surface(|surface| surface.dismiss_click_catcher(&self.store));
    }

    #[frb(sync)]
    pub fn view(&self) -> FfiOverlayView {
        let layers = self.with_surface(|surface| surface.render_layers(&self.store));
        self.store.read(|state| FfiOverlayView {
            overlay_state: state.overlay_state.as_str().to_string(),
            overlay_visible: layers.overlay_visible,
            draft_comments: to_ffi_comments(&layers.draft_comments),
            comments: to_ffi_comments(&layers.comments),
            resolving_comments: to_ffi_comments(&state.resolving_comments()),
            resolved_comments: to_ffi_comments(&state.resolved_comments()),
            visible_comments: to_ffi_comments(&state.visible_comments()),
            focussed_comment: state.focussed_comment.clone(),
            preview: layers.preview.map(FfiRect::from),
            click_catcher: layers.click_catcher,
            show_resolved: state.visibility.show_resolved,
            show_resolving: state.visibility.show_resolving,
        })
    }

    #[frb(sync)]
    pub fn toggle_overlay(&self) {
        self.store.toggle_overlay();
    }

    /// Returns `false` for unknown state names.
    #[frb(sync)]
    pub fn change_overlay_state(&self, to: String) -> bool {
        match OverlayState::parse(&to) {
            Some(state) => {
                self.store.change_overlay_state(state);
                true
            }
            None => {
                self.store.dispatch(CommentAction::Unknown(to));
                false
            }
        }
    }

    #[frb(sync)]
    pub fn focus_on_comment(&self, id: Option<String>) {
        self.store.focus_on_comment(id.as_deref());
    }

    /// Commits an edited draft; empty drafts are refused.
    #[frb(sync)]
    pub fn confirm_draft(&self, id: String, draft: String) -> bool {
        let Some(comment) = self.store.find_comment(&id) else {
            warn!("event=confirm_draft module=ffi status=skip reason=not_found");
            return false;
        };
        let mut scope = CommentScope::new(&self.store, comment, Some(draft.as_str()));
        scope.confirm()
    }

    #[frb(sync)]
    pub fn delete_comment(&self, id: String) {
        self.store.delete_comment(&id);
    }

    #[frb(sync)]
    pub fn toggle_resolving_comment(&self, id: String) -> bool {
        self.store.toggle_resolving_comment(&id)
    }

    #[frb(sync)]
    pub fn update_visibility(&self, show_resolved: Option<bool>, show_resolving: Option<bool>) {
        self.store.update_comment_visibility(VisibilityPatch {
            show_resolved,
            show_resolving,
        });
    }

    /// Indicator box relative to the comment anchor.
    #[frb(sync)]
    pub fn indicator_frame(&self, id: String) -> Option<FfiRect> {
        let comment = self.store.find_comment(&id)?;
        let scope = CommentScope::new(&self.store, comment, None);
        if !scope.show_indicator() {
            return None;
        }
        scope.indicator_frame().map(FfiRect::from)
    }

    /// Replaces all comments with a snapshot pushed by a Dart-side listener.
    ///
    /// # Errors
    /// Returns a message when any record cannot be converted; nothing is
    /// replaced then.
    #[frb(sync)]
    pub fn replace_comments(&self, comments: Vec<FfiComment>) -> Result<(), String> {
        let comments = comments
            .into_iter()
            .map(FfiComment::into_comment)
            .collect::<Result<Vec<_>, _>>()?;
        self.store.dispatch(CommentAction::UpdateComments(comments));
        Ok(())
    }

    pub async fn confirm_comments(&self) -> FfiCommitResponse {
        self.store.confirm_comments().await.into()
    }

    pub async fn resolve_comments(&self) -> FfiCommitResponse {
        self.store.resolve_comments().await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::{FfiComment, FfiCommitResponse};
    use overmark_core::{Comment, CommentStatus, Indicator, OverlayError, Position, TxResult, User};

    #[test]
    fn comment_record_round_trips_through_ffi_shape() {
        let mut comment = Comment::published(
            "c-1",
            Position::new(4.0, 5.0),
            "hello",
            Some(User::named("Ada")),
        );
        comment.indicator = Some(Indicator::new(10.0, 12.0));
        comment.created_at = super::millis_to_utc(1_700_000_000_000).unwrap();

        let record = FfiComment::from(&comment);
        assert_eq!(record.status, "published");
        assert_eq!(record.created_at_ms, 1_700_000_000_000);
        assert_eq!(record.into_comment().unwrap(), comment);
    }

    #[test]
    fn rejects_unknown_status() {
        let mut record = FfiComment::from(&Comment::published(
            "c-2",
            Position::default(),
            "x",
            None,
        ));
        record.status = "archived".to_string();
        assert!(record.into_comment().is_err());
        assert_eq!(CommentStatus::parse("draft"), Some(CommentStatus::Draft));
    }

    #[test]
    fn commit_response_carries_error_code() {
        let ok: FfiCommitResponse = TxResult::ok().into();
        assert!(ok.ok);
        let failed: FfiCommitResponse = TxResult::failed(OverlayError::confirm()).into();
        assert!(!failed.ok);
        assert_eq!(failed.code.as_deref(), Some("CONFIRM_ERROR"));
    }
}
