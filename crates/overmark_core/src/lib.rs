//! Core logic for the Overmark comment overlay.
//! This crate is the single source of truth for comment lifecycle and overlay
//! interaction invariants; rendering and persistence live outside it.

pub mod config;
pub mod errors;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod scope;
pub mod store;
pub mod subscription;
pub mod surface;
pub mod tx;

pub use config::{ConfigError, IndicatorVisibility, OptionsError, OverlayConfig, OverlayOptions};
pub use errors::{CallbackError, OverlayError, OverlayErrorKind};
pub use geometry::{normalize_rect, relative_position, ContentBounds, SelectionRect};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::comment::{Comment, CommentId, CommentPatch, Indicator, Position, User};
pub use model::overlay::{CommentVisibility, OverlayState, VisibilityPatch};
pub use model::status::{has_status, CommentStatus};
pub use scope::CommentScope;
pub use store::action::CommentAction;
pub use store::handle::{CommentPersistence, CommentStore, CommitFuture};
pub use store::reducer::reduce;
pub use store::state::CommentState;
pub use subscription::{CommentSource, SnapshotCallback, SubscriptionGuard};
pub use surface::{
    GestureWarning, OverlaySurface, Placement, PointerDown, PointerEvent, RenderLayers,
    DRAG_THRESHOLD,
};
pub use tx::{execute_async, TransitionGuard, TxResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
