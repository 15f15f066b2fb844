//! Typed errors surfaced by confirm/resolve flows.
//!
//! # Responsibility
//! - Normalize persistence callback failures into a small taxonomy.
//! - Carry a machine-readable code and an HTTP-like status for callers.
//!
//! # Invariants
//! - Every `OverlayError` maps to exactly one code.
//! - The failing callback's error, when any, is kept as `source()`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Error type persistence callbacks fail with.
pub type CallbackError = Box<dyn Error + Send + Sync + 'static>;

/// Error category with a stable wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayErrorKind {
    Unknown,
    Resolve,
    Confirm,
}

impl OverlayErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN_ERROR",
            Self::Resolve => "RESOLVE_ERROR",
            Self::Confirm => "CONFIRM_ERROR",
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown Error",
            Self::Resolve => "An error occured while resolving your comments",
            Self::Confirm => "An error occured while confirming your comments",
        }
    }
}

/// Error handed to `on_error` and returned in `TxResult`.
#[derive(Debug, Clone)]
pub struct OverlayError {
    kind: OverlayErrorKind,
    message: String,
    source: Option<Arc<dyn Error + Send + Sync + 'static>>,
}

impl OverlayError {
    pub fn new(kind: OverlayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(
            OverlayErrorKind::Unknown,
            OverlayErrorKind::Unknown.default_message(),
        )
    }

    pub fn confirm() -> Self {
        Self::new(
            OverlayErrorKind::Confirm,
            OverlayErrorKind::Confirm.default_message(),
        )
    }

    pub fn resolve() -> Self {
        Self::new(
            OverlayErrorKind::Resolve,
            OverlayErrorKind::Resolve.default_message(),
        )
    }

    /// Attaches the underlying callback failure.
    pub fn with_source(mut self, source: CallbackError) -> Self {
        self.source = Some(Arc::from(source));
        self
    }

    /// Re-labels an error under `kind`.
    ///
    /// Errors wrapping a callback failure take the default message of `kind`;
    /// errors without a source (captured panics) keep their own message.
    pub fn into_kind(self, kind: OverlayErrorKind) -> Self {
        let message = if self.source.is_some() {
            kind.default_message().to_string()
        } else {
            self.message
        };
        Self {
            kind,
            message,
            source: self.source,
        }
    }

    pub fn kind(&self) -> OverlayErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// HTTP-like status for caller convenience.
    pub fn status(&self) -> u16 {
        500
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message of the underlying callback failure, if any.
    pub fn cause_message(&self) -> Option<String> {
        self.source.as_ref().map(|err| err.to_string())
    }
}

impl Display for OverlayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "[{}] {}: {source}", self.code(), self.message),
            None => write!(f, "[{}] {}", self.code(), self.message),
        }
    }
}

impl Error for OverlayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn Error + 'static))
    }
}
