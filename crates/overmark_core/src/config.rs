//! Overlay configuration and initialization input.
//!
//! # Responsibility
//! - Hold static overlay settings (id prefix, indicator/comment visibility).
//! - Validate caller-supplied initial state before a store is built.
//!
//! # Invariants
//! - `id_prefix` only contains `[A-Za-z0-9_.:-]`.
//! - Initial comments are already persisted (`published` or `resolved`).

use crate::model::comment::{Comment, CommentId, User};
use crate::model::overlay::{CommentVisibility, OverlayState};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static ID_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.:\-]*$").expect("valid id prefix regex"));

/// When comment indicators are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorVisibility {
    /// Draw every indicator.
    #[default]
    Always,
    /// Only draw the indicator of the focused comment.
    Active,
}

/// Static overlay settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayConfig {
    /// Prepended to generated comment ids.
    pub id_prefix: Option<String>,
    pub indicator_visibility: IndicatorVisibility,
    /// Initial visibility of resolved/resolving comments.
    pub comment_visibility: CommentVisibility,
}

impl OverlayConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(prefix) = &self.id_prefix {
            if !ID_PREFIX_RE.is_match(prefix) {
                return Err(ConfigError::InvalidIdPrefix(prefix.clone()));
            }
        }
        Ok(())
    }

    /// Prefix actually used for id generation (`None` when empty).
    pub fn effective_id_prefix(&self) -> Option<&str> {
        self.id_prefix.as_deref().filter(|value| !value.is_empty())
    }
}

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidIdPrefix(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid overlay config: {err}"),
            Self::InvalidIdPrefix(value) => write!(
                f,
                "invalid id prefix `{value}`; expected only letters, digits, `_`, `.`, `:` or `-`"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::InvalidIdPrefix(_) => None,
        }
    }
}

/// Initialization input for a `CommentStore`.
#[derive(Debug, Clone, Default)]
pub struct OverlayOptions {
    /// Comments loaded by the caller, rendered in this order.
    pub initial_comments: Vec<Comment>,
    /// Author for new comments; `None` adds comments anonymously.
    pub current_user: Option<User>,
    /// Overlay mode on creation, `Inactive` by default.
    pub initial_state: OverlayState,
    pub config: OverlayConfig,
}

impl OverlayOptions {
    pub fn new(current_user: Option<User>) -> Self {
        Self {
            current_user,
            ..Self::default()
        }
    }

    pub fn with_initial_comments(mut self, comments: Vec<Comment>) -> Self {
        self.initial_comments = comments;
        self
    }

    pub fn with_initial_state(mut self, state: OverlayState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_config(mut self, config: OverlayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        self.config.validate().map_err(OptionsError::Config)?;
        if let Some(comment) = self
            .initial_comments
            .iter()
            .find(|comment| !comment.status.is_confirmed())
        {
            return Err(OptionsError::UnconfirmedInitialComment(comment.id.clone()));
        }
        Ok(())
    }
}

/// Invalid initialization input.
#[derive(Debug)]
pub enum OptionsError {
    Config(ConfigError),
    /// Initial comments must be `published` or `resolved`.
    UnconfirmedInitialComment(CommentId),
}

impl Display for OptionsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::UnconfirmedInitialComment(id) => write!(
                f,
                "initial comment `{id}` must be published or resolved"
            ),
        }
    }
}

impl Error for OptionsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::UnconfirmedInitialComment(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, IndicatorVisibility, OverlayConfig};

    #[test]
    fn parses_camel_case_document() {
        let config = OverlayConfig::from_json_str(
            r#"{
                "idPrefix": "doc-7:",
                "indicatorVisibility": "active",
                "commentVisibility": { "showResolved": true }
            }"#,
        )
        .expect("config should parse");
        assert_eq!(config.effective_id_prefix(), Some("doc-7:"));
        assert_eq!(config.indicator_visibility, IndicatorVisibility::Active);
        assert!(config.comment_visibility.show_resolved);
        assert!(config.comment_visibility.show_resolving);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = OverlayConfig::from_json_str("{}").expect("empty config should parse");
        assert_eq!(config, OverlayConfig::default());
        assert_eq!(config.effective_id_prefix(), None);
    }

    #[test]
    fn rejects_prefix_with_whitespace() {
        let err = OverlayConfig::from_json_str(r#"{ "idPrefix": "bad prefix" }"#)
            .expect_err("whitespace prefix must be rejected");
        assert!(matches!(err, ConfigError::InvalidIdPrefix(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = OverlayConfig::from_json_str("{ idPrefix: ").expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
