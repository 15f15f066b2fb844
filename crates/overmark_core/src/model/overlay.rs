//! Overlay interaction modes and comment visibility flags.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Interaction mode of the annotation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayState {
    /// Overlay hidden; content receives pointer input directly.
    #[default]
    Inactive,
    /// Overlay visible and ready to place comments.
    Idle,
    /// A comment is being composed or edited.
    Editing,
    /// Draft comments are being confirmed.
    Saving,
    /// Resolving comments are being sent for resolution.
    Resolving,
    /// Last confirm/resolve failed.
    Error,
}

impl OverlayState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Idle => "idle",
            Self::Editing => "editing",
            Self::Saving => "saving",
            Self::Resolving => "resolving",
            Self::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inactive" => Some(Self::Inactive),
            "idle" => Some(Self::Idle),
            "editing" => Some(Self::Editing),
            "saving" => Some(Self::Saving),
            "resolving" => Some(Self::Resolving),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Whether a confirm/resolve call is in flight.
    pub fn is_transitional(self) -> bool {
        matches!(self, Self::Saving | Self::Resolving)
    }
}

impl Display for OverlayState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which comment categories appear in the default views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentVisibility {
    /// Show comments already resolved.
    pub show_resolved: bool,
    /// Show comments pending resolution.
    pub show_resolving: bool,
}

impl Default for CommentVisibility {
    fn default() -> Self {
        Self {
            show_resolved: false,
            show_resolving: true,
        }
    }
}

impl CommentVisibility {
    pub fn merge(&mut self, patch: VisibilityPatch) {
        if let Some(value) = patch.show_resolved {
            self.show_resolved = value;
        }
        if let Some(value) = patch.show_resolving {
            self.show_resolving = value;
        }
    }
}

/// Partial visibility update; `None` leaves a flag unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisibilityPatch {
    pub show_resolved: Option<bool>,
    pub show_resolving: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::{CommentVisibility, OverlayState, VisibilityPatch};

    #[test]
    fn visibility_defaults_hide_resolved_only() {
        let visibility = CommentVisibility::default();
        assert!(!visibility.show_resolved);
        assert!(visibility.show_resolving);
    }

    #[test]
    fn merge_leaves_unset_flags_untouched() {
        let mut visibility = CommentVisibility::default();
        visibility.merge(VisibilityPatch {
            show_resolved: Some(true),
            show_resolving: None,
        });
        assert!(visibility.show_resolved);
        assert!(visibility.show_resolving);
    }

    #[test]
    fn overlay_state_parses_wire_values() {
        assert_eq!(OverlayState::parse("Saving"), Some(OverlayState::Saving));
        assert_eq!(OverlayState::parse("busy"), None);
        assert!(OverlayState::Resolving.is_transitional());
        assert!(!OverlayState::Editing.is_transitional());
    }
}
