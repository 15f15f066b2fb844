//! Comment lifecycle status and classification predicates.
//!
//! # Invariants
//! - Resolve toggling only flips `Published <-> Resolving`.
//! - Draft and resolved comments are never toggled.

use crate::model::comment::Comment;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Lifecycle state of one comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    /// Created locally, not yet confirmed.
    Draft,
    /// Confirmed by the persistence collaborator.
    Published,
    /// Marked for resolution, pending the resolve callback.
    Resolving,
    /// Resolution confirmed by the persistence collaborator.
    Resolved,
}

impl CommentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Resolving => "resolving",
            Self::Resolved => "resolved",
        }
    }

    /// Parses the lowercase wire value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "resolving" => Some(Self::Resolving),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }

    /// Statuses accepted as initial comments (already persisted elsewhere).
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Published | Self::Resolved)
    }

    /// Returns the status a resolve toggle leads to.
    ///
    /// `None` for draft and resolved comments, which cannot be toggled.
    pub fn toggled_resolving(self) -> Option<Self> {
        match self {
            Self::Published => Some(Self::Resolving),
            Self::Resolving => Some(Self::Published),
            Self::Draft | Self::Resolved => None,
        }
    }
}

impl Display for CommentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a predicate matching comments in `status`.
pub fn has_status(status: CommentStatus) -> impl Fn(&Comment) -> bool {
    move |comment| comment.status == status
}

#[cfg(test)]
mod tests {
    use super::CommentStatus;

    #[test]
    fn toggle_only_flips_published_and_resolving() {
        assert_eq!(
            CommentStatus::Published.toggled_resolving(),
            Some(CommentStatus::Resolving)
        );
        assert_eq!(
            CommentStatus::Resolving.toggled_resolving(),
            Some(CommentStatus::Published)
        );
        assert_eq!(CommentStatus::Draft.toggled_resolving(), None);
        assert_eq!(CommentStatus::Resolved.toggled_resolving(), None);
    }

    #[test]
    fn parse_accepts_wire_values() {
        for status in [
            CommentStatus::Draft,
            CommentStatus::Published,
            CommentStatus::Resolving,
            CommentStatus::Resolved,
        ] {
            assert_eq!(CommentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CommentStatus::parse(" Published "), Some(CommentStatus::Published));
        assert_eq!(CommentStatus::parse("archived"), None);
    }
}
