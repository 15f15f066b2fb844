//! Comment domain record.
//!
//! # Responsibility
//! - Define the canonical comment shape shared by store, scope and callbacks.
//! - Provide id generation and partial-update (patch) semantics.
//!
//! # Invariants
//! - `id` is generated from UUID v4 and optionally prefixed; never reused.
//! - `indicator`, when present, hangs up-and-left from `position`.
//! - `resolved_at` is only set on comments sent for resolution.

use crate::model::status::CommentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable comment identifier.
///
/// Kept as `String` because ids may carry a caller-configured prefix.
pub type CommentId = String;

/// Content-relative anchor of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the region of interest a comment points at.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Indicator {
    pub width: f64,
    pub height: f64,
}

impl Indicator {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Author identity attached to new comments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    /// Caller-side user id; anonymous authors may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            avatar: None,
        }
    }
}

/// Canonical comment record.
///
/// Serialized with camelCase keys to match the external wire schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub position: Position,
    pub content: String,
    pub user: Option<User>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    pub status: CommentStatus,
    #[serde(default)]
    pub indicator: Option<Indicator>,
}

impl Comment {
    /// Creates an empty draft with a freshly generated id.
    pub fn draft(
        id_prefix: Option<&str>,
        position: Position,
        indicator: Option<Indicator>,
        user: Option<User>,
    ) -> Self {
        Self {
            id: generate_comment_id(id_prefix),
            position,
            content: String::new(),
            user,
            created_at: Utc::now(),
            resolved_at: None,
            status: CommentStatus::Draft,
            indicator,
        }
    }

    /// Creates an already-persisted comment, e.g. one loaded by the caller.
    pub fn published(
        id: impl Into<CommentId>,
        position: Position,
        content: impl Into<String>,
        user: Option<User>,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            content: content.into(),
            user,
            created_at: Utc::now(),
            resolved_at: None,
            status: CommentStatus::Published,
            indicator: None,
        }
    }

    /// Returns a copy re-tagged with `status`, as handed to persistence.
    pub fn retagged(&self, status: CommentStatus) -> Self {
        let mut copy = self.clone();
        copy.status = status;
        if status == CommentStatus::Resolved && copy.resolved_at.is_none() {
            copy.resolved_at = Some(Utc::now());
        }
        copy
    }

    /// Merges every populated patch field into this comment.
    pub fn apply(&mut self, patch: &CommentPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(indicator) = patch.indicator {
            self.indicator = indicator;
        }
        if let Some(resolved_at) = patch.resolved_at {
            self.resolved_at = resolved_at;
        }
    }
}

/// Partial comment update merged by `CommentAction::Edit`.
///
/// Nested `Option`s distinguish "leave unchanged" from "clear".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentPatch {
    pub content: Option<String>,
    pub status: Option<CommentStatus>,
    pub position: Option<Position>,
    pub indicator: Option<Option<Indicator>>,
    pub resolved_at: Option<Option<DateTime<Utc>>>,
}

impl CommentPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn status(status: CommentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Generates a new unique comment id, prefixed when `prefix` is non-empty.
pub fn generate_comment_id(prefix: Option<&str>) -> CommentId {
    let id = Uuid::new_v4();
    match prefix.filter(|value| !value.is_empty()) {
        Some(prefix) => format!("{prefix}{id}"),
        None => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_comment_id, Comment, CommentPatch, Indicator, Position};
    use crate::model::status::CommentStatus;

    #[test]
    fn draft_sets_defaults() {
        let comment = Comment::draft(None, Position::new(4.0, 8.0), None, None);
        assert_eq!(comment.status, CommentStatus::Draft);
        assert!(comment.content.is_empty());
        assert!(comment.indicator.is_none());
        assert!(comment.resolved_at.is_none());
    }

    #[test]
    fn generated_ids_respect_prefix() {
        let id = generate_comment_id(Some("doc-1:"));
        assert!(id.starts_with("doc-1:"));
        let bare = generate_comment_id(Some(""));
        assert!(!bare.starts_with(':'));
        assert_eq!(bare.len(), 36);
    }

    #[test]
    fn apply_merges_only_populated_fields() {
        let mut comment = Comment::draft(
            None,
            Position::new(1.0, 1.0),
            Some(Indicator::new(5.0, 5.0)),
            None,
        );
        comment.apply(&CommentPatch::content("hello"));
        assert_eq!(comment.content, "hello");
        assert_eq!(comment.status, CommentStatus::Draft);
        assert_eq!(comment.indicator, Some(Indicator::new(5.0, 5.0)));

        comment.apply(&CommentPatch {
            indicator: Some(None),
            ..CommentPatch::default()
        });
        assert!(comment.indicator.is_none());
        assert_eq!(comment.content, "hello");
    }

    #[test]
    fn retag_to_resolved_stamps_resolved_at_on_copy_only() {
        let comment = Comment::published("c-1", Position::default(), "text", None);
        let copy = comment.retagged(CommentStatus::Resolved);
        assert_eq!(copy.status, CommentStatus::Resolved);
        assert!(copy.resolved_at.is_some());
        assert_eq!(comment.status, CommentStatus::Published);
        assert!(comment.resolved_at.is_none());
    }
}
