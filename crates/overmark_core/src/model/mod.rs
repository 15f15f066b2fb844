//! Comment overlay domain model.
//!
//! # Responsibility
//! - Define the canonical comment record exchanged with presentation and
//!   persistence collaborators.
//! - Define overlay interaction modes and visibility flags.
//!
//! # Invariants
//! - Every comment carries exactly one `CommentStatus`.
//! - Comment ids are stable and never reused.

pub mod comment;
pub mod overlay;
pub mod status;
