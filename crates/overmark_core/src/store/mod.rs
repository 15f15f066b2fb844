//! Comment state store.
//!
//! # Responsibility
//! - Own the single source of truth for comments and overlay mode.
//! - Apply every mutation through one pure reducer.
//! - Orchestrate confirm/resolve flows against persistence callbacks.
//!
//! # Invariants
//! - `reduce` never panics and never partially applies an action.
//! - Unknown actions are logged and leave state unchanged.
//! - At most one comment is focused at a time.

pub mod action;
pub mod handle;
pub mod reducer;
pub mod state;
