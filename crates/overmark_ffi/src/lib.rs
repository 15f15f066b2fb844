//! Flutter-facing bindings for the Overmark core.

pub mod api;
