//! Pointer geometry helpers.
//!
//! # Responsibility
//! - Convert viewport pointer coordinates into content-relative positions.
//! - Normalize two corner points into a positive-size rectangle.
//!
//! # Invariants
//! - `normalize_rect(a, b) == normalize_rect(b, a)` for every point pair.
//! - Normalized rectangles never have negative width or height.

use crate::model::comment::{Indicator, Position};
use serde::{Deserialize, Serialize};

/// Viewport-space bounds of the element that hosts the overlay.
///
/// Equivalent to the bounding client rect of the content container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ContentBounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Bounds anchored at the viewport origin.
    pub fn origin(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

/// Axis-aligned selection rectangle in content-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    /// Bottom-right corner, used as the comment anchor for drag selections.
    pub fn bottom_right(&self) -> Position {
        Position::new(self.x + self.width, self.y + self.height)
    }

    pub fn indicator(&self) -> Indicator {
        Indicator::new(self.width, self.height)
    }

    /// Returns whether both sides are shorter than `threshold`.
    pub fn is_smaller_than(&self, threshold: f64) -> bool {
        self.width < threshold && self.height < threshold
    }
}

/// Converts a viewport pointer coordinate into a content-relative position.
pub fn relative_position(client_x: f64, client_y: f64, bounds: &ContentBounds) -> Position {
    Position::new(client_x - bounds.left, client_y - bounds.top)
}

/// Normalizes two corners into a rectangle, regardless of drag direction.
pub fn normalize_rect(a: Position, b: Position) -> SelectionRect {
    SelectionRect {
        x: a.x.min(b.x),
        y: a.y.min(b.y),
        width: (b.x - a.x).abs(),
        height: (b.y - a.y).abs(),
    }
}

/// Euclidean movement magnitude between two positions.
pub fn movement(from: Position, to: Position) -> f64 {
    (to.x - from.x).hypot(to.y - from.y)
}
