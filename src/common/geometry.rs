//! Geometric types for X11 coordinates and dimensions
//!
//! Provides type-safe wrappers for positions and sizes to avoid
//! common integer confusion (e.g., swapping width/height or x/y).

use serde::{Deserialize, Serialize};

/// A position in root-window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Position {
    fn from(tuple: (i32, i32)) -> Self {
        Self::new(tuple.0, tuple.1)
    }
}

/// Window or monitor size (width × height)
/// Using a newtype prevents accidentally swapping width and height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle: top-left corner plus size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Rect {
    pub origin: Position,
    pub size: Dimensions,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            origin: Position::new(x, y),
            size: Dimensions::new(width, height),
        }
    }

    /// Whether `point` lies inside; the right and bottom edges are exclusive
    pub fn contains(&self, point: Position) -> bool {
        let dx = i64::from(point.x) - i64::from(self.origin.x);
        let dy = i64::from(point.y) - i64::from(self.origin.y);
        dx >= 0 && dy >= 0 && dx < i64::from(self.size.width) && dy < i64::from(self.size.height)
    }

    /// A rectangle of `size` whose center coincides with this one's.
    ///
    /// The result is not clamped, so a size larger than `self` starts
    /// above and left of the origin.
    pub fn centered(&self, size: Dimensions) -> Rect {
        let x = i64::from(self.origin.x) + i64::from(self.size.width) / 2
            - i64::from(size.width) / 2;
        let y = i64::from(self.origin.y) + i64::from(self.size.height) / 2
            - i64::from(size.height) / 2;

        Rect {
            origin: Position::new(saturate(x), saturate(y)),
            size,
        }
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
