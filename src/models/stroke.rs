use serde::{Deserialize, Serialize};

/// A position in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The ordered points of one continuous drawing session, in drawing order.
/// Append-only while a stroke is active; replaced wholesale on rehydrate
/// and clear.
pub type StrokePath = Vec<Point>;
