use serde::{Deserialize, Serialize};

use crate::models::Point;

/// Where the surface sits in device coordinates and how large it is
/// displayed, versus its fixed pixel grid.
///
/// Pointer positions arrive in device coordinates and are mapped into
/// canvas space before any tracking or scoring sees them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceGeometry {
    pub origin_x: f64,
    pub origin_y: f64,
    pub display_width: f64,
    pub display_height: f64,
    pub grid_width: u32,
    pub grid_height: u32,
}

impl SurfaceGeometry {
    /// Geometry for a surface displayed 1:1 at the device origin.
    pub fn identity(grid_width: u32, grid_height: u32) -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            display_width: f64::from(grid_width),
            display_height: f64::from(grid_height),
            grid_width,
            grid_height,
        }
    }

    pub fn to_canvas(&self, device: Point) -> Point {
        // Degenerate display sizes fall back to a 1:1 scale.
        let scale_x = if self.display_width > 0.0 {
            f64::from(self.grid_width) / self.display_width
        } else {
            1.0
        };
        let scale_y = if self.display_height > 0.0 {
            f64::from(self.grid_height) / self.display_height
        } else {
            1.0
        };
        Point::new(
            (device.x - self.origin_x) * scale_x,
            (device.y - self.origin_y) * scale_y,
        )
    }
}
