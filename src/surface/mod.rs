pub mod geometry;
pub mod raster;

pub use geometry::SurfaceGeometry;
pub use raster::RasterSurface;

use anyhow::Result;
use image::RgbaImage;

use crate::models::Point;

/// The host drawing surface the engine renders templates and strokes onto.
///
/// In production this is the UI's canvas; `RasterSurface` is the headless
/// stand-in used by tests and the CLI driver. The engine only assumes a
/// fixed pixel grid whose dimensions match the template mask.
pub trait Surface {
    fn grid_size(&self) -> (u32, u32);

    /// Reset the surface to its blank background.
    fn clear(&mut self);

    /// Blend a template bitmap over the grid at the given opacity.
    fn draw_template(&mut self, template: &RgbaImage, opacity: f32);

    /// Draw a line segment with round caps at the given stroke thickness,
    /// in canvas coordinates.
    fn draw_segment(&mut self, from: Point, to: Point, thickness: f64);

    /// Encode the current raster as PNG, for the save-as-image feature.
    fn export_png(&self) -> Result<Vec<u8>>;
}
