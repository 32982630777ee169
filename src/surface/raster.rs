use std::io::Cursor;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::models::Point;
use crate::surface::Surface;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const STROKE_COLOR: Rgba<u8> = Rgba([20, 20, 20, 255]);

/// Headless surface backed by an in-memory RGBA frame.
pub struct RasterSurface {
    frame: RgbaImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: RgbaImage::from_pixel(width, height, BACKGROUND),
        }
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    fn put_pixel_checked(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.frame.width() || y >= self.frame.height() {
            return;
        }
        self.frame.put_pixel(x, y, color);
    }

    /// Filled disc, the round cap and joint of a stroke segment.
    fn stamp_disc(&mut self, cx: i64, cy: i64, radius: f64, color: Rgba<u8>) {
        let reach = radius.ceil() as i64;
        let radius_sq = radius * radius;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                if ((dx * dx + dy * dy) as f64) <= radius_sq {
                    self.put_pixel_checked(cx + dx, cy + dy, color);
                }
            }
        }
    }
}

impl Surface for RasterSurface {
    fn grid_size(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn clear(&mut self) {
        for pixel in self.frame.pixels_mut() {
            *pixel = BACKGROUND;
        }
    }

    fn draw_template(&mut self, template: &RgbaImage, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        let width = self.frame.width().min(template.width());
        let height = self.frame.height().min(template.height());

        for y in 0..height {
            for x in 0..width {
                let src = template.get_pixel(x, y);
                let alpha = opacity * f32::from(src.0[3]) / 255.0;
                if alpha <= 0.0 {
                    continue;
                }
                let dst = self.frame.get_pixel_mut(x, y);
                for channel in 0..3 {
                    let blended = f32::from(src.0[channel]) * alpha
                        + f32::from(dst.0[channel]) * (1.0 - alpha);
                    dst.0[channel] = blended.round() as u8;
                }
            }
        }
    }

    fn draw_segment(&mut self, from: Point, to: Point, thickness: f64) {
        // Bresenham walk stamping a disc of half the thickness at each
        // step, which gives round caps and joints.
        let radius = (thickness / 2.0).max(0.5);
        let (mut x0, mut y0) = (from.x.round() as i64, from.y.round() as i64);
        let (x1, y1) = (to.x.round() as i64, to.y.round() as i64);

        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.stamp_disc(x0, y0, radius, STROKE_COLOR);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn export_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(self.frame.clone())
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .context("failed to encode surface as PNG")?;
        Ok(buffer)
    }
}
