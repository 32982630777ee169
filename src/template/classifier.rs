use image::{imageops::FilterType, DynamicImage, Rgba, RgbaImage};

use crate::template::mask::{CellClass, TemplateMask};

/// Channel thresholds splitting template linework from background.
///
/// The cutoffs are empirically tuned values, kept adjustable per instance
/// rather than treated as exact constants.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Every channel below this reads as drawn linework.
    pub ink_cutoff: u8,
    /// Channels inside [band_low, band_high] read as anti-aliased edge.
    pub band_low: u8,
    pub band_high: u8,
    /// Gray value ink pixels are re-mapped to in the display image.
    pub display_gray: u8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            ink_cutoff: 100,
            band_low: 50,
            band_high: 200,
            display_gray: 128,
        }
    }
}

impl ClassifierConfig {
    fn classify_pixel(&self, pixel: &Rgba<u8>) -> CellClass {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            return CellClass::Blank;
        }
        if r < self.ink_cutoff && g < self.ink_cutoff && b < self.ink_cutoff {
            return CellClass::Ink;
        }
        let in_band = |v: u8| v >= self.band_low && v <= self.band_high;
        if in_band(r) && in_band(g) && in_band(b) {
            CellClass::Halo
        } else {
            CellClass::Blank
        }
    }
}

fn resample(image: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    if image.width() == width && image.height() == height {
        image.to_rgba8()
    } else {
        image
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgba8()
    }
}

/// Classify a decoded template into an ink mask at the drawing surface's
/// grid size. Same image in, same mask out.
pub fn classify(
    image: &DynamicImage,
    width: u32,
    height: u32,
    config: &ClassifierConfig,
) -> TemplateMask {
    let resized = resample(image, width, height);
    let cells = resized
        .pixels()
        .map(|pixel| config.classify_pixel(pixel))
        .collect();
    TemplateMask::from_cells(width, height, cells)
}

/// Classify and also produce the on-screen rendition, with ink pixels
/// re-mapped to a canonical mid-gray. The remap happens after
/// classification and never feeds back into it.
pub fn classify_with_display(
    image: &DynamicImage,
    width: u32,
    height: u32,
    config: &ClassifierConfig,
) -> (TemplateMask, RgbaImage) {
    let resized = resample(image, width, height);
    let mut display = resized.clone();
    let mut cells = Vec::with_capacity((width as usize) * (height as usize));

    for (x, y, pixel) in resized.enumerate_pixels() {
        let class = config.classify_pixel(pixel);
        if class == CellClass::Ink {
            let gray = config.display_gray;
            display.put_pixel(x, y, Rgba([gray, gray, gray, pixel.0[3]]));
        }
        cells.push(class);
    }

    (TemplateMask::from_cells(width, height, cells), display)
}
