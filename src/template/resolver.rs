use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::{info, warn};

use crate::models::ExerciseKey;

/// Resolves exercise keys to template images under an asset root.
///
/// Templates follow the `<unit>-<sub_unit>.png` naming convention. A key
/// with no readable template is a valid state; the exercise then runs
/// against an empty mask.
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    asset_root: PathBuf,
}

impl TemplateResolver {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    pub fn image_path(&self, key: ExerciseKey) -> PathBuf {
        self.asset_root.join(format!("{key}.png"))
    }

    /// Load and decode the template for `key`. Missing or corrupt files
    /// yield `None` rather than an error.
    pub fn load(&self, key: ExerciseKey) -> Option<DynamicImage> {
        let path = self.image_path(key);
        if !path.exists() {
            info!("no template for exercise {key} at {}", path.display());
            return None;
        }
        match image::open(&path) {
            Ok(image) => Some(image),
            Err(err) => {
                warn!("failed to decode template {}: {err}", path.display());
                None
            }
        }
    }
}
