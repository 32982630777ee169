use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// Success boundary, in percent. The host decides its messaging from this
/// single value; there is deliberately no configuration surface for it.
pub const PASS_THRESHOLD_PERCENT: f64 = 70.0;

/// Stroke thickness at which matching the full thickness would count cells
/// far outside the drawn line, so the match radius is halved instead.
const OVERMATCH_THICKNESS: f64 = 40.0;

/// Per exercise-group stroke settings: how wide the learner's stroke is
/// drawn, and how far from a stroke point a mask cell still counts as
/// covered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeProfile {
    pub thickness: f64,
    pub match_radius: f64,
}

impl StrokeProfile {
    /// Wide-brush exercises: thickness 40, radius halved to 20.
    pub fn thick() -> Self {
        Self::for_thickness(40.0)
    }

    /// Fine-line exercises: thickness 5, radius equal to the thickness.
    pub fn thin() -> Self {
        Self::for_thickness(5.0)
    }

    /// Radius tracks thickness directly until the stroke is wide enough to
    /// overmatch; from there it is halved.
    pub fn for_thickness(thickness: f64) -> Self {
        let match_radius = if thickness >= OVERMATCH_THICKNESS {
            thickness / 2.0
        } else {
            thickness
        };
        Self {
            thickness,
            match_radius,
        }
    }
}

impl Default for StrokeProfile {
    fn default() -> Self {
        Self::thin()
    }
}

/// Host-supplied table mapping exercise-group names to stroke settings.
/// The engine consumes this table; it does not define the groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleCatalog {
    groups: HashMap<String, StrokeProfile>,
}

impl StyleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two groups observed in the exercise set.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.insert("thick", StrokeProfile::thick());
        catalog.insert("thin", StrokeProfile::thin());
        catalog
    }

    pub fn insert(&mut self, group: impl Into<String>, profile: StrokeProfile) {
        self.groups.insert(group.into(), profile);
    }

    /// Profile for a group, falling back to the fine-line default for
    /// unknown names.
    pub fn profile(&self, group: &str) -> StrokeProfile {
        self.groups
            .get(group)
            .copied()
            .unwrap_or_else(StrokeProfile::thin)
    }

    /// Read a catalog from a JSON file. A missing or unreadable table falls
    /// back to the defaults rather than blocking the exercise.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::with_defaults());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read style catalog from {}", path.display()))?;
        Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!("malformed style catalog {}: {err}", path.display());
            Self::with_defaults()
        }))
    }
}
