use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::stroke::StrokePath;

/// Identifies one exercise: a unit (step) and a sub-unit within it.
///
/// Templates, sessions, and stored progress are all scoped to exactly one
/// key at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseKey {
    pub unit: u32,
    pub sub_unit: u32,
}

impl ExerciseKey {
    pub fn new(unit: u32, sub_unit: u32) -> Self {
        Self { unit, sub_unit }
    }
}

impl fmt::Display for ExerciseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.unit, self.sub_unit)
    }
}

/// A completed stroke and its score, as stored per exercise.
///
/// The percentage here is a cache for listing views. The active session
/// re-derives the score from the mask and path after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedProgress {
    pub path: StrokePath,
    pub percentage: f64,
}
