pub mod exercise;
pub mod stroke;

pub use exercise::{ExerciseKey, PersistedProgress};
pub use stroke::{Point, StrokePath};
