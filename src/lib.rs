//! Guided-tracing engine.
//!
//! A learner draws over a faint template; the engine classifies the
//! template raster into an ink mask, tracks the stroke through a small
//! state machine, scores how much of the ink the stroke covered, and
//! persists per-exercise progress. The surrounding UI supplies a drawing
//! surface and pointer events, and consumes the percentage and pass/fail
//! signal.

pub mod db;
pub mod models;
pub mod scoring;
pub mod session;
pub mod surface;
pub mod template;

pub use db::Database;
pub use models::{ExerciseKey, PersistedProgress, Point, StrokePath};
pub use scoring::{score, CoverageResult, CoverageTracker, StrokeProfile, StyleCatalog, PASS_THRESHOLD_PERCENT};
pub use session::{InputEvent, ToggleInput, TraceEngine, TracePhase, TraceSnapshot};
pub use surface::{RasterSurface, Surface, SurfaceGeometry};
pub use template::{classify, classify_with_display, ClassifierConfig, TemplateMask, TemplateResolver};
