pub mod config;
pub mod coverage;

pub use config::{StrokeProfile, StyleCatalog, PASS_THRESHOLD_PERCENT};
pub use coverage::{score, CoverageResult, CoverageTracker};
