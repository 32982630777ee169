use std::collections::HashSet;

use serde::Serialize;

use crate::models::Point;
use crate::scoring::config::PASS_THRESHOLD_PERCENT;
use crate::template::TemplateMask;

/// Outcome of scoring a stroke against a template mask.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageResult {
    pub matched_pixels: usize,
    pub total_ink_pixels: usize,
    pub percentage: f64,
}

impl CoverageResult {
    /// The zero score, also the defined result for a mask with no ink.
    pub fn empty(total_ink_pixels: usize) -> Self {
        Self {
            matched_pixels: 0,
            total_ink_pixels,
            percentage: 0.0,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.percentage >= PASS_THRESHOLD_PERCENT
    }
}

/// Accumulates the set of mask cells covered by a growing stroke.
///
/// The matched set is keyed by the mask's single-coordinate cell index, so
/// overlapping strokes and revisited regions never inflate the count, and
/// it only grows as points are appended. Feeding points one at a time
/// during a session and re-scoring the full path from scratch agree.
#[derive(Debug, Clone)]
pub struct CoverageTracker {
    match_radius: f64,
    matched: HashSet<usize>,
}

impl CoverageTracker {
    pub fn new(match_radius: f64) -> Self {
        Self {
            match_radius,
            matched: HashSet::new(),
        }
    }

    pub fn match_radius(&self) -> f64 {
        self.match_radius
    }

    pub fn matched_pixels(&self) -> usize {
        self.matched.len()
    }

    /// Mark every target cell within the match radius of `point` as
    /// covered. Offsets outside the grid are skipped.
    pub fn add_point(&mut self, point: Point, mask: &TemplateMask) {
        let reach = self.match_radius.ceil() as i64;
        let radius_sq = self.match_radius * self.match_radius;
        let cx = point.x.round() as i64;
        let cy = point.y.round() as i64;

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                if ((dx * dx + dy * dy) as f64) > radius_sq {
                    continue;
                }
                let x = cx + dx;
                let y = cy + dy;
                if x < 0 || y < 0 || x >= i64::from(mask.width()) || y >= i64::from(mask.height())
                {
                    continue;
                }
                let (x, y) = (x as u32, y as u32);
                if mask.is_target(x, y) {
                    self.matched.insert(mask.index(x, y));
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.matched.clear();
    }

    pub fn result(&self, mask: &TemplateMask) -> CoverageResult {
        let total = mask.total_ink_pixels();
        if total == 0 {
            return CoverageResult::empty(0);
        }
        let matched = self.matched.len();
        CoverageResult {
            matched_pixels: matched,
            total_ink_pixels: total,
            percentage: 100.0 * matched as f64 / total as f64,
        }
    }
}

/// Score a whole path in one call, equivalent to feeding the points through
/// a fresh tracker one at a time.
pub fn score(path: &[Point], mask: &TemplateMask, match_radius: f64) -> CoverageResult {
    let mut tracker = CoverageTracker::new(match_radius);
    for point in path {
        tracker.add_point(*point, mask);
    }
    tracker.result(mask)
}
