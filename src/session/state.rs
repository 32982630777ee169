use serde::Serialize;

use crate::models::{Point, StrokePath};
use crate::scoring::CoverageResult;

/// Whether a stroke is currently being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TracePhase {
    Idle,
    Drawing,
}

impl Default for TracePhase {
    fn default() -> Self {
        TracePhase::Idle
    }
}

pub(crate) const PROMPT_MESSAGE: &str = "Trace the picture!";
pub(crate) const DRAWING_MESSAGE: &str = "Drawing...";
pub(crate) const RETRY_MESSAGE: &str = "Try again!";

pub(crate) fn progress_message(percentage: f64) -> String {
    format!("Traced {percentage:.1}% so far")
}

pub(crate) fn success_message(percentage: f64) -> String {
    format!("Well done! ({percentage:.1}%)")
}

/// Mutable state of one tracing session: the machine's phase, the stroke
/// path so far, the latest score, and the message shown to the learner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceState {
    pub phase: TracePhase,
    pub path: StrokePath,
    pub message: String,
    pub result: CoverageResult,
}

impl TraceState {
    pub fn new(total_ink_pixels: usize) -> Self {
        Self {
            phase: TracePhase::Idle,
            path: Vec::new(),
            message: PROMPT_MESSAGE.into(),
            result: CoverageResult::empty(total_ink_pixels),
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.phase == TracePhase::Drawing
    }

    pub fn percentage(&self) -> f64 {
        self.result.percentage
    }

    /// Begin a stroke at `start`. Any previous path is discarded wholesale.
    pub fn begin(&mut self, start: Point) {
        self.phase = TracePhase::Drawing;
        self.path = vec![start];
        self.message = DRAWING_MESSAGE.into();
    }

    pub fn append(&mut self, point: Point) {
        self.path.push(point);
    }

    /// Record an in-flight score and surface it to the learner.
    pub fn live_update(&mut self, result: CoverageResult) {
        self.result = result;
        self.message = progress_message(result.percentage);
    }

    /// Close the stroke with its final score. Returns whether the learner
    /// passed.
    pub fn finish(&mut self, result: CoverageResult) -> bool {
        self.phase = TracePhase::Idle;
        self.result = result;
        let passed = result.is_pass();
        self.message = if passed {
            success_message(result.percentage)
        } else {
            RETRY_MESSAGE.into()
        };
        passed
    }

    /// Replace the path from storage without entering the drawing phase.
    pub fn restore(&mut self, path: StrokePath, result: CoverageResult) {
        self.phase = TracePhase::Idle;
        self.path = path;
        self.result = result;
        self.message = progress_message(result.percentage);
    }
}

#[cfg(test)]
mod tests {
    use super::{TracePhase, TraceState, DRAWING_MESSAGE, PROMPT_MESSAGE, RETRY_MESSAGE};
    use crate::models::Point;
    use crate::scoring::CoverageResult;

    #[test]
    fn begin_discards_the_previous_path() {
        let mut state = TraceState::new(10);
        state.begin(Point::new(1.0, 1.0));
        state.append(Point::new(2.0, 2.0));
        state.finish(CoverageResult::empty(10));

        state.begin(Point::new(5.0, 5.0));
        assert_eq!(state.path, vec![Point::new(5.0, 5.0)]);
        assert_eq!(state.phase, TracePhase::Drawing);
        assert_eq!(state.message, DRAWING_MESSAGE);
    }

    #[test]
    fn finish_classifies_pass_and_fail() {
        let pass = CoverageResult {
            matched_pixels: 70,
            total_ink_pixels: 100,
            percentage: 70.0,
        };
        let fail = CoverageResult {
            matched_pixels: 35,
            total_ink_pixels: 100,
            percentage: 35.0,
        };

        let mut state = TraceState::new(100);
        state.begin(Point::new(0.0, 0.0));
        assert!(state.finish(pass));
        assert!(state.message.contains("70.0"));
        assert_eq!(state.phase, TracePhase::Idle);

        state.begin(Point::new(0.0, 0.0));
        assert!(!state.finish(fail));
        assert_eq!(state.message, RETRY_MESSAGE);
    }

    #[test]
    fn new_state_shows_the_prompt_at_zero_percent() {
        let state = TraceState::new(0);
        assert_eq!(state.message, PROMPT_MESSAGE);
        assert_eq!(state.percentage(), 0.0);
        assert!(!state.is_drawing());
    }
}
