use serde::{Deserialize, Serialize};

use crate::models::Point;

/// One pointer event from the host, in device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputEvent {
    /// Pointer down, or the first select of a toggle-style input.
    Begin(Point),
    /// Pointer motion while a stroke is active.
    Move(Point),
    /// Pointer up, pointer leaving the surface, or the second select.
    End,
}

/// Folds discrete "select" events (gaze dwell, single clicks) into the same
/// Begin/End stream a press-and-hold pointer produces, so both input styles
/// drive one tracker.
#[derive(Debug, Default)]
pub struct ToggleInput {
    active: bool,
}

impl ToggleInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// A select starts a stroke when idle and ends one when active.
    pub fn select(&mut self, at: Point) -> InputEvent {
        if self.active {
            self.active = false;
            InputEvent::End
        } else {
            self.active = true;
            InputEvent::Begin(at)
        }
    }

    /// Pointer motion between selects; only meaningful while a stroke is
    /// active.
    pub fn motion(&self, at: Point) -> Option<InputEvent> {
        self.active.then_some(InputEvent::Move(at))
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
