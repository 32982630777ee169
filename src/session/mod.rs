pub mod controller;
pub mod input;
pub mod state;

pub use controller::{TraceEngine, TraceSession, TraceSnapshot};
pub use input::{InputEvent, ToggleInput};
pub use state::{TracePhase, TraceState};
