//! Session timer: phase classification and the drift-resistant engine.

pub mod engine;
pub mod phase;

pub use engine::{TimerEngine, TimerOptions, TimerSample};
pub use phase::{PhaseDuration, PhaseKind, classify};
