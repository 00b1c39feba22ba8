//! Shared test doubles and utilities for the Keepsake greeting card engine.

mod celebration;
mod clock;

pub use celebration::RecordingCelebration;
pub use clock::{FixedClock, SteppingClock};
