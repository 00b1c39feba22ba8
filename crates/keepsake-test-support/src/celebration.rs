//! Test celebration that counts triggers instead of throwing confetti.

use std::sync::atomic::{AtomicUsize, Ordering};

use keepsake_core::celebration::Celebration;

/// A celebration that records how many times it was triggered.
#[derive(Debug, Default)]
pub struct RecordingCelebration {
    triggers: AtomicUsize,
}

impl RecordingCelebration {
    /// Creates a celebration that has never been triggered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `trigger` calls so far.
    #[must_use]
    pub fn trigger_count(&self) -> usize {
        self.triggers.load(Ordering::SeqCst)
    }
}

impl Celebration for RecordingCelebration {
    fn trigger(&self) {
        self.triggers.fetch_add(1, Ordering::SeqCst);
    }
}
