//! Celebration collaborator.

/// A fire-and-forget celebratory effect (confetti, fireworks, a song).
///
/// The narrative sequencer requests it once per accept transition and never
/// waits on it or reads anything back.
pub trait Celebration: Send + Sync {
    /// Starts the effect.
    fn trigger(&self);
}
