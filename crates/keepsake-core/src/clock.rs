//! Clock abstraction for deterministic reveal pacing.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Abstraction over wall-clock time.
///
/// Reveal start offsets are computed against the moment a step was entered,
/// so tests inject a clock they control.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Time elapsed since `earlier`, saturating at zero if `earlier` lies in
    /// the future.
    fn elapsed_since(&self, earlier: DateTime<Utc>) -> Duration {
        (self.now() - earlier).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    struct At(DateTime<Utc>);

    impl Clock for At {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_elapsed_since_saturates_for_future_instants() {
        let now = Utc::now();
        let clock = At(now);

        assert_eq!(
            clock.elapsed_since(now + TimeDelta::milliseconds(250)),
            Duration::ZERO
        );
        assert_eq!(
            clock.elapsed_since(now - TimeDelta::milliseconds(250)),
            Duration::from_millis(250)
        );
    }
}
