//! Time source for the machine poller, so its schedule can be driven from tests.

use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Time left until `deadline`; zero once it has passed.
    fn until(&self, deadline: Instant) -> Duration {
        deadline.saturating_duration_since(self.now())
    }
}

/// Wall-clock time from `Instant::now` and `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passed_deadline_leaves_nothing() {
        let clock = MonotonicClock::new();
        let past = clock.now();
        clock.sleep(Duration::from_millis(2));
        assert_eq!(clock.until(past), Duration::ZERO);
    }

    #[test]
    fn future_deadline_counts_down() {
        let clock = MonotonicClock::new();
        let left = clock.until(clock.now() + Duration::from_secs(60));
        assert!(left > Duration::from_secs(59));
        assert!(left <= Duration::from_secs(60));
    }
}
