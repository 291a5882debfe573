//! Frame-time driven countdowns.

use std::time::Duration;

/// Countdown advanced explicitly with frame deltas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timer {
    /// Time accumulated since the timer last expired.
    pub elapsed: Duration,
    /// Time that must accumulate before the timer expires.
    pub duration: Duration,
}

impl Timer {
    /// Creates a timer that expires after `duration`.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
        }
    }

    /// Rewinds the timer to zero.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

/// Advances the timer and reports whether it expired during this update.
///
/// An expired timer rewinds to zero, so a repeating interval only needs
/// repeated calls.
pub fn update(timer: &mut Timer, dt: Duration) -> bool {
    timer.elapsed = timer.elapsed.saturating_add(dt);
    if timer.elapsed >= timer.duration {
        timer.reset();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_once_duration_accumulates() {
        let mut timer = Timer::new(Duration::from_millis(400));

        assert!(!update(&mut timer, Duration::from_millis(150)));
        assert!(!update(&mut timer, Duration::from_millis(150)));
        assert!(update(&mut timer, Duration::from_millis(150)));
        assert_eq!(timer.elapsed, Duration::ZERO);
    }

    #[test]
    fn zero_duration_expires_every_update() {
        let mut timer = Timer::new(Duration::ZERO);

        assert!(update(&mut timer, Duration::ZERO));
        assert!(update(&mut timer, Duration::from_millis(16)));
    }
}
