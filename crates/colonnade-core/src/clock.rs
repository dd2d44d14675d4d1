//! The animation clock (spec.md §4.1): a monotonic wall-clock source and the
//! only source of time animations ever read, so tests can inject a virtual
//! clock instead of `Instant::now()`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Seconds elapsed since an arbitrary, clock-instance-fixed reference point.
pub type Seconds = f64;

/// A monotonic time source. `SystemClock` is the production implementation;
/// `VirtualClock` lets tests advance time deterministically without sleeping.
pub trait AnimationClock: fmt::Debug + Send + Sync {
    fn now(&self) -> Seconds;
}

/// Wraps `std::time::Instant`, anchored at construction time.
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationClock for SystemClock {
    fn now(&self) -> Seconds {
        self.start.elapsed().as_secs_f64()
    }
}

/// A settable clock for deterministic animation tests.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now_bits: AtomicU64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, t: Seconds) {
        self.now_bits.store(t.to_bits(), Ordering::Relaxed);
    }

    pub fn advance(&self, dt: Seconds) {
        self.set(self.now() + dt);
    }
}

impl AnimationClock for VirtualClock {
    fn now(&self) -> Seconds {
        f64::from_bits(self.now_bits.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_starts_at_zero_and_advances() {
        // Arrange
        let clock = VirtualClock::new();
        assert_eq!(clock.now(), 0.0);

        // Act
        clock.advance(0.5);

        // Assert
        assert_eq!(clock.now(), 0.5);
    }

    #[test]
    fn system_clock_is_monotonic_non_negative() {
        // Arrange
        let clock = SystemClock::new();

        // Act
        let a = clock.now();
        let b = clock.now();

        // Assert
        assert!(b >= a);
        assert!(a >= 0.0);
    }
}
