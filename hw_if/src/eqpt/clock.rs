//! # Monotonic clock port

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::Cell, rc::Rc, time::Instant};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A monotonic time source.
pub trait Clock {
    /// Current time since an arbitrary fixed origin.
    ///
    /// Units: seconds
    fn now(&self) -> f64;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Clock backed by the operating system's monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

/// Clock whose time is set explicitly, used in simulation and testing.
///
/// Clones share the same underlying time, so a handle can be kept to drive the clock while
/// another has been passed to the components under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time_s: Rc<Cell<f64>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

impl ManualClock {
    pub fn new(time_s: f64) -> Self {
        Self {
            time_s: Rc::new(Cell::new(time_s)),
        }
    }

    /// Set the current time.
    pub fn set(&self, time_s: f64) {
        self.time_s.set(time_s);
    }

    /// Move the current time forward by `dt_s`.
    pub fn advance(&self, dt_s: f64) {
        self.time_s.set(self.time_s.get() + dt_s);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.time_s.get()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(1.0);
        let handle = clock.clone();

        handle.advance(0.5);
        assert_eq!(clock.now(), 1.5);

        handle.set(10.0);
        assert_eq!(clock.now(), 10.0);
    }
}
