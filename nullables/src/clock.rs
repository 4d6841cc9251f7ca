//! Nullable clock: deterministic time units for testing.

use std::sync::atomic::{AtomicU64, Ordering};
use tokenfarm_types::{TimeUnit, UnitClock};

/// A deterministic unit clock.
///
/// Time only advances when you tell it to, unless the clock is in mining
/// mode, where every read first advances by one unit (one block per
/// operation).
pub struct NullClock {
    current: AtomicU64,
    step_per_read: u64,
}

impl NullClock {
    pub fn new(initial_unit: u64) -> Self {
        Self {
            current: AtomicU64::new(initial_unit),
            step_per_read: 0,
        }
    }

    /// A clock that advances by one unit before every read.
    pub fn mining(initial_unit: u64) -> Self {
        Self {
            current: AtomicU64::new(initial_unit),
            step_per_read: 1,
        }
    }

    /// Get the current unit without advancing.
    pub fn now(&self) -> TimeUnit {
        TimeUnit::new(self.current.load(Ordering::SeqCst))
    }

    /// Advance time by a number of units.
    pub fn advance(&self, units: u64) {
        self.current.fetch_add(units, Ordering::SeqCst);
    }

    /// Set the time to a specific unit.
    pub fn set(&self, unit: u64) {
        self.current.store(unit, Ordering::SeqCst);
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl UnitClock for NullClock {
    fn current_unit(&self) -> TimeUnit {
        let unit = self.current.fetch_add(self.step_per_read, Ordering::SeqCst);
        TimeUnit::new(unit + self.step_per_read)
    }
}
