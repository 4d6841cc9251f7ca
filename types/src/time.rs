//! Discrete time units used for reward accrual.
//!
//! A time unit is an abstract tick (for example a block height). Reward
//! accrual only ever looks at the difference between two units, so the
//! origin is irrelevant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete time unit (tick) since an arbitrary origin.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimeUnit(u64);

impl TimeUnit {
    /// The origin (unit zero).
    pub const GENESIS: Self = Self(0);

    pub fn new(unit: u64) -> Self {
        Self(unit)
    }

    /// Units elapsed from this unit up to `now`. Zero if `now` is not later.
    pub fn elapsed_until(&self, now: TimeUnit) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source of the current time unit.
///
/// The farm reads the clock exactly once per public operation.
pub trait UnitClock: Send + Sync {
    fn current_unit(&self) -> TimeUnit;
}
