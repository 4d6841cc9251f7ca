//! Fundamental types for TokenFarm.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account identities, discrete time units and the per-participant staking state.

pub mod address;
pub mod state;
pub mod time;

pub use address::AccountId;
pub use state::StakingState;
pub use time::{TimeUnit, UnitClock};
