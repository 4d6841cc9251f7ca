//! Nullable infrastructure for deterministic testing and simulation.
//!
//! Everything the farm consumes from the outside world (the clock and the
//! two asset ledgers) is abstracted behind traits. This crate provides
//! in-memory implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, including injected failures
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests and in the
//! `tokenfarm simulate` command.

pub mod clock;
pub mod reward_asset;
pub mod stake_asset;

pub use clock::NullClock;
pub use reward_asset::NullRewardAsset;
pub use stake_asset::{NullStakeAsset, TransferRecord};
