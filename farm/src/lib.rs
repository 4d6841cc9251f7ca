//! TokenFarm: a staking and reward-accrual ledger.
//!
//! Participants deposit a stake asset; every time unit the pool earns
//! `reward_per_unit`, credited to participants in proportion to their stake:
//!
//! `delta(p) = floor(reward_per_unit × balance(p) × elapsed / total_staking_balance)`
//!
//! This crate handles:
//! - Stake bookkeeping and the append-only participant registry ([`StakeLedger`])
//! - Proportional accrual and atomic full-pool distribution ([`RewardAccrualEngine`])
//! - The public, lock-serialized operation surface ([`FarmController`])
//! - Events, TOML configuration and bincode snapshots

pub mod accrual;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod ledger;
pub mod participant;
pub mod snapshot;

pub use accrual::{reward_delta, Distribution, RewardAccrualEngine};
pub use config::FarmConfig;
pub use controller::FarmController;
pub use error::FarmError;
pub use event::{EventBus, FarmEvent};
pub use ledger::StakeLedger;
pub use participant::{ParticipantRecord, ParticipantState};
pub use snapshot::FarmSnapshot;
