//! Per-participant staking record.

use serde::{Deserialize, Serialize};
use tokenfarm_types::{StakingState, TimeUnit};

/// Bookkeeping for one identity that has ever staked.
///
/// Records are created on first deposit and never removed. After a full
/// withdrawal the balance is zero but pending rewards survive until claimed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Stake currently held by the farm on behalf of this participant.
    pub staking_balance: u128,

    /// Reward credited but not yet claimed.
    pub pending_rewards: u128,

    /// Last unit at which accrual was computed. Only moves forward.
    pub last_reward_unit: TimeUnit,
}

impl ParticipantRecord {
    /// A fresh record registered at `now`.
    pub fn new(now: TimeUnit) -> Self {
        Self {
            staking_balance: 0,
            pending_rewards: 0,
            last_reward_unit: now,
        }
    }

    pub fn is_staking(&self) -> bool {
        self.staking_state().is_staking()
    }

    pub fn staking_state(&self) -> StakingState {
        StakingState::from_balance(self.staking_balance)
    }

    /// Public view of the record.
    pub fn view(&self) -> ParticipantState {
        ParticipantState {
            staking_balance: self.staking_balance,
            pending_rewards: self.pending_rewards,
            last_reward_unit: self.last_reward_unit,
            is_staking: self.is_staking(),
        }
    }
}

/// Query result for a participant, including the derived staking flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantState {
    pub staking_balance: u128,
    pub pending_rewards: u128,
    pub last_reward_unit: TimeUnit,
    pub is_staking: bool,
}
