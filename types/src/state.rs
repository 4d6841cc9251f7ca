//! Per-participant staking state.

use serde::{Deserialize, Serialize};

/// Whether a participant currently has stake in the farm.
///
/// `NotStaking --deposit--> Staking --withdraw--> NotStaking`. Claiming
/// rewards never changes the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StakingState {
    NotStaking,
    Staking,
}

impl StakingState {
    /// Derive the state from a staking balance.
    pub fn from_balance(balance: u128) -> Self {
        if balance > 0 {
            Self::Staking
        } else {
            Self::NotStaking
        }
    }

    pub fn is_staking(&self) -> bool {
        matches!(self, Self::Staking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_follows_balance() {
        assert_eq!(StakingState::from_balance(0), StakingState::NotStaking);
        assert_eq!(StakingState::from_balance(1), StakingState::Staking);
        assert!(StakingState::Staking.is_staking());
        assert!(!StakingState::NotStaking.is_staking());
    }
}
