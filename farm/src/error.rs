//! Farm errors.

use thiserror::Error;
use tokenfarm_assets::AssetError;
use tokenfarm_types::AccountId;

#[derive(Debug, Error)]
pub enum FarmError {
    #[error("amount must be non-zero")]
    InvalidAmount,

    #[error("{0} has no stake to withdraw")]
    InsufficientStake(AccountId),

    #[error("external asset call failed: {0}")]
    TransferFailed(#[from] AssetError),

    #[error("{0} is not the distributor")]
    Unauthorized(AccountId),

    #[error("arithmetic overflow in farm accounting")]
    Overflow,

    #[error("total staking balance {recorded} does not match sum of balances {computed}")]
    TotalMismatch { recorded: u128, computed: u128 },

    #[error("farm ledger lock poisoned")]
    LockPoisoned,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
