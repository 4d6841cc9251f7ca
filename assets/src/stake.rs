use tokenfarm_types::AccountId;

use crate::AssetError;

/// The asset participants stake into the farm.
///
/// Both transfers are all-or-nothing: on `Err` no balance has moved.
pub trait StakeAsset: Send + Sync {
    /// Pull `amount` from `from` to `to` on the strength of an allowance
    /// `from` granted to the farm.
    fn transfer_from(&self, from: &AccountId, to: &AccountId, amount: u128)
        -> Result<(), AssetError>;

    /// Pay `amount` out of `from`, an account the farm itself controls.
    fn transfer(&self, from: &AccountId, to: &AccountId, amount: u128) -> Result<(), AssetError>;

    /// Current balance of `account`.
    fn balance_of(&self, account: &AccountId) -> Result<u128, AssetError>;
}
