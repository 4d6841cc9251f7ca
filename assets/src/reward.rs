use tokenfarm_types::AccountId;

use crate::AssetError;

/// The asset rewards are paid in.
///
/// The farm is the privileged minter. `mint` is all-or-nothing: on `Err`
/// no supply was created.
pub trait RewardAsset: Send + Sync {
    /// Create `amount` new units and credit them to `to`.
    fn mint(&self, to: &AccountId, amount: u128) -> Result<(), AssetError>;

    /// Current balance of `account`.
    fn balance_of(&self, account: &AccountId) -> Result<u128, AssetError>;
}
