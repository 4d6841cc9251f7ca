//! Nullable reward asset: an in-memory mintable token.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokenfarm_assets::{AssetError, RewardAsset};
use tokenfarm_types::AccountId;

#[derive(Default)]
struct Supply {
    balances: HashMap<AccountId, u128>,
    total: u128,
    mints: Vec<(AccountId, u128)>,
}

/// An in-memory reward token the farm mints into.
#[derive(Default)]
pub struct NullRewardAsset {
    supply: Mutex<Supply>,
    failing: AtomicBool,
}

impl NullRewardAsset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent mint fail until switched off again.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn total_supply(&self) -> u128 {
        self.supply().total
    }

    /// All successful mints, oldest first.
    pub fn mints(&self) -> Vec<(AccountId, u128)> {
        self.supply().mints.clone()
    }

    fn supply(&self) -> MutexGuard<'_, Supply> {
        self.supply.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RewardAsset for NullRewardAsset {
    fn mint(&self, to: &AccountId, amount: u128) -> Result<(), AssetError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AssetError::Rejected("reward asset is failing".into()));
        }
        let mut supply = self.supply();
        let total = supply.total.checked_add(amount).ok_or(AssetError::Overflow)?;
        let balance = supply
            .balances
            .get(to)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        supply.total = total;
        supply.balances.insert(to.clone(), balance);
        supply.mints.push((to.clone(), amount));
        Ok(())
    }

    fn balance_of(&self, account: &AccountId) -> Result<u128, AssetError> {
        Ok(self.supply().balances.get(account).copied().unwrap_or(0))
    }
}
