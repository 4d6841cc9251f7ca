//! Nullable stake asset: an in-memory token ledger.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokenfarm_assets::{AssetError, StakeAsset};
use tokenfarm_types::AccountId;

/// A completed transfer, recorded for assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: u128,
}

#[derive(Default)]
struct Ledger {
    balances: HashMap<AccountId, u128>,
    allowances: HashMap<AccountId, u128>,
    transfers: Vec<TransferRecord>,
}

/// An in-memory stake token.
///
/// By default any holder may be debited up to its balance. With
/// [`NullStakeAsset::with_allowances`] a `transfer_from` pull also consumes
/// the allowance the owner granted through [`NullStakeAsset::approve`];
/// direct `transfer`s by the farm's own account never need one.
#[derive(Default)]
pub struct NullStakeAsset {
    ledger: Mutex<Ledger>,
    enforce_allowances: bool,
    failing: AtomicBool,
}

impl NullStakeAsset {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that requires an approval before every debit.
    pub fn with_allowances() -> Self {
        Self {
            enforce_allowances: true,
            ..Self::default()
        }
    }

    /// Create `amount` new tokens for `to`.
    pub fn mint(&self, to: &AccountId, amount: u128) {
        let mut ledger = self.ledger();
        let balance = ledger.balances.entry(to.clone()).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Let the farm debit up to `amount` from `owner`.
    pub fn approve(&self, owner: &AccountId, amount: u128) {
        self.ledger().allowances.insert(owner.clone(), amount);
    }

    pub fn allowance(&self, owner: &AccountId) -> u128 {
        self.ledger().allowances.get(owner).copied().unwrap_or(0)
    }

    /// Make every subsequent transfer fail until switched off again.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All successful transfers, oldest first.
    pub fn transfers(&self) -> Vec<TransferRecord> {
        self.ledger().transfers.clone()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NullStakeAsset {
    /// Move `amount` between holders, consuming `from`'s allowance when
    /// `pulled` and allowances are enforced.
    fn move_balance(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
        pulled: bool,
    ) -> Result<(), AssetError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AssetError::Rejected("stake asset is failing".into()));
        }
        let mut ledger = self.ledger();

        let available = ledger.balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                account: from.to_string(),
                needed: amount,
                available,
            });
        }
        let remaining_allowance = if pulled && self.enforce_allowances {
            let allowed = ledger.allowances.get(from).copied().unwrap_or(0);
            if allowed < amount {
                return Err(AssetError::InsufficientAllowance {
                    owner: from.to_string(),
                    needed: amount,
                    available: allowed,
                });
            }
            Some(allowed - amount)
        } else {
            None
        };

        if from != to {
            let credited = ledger
                .balances
                .get(to)
                .copied()
                .unwrap_or(0)
                .checked_add(amount)
                .ok_or(AssetError::Overflow)?;
            ledger.balances.insert(from.clone(), available - amount);
            ledger.balances.insert(to.clone(), credited);
        }
        if let Some(remaining) = remaining_allowance {
            ledger.allowances.insert(from.clone(), remaining);
        }
        ledger.transfers.push(TransferRecord {
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        Ok(())
    }
}

impl StakeAsset for NullStakeAsset {
    fn transfer_from(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), AssetError> {
        self.move_balance(from, to, amount, true)
    }

    fn transfer(&self, from: &AccountId, to: &AccountId, amount: u128) -> Result<(), AssetError> {
        self.move_balance(from, to, amount, false)
    }

    fn balance_of(&self, account: &AccountId) -> Result<u128, AssetError> {
        Ok(self.ledger().balances.get(account).copied().unwrap_or(0))
    }
}
