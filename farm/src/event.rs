//! Notifications emitted by the farm after an operation commits.

use serde::{Deserialize, Serialize};
use tokenfarm_types::AccountId;

/// Farm-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FarmEvent {
    /// Stake was deposited into the farm.
    Deposit { participant: AccountId, amount: u128 },
    /// A participant's entire stake was returned.
    Withdraw { participant: AccountId, amount: u128 },
    /// The distributor ran a full-pool accrual pass.
    RewardsDistributed { caller: AccountId },
    /// Pending reward was minted to a participant.
    RewardsClaimed { participant: AccountId, amount: u128 },
}

/// Synchronous fan-out event bus for farm events.
///
/// Listeners run inline while the ledger lock is held, so they see events
/// in commit order. Keep handlers fast and never call back into the farm.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&FarmEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&FarmEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &FarmEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
