//! Farm controller, the public operation surface.
//!
//! Every mutating operation runs under one ledger lock:
//! 1. read the clock once,
//! 2. accrue the caller's reward at the pre-mutation balance,
//! 3. mutate the ledger,
//! 4. call the external asset,
//! 5. emit the event.
//!
//! A failure at any step restores the ledger to its pre-operation state
//! before the error is returned, and no event is emitted.

use std::sync::{Arc, Mutex, MutexGuard};

use tokenfarm_assets::{RewardAsset, StakeAsset};
use tokenfarm_types::{AccountId, UnitClock};

use crate::accrual::{Distribution, RewardAccrualEngine};
use crate::config::FarmConfig;
use crate::error::FarmError;
use crate::event::{EventBus, FarmEvent};
use crate::ledger::StakeLedger;
use crate::participant::ParticipantState;
use crate::snapshot::FarmSnapshot;

/// Orchestrates the stake ledger, the accrual engine and the external assets.
///
/// Share across threads with `Arc<FarmController>`; register listeners with
/// [`FarmController::subscribe`] before sharing.
pub struct FarmController {
    ledger: Mutex<StakeLedger>,
    engine: RewardAccrualEngine,
    stake_asset: Arc<dyn StakeAsset>,
    reward_asset: Arc<dyn RewardAsset>,
    clock: Arc<dyn UnitClock>,
    holding_account: AccountId,
    distributor: AccountId,
    events: EventBus,
}

impl FarmController {
    pub fn new(
        config: &FarmConfig,
        stake_asset: Arc<dyn StakeAsset>,
        reward_asset: Arc<dyn RewardAsset>,
        clock: Arc<dyn UnitClock>,
    ) -> Result<Self, FarmError> {
        config.validate()?;
        Ok(Self {
            ledger: Mutex::new(StakeLedger::new()),
            engine: RewardAccrualEngine::new(u128::from(config.reward_per_unit)),
            stake_asset,
            reward_asset,
            clock,
            holding_account: config.holding_account.clone(),
            distributor: config.distributor.clone(),
            events: EventBus::new(),
        })
    }

    /// Register an event listener.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&FarmEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    /// Stake `amount` on behalf of `participant`.
    pub fn deposit(&self, participant: &AccountId, amount: u128) -> Result<(), FarmError> {
        if amount == 0 {
            tracing::warn!(%participant, "rejected zero-amount deposit");
            return Err(FarmError::InvalidAmount);
        }
        let mut ledger = self.lock()?;
        let now = self.clock.current_unit();

        let balance = staged(&mut ledger, participant, |ledger| {
            self.engine.accrue(ledger, participant, now)?;
            let balance = ledger.deposit(participant, amount, now)?;
            self.stake_asset
                .transfer_from(participant, &self.holding_account, amount)?;
            Ok(balance)
        })
        .inspect_err(|e| tracing::warn!(%participant, amount, error = %e, "deposit rolled back"))?;

        tracing::info!(%participant, amount, balance, unit = %now, "deposit");
        self.events.emit(&FarmEvent::Deposit {
            participant: participant.clone(),
            amount,
        });
        Ok(())
    }

    /// Return the participant's entire stake. Returns the amount withdrawn.
    pub fn withdraw(&self, participant: &AccountId) -> Result<u128, FarmError> {
        let mut ledger = self.lock()?;
        let now = self.clock.current_unit();

        let amount = staged(&mut ledger, participant, |ledger| {
            self.engine.accrue(ledger, participant, now)?;
            let amount = ledger.withdraw(participant)?;
            self.stake_asset
                .transfer(&self.holding_account, participant, amount)?;
            Ok(amount)
        })
        .inspect_err(|e| tracing::warn!(%participant, error = %e, "withdraw rolled back"))?;

        tracing::info!(%participant, amount, unit = %now, "withdraw");
        self.events.emit(&FarmEvent::Withdraw {
            participant: participant.clone(),
            amount,
        });
        Ok(amount)
    }

    /// Mint all pending reward to `participant`, including the accrual for
    /// the current unit. Returns the amount minted; zero is a no-op.
    pub fn claim_rewards(&self, participant: &AccountId) -> Result<u128, FarmError> {
        let mut ledger = self.lock()?;
        let now = self.clock.current_unit();

        let amount = staged(&mut ledger, participant, |ledger| {
            self.engine.accrue(ledger, participant, now)?;
            let Some(record) = ledger.get_mut(participant) else {
                return Ok(0);
            };
            let amount = record.pending_rewards;
            if amount == 0 {
                return Ok(0);
            }
            self.reward_asset.mint(participant, amount)?;
            record.pending_rewards = 0;
            Ok(amount)
        })
        .inspect_err(|e| tracing::warn!(%participant, error = %e, "claim rolled back"))?;

        if amount > 0 {
            tracing::info!(%participant, amount, unit = %now, "rewards claimed");
            self.events.emit(&FarmEvent::RewardsClaimed {
                participant: participant.clone(),
                amount,
            });
        }
        Ok(amount)
    }

    /// Accrue reward for every registered participant. Distributor only.
    pub fn distribute_rewards_all(&self, caller: &AccountId) -> Result<Distribution, FarmError> {
        if *caller != self.distributor {
            tracing::warn!(%caller, "unauthorized distribution attempt");
            return Err(FarmError::Unauthorized(caller.clone()));
        }
        let mut ledger = self.lock()?;
        let now = self.clock.current_unit();

        let distribution = self.engine.distribute_all(&mut ledger, now)?;

        tracing::info!(
            %caller,
            unit = %now,
            pool_total = distribution.pool_total,
            participants = distribution.participants,
            credited = distribution.credited,
            "rewards distributed"
        );
        self.events.emit(&FarmEvent::RewardsDistributed {
            caller: caller.clone(),
        });
        Ok(distribution)
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Current record of `participant`; all zero for unknown identities.
    pub fn participant_state(
        &self,
        participant: &AccountId,
    ) -> Result<ParticipantState, FarmError> {
        Ok(self
            .lock()?
            .get(participant)
            .map(|r| r.view())
            .unwrap_or_default())
    }

    pub fn total_staking_balance(&self) -> Result<u128, FarmError> {
        Ok(self.lock()?.total_staking_balance())
    }

    pub fn reward_per_unit(&self) -> u128 {
        self.engine.reward_per_unit()
    }

    pub fn distributor(&self) -> &AccountId {
        &self.distributor
    }

    pub fn holding_account(&self) -> &AccountId {
        &self.holding_account
    }

    /// Identities that have ever staked, in registration order.
    pub fn registered_participants(&self) -> Result<Vec<AccountId>, FarmError> {
        Ok(self.lock()?.participants().to_vec())
    }

    /// Pending reward `participant` would be able to claim right now.
    pub fn preview_rewards(&self, participant: &AccountId) -> Result<u128, FarmError> {
        let ledger = self.lock()?;
        let now = self.clock.current_unit();
        match ledger.get(participant) {
            Some(record) => self
                .engine
                .preview(record, ledger.total_staking_balance(), now),
            None => Ok(0),
        }
    }

    /// Stake-asset balance of the holding account.
    pub fn holding_balance(&self) -> Result<u128, FarmError> {
        Ok(self.stake_asset.balance_of(&self.holding_account)?)
    }

    /// Recompute the pool total from the records and compare.
    pub fn verify_totals(&self) -> Result<(), FarmError> {
        self.lock()?.verify_totals()
    }

    // ── Persistence ────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Result<FarmSnapshot, FarmError> {
        Ok(FarmSnapshot::capture(&*self.lock()?, self.reward_per_unit()))
    }

    /// Replace the ledger with `snapshot`. The reward rate must match.
    pub fn restore(&self, snapshot: FarmSnapshot) -> Result<(), FarmError> {
        if snapshot.reward_per_unit != self.reward_per_unit() {
            return Err(FarmError::Snapshot(format!(
                "snapshot reward rate {} does not match configured {}",
                snapshot.reward_per_unit,
                self.reward_per_unit()
            )));
        }
        let restored = snapshot.into_ledger()?;
        let mut ledger = self.lock()?;
        tracing::info!(participants = restored.len(), "ledger restored from snapshot");
        *ledger = restored;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StakeLedger>, FarmError> {
        self.ledger.lock().map_err(|_| FarmError::LockPoisoned)
    }
}

/// Run `op` against the ledger, restoring `participant`'s pre-operation
/// state and the pool total if it fails.
fn staged<T>(
    ledger: &mut StakeLedger,
    participant: &AccountId,
    op: impl FnOnce(&mut StakeLedger) -> Result<T, FarmError>,
) -> Result<T, FarmError> {
    let checkpoint = ledger.checkpoint(participant);
    op(&mut *ledger).map_err(|e| {
        ledger.restore(checkpoint);
        e
    })
}
