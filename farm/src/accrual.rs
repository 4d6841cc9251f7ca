//! Reward accrual engine.
//!
//! Each time unit the pool mints `reward_per_unit`, shared between stakers
//! in proportion to their balance:
//!
//! `delta = floor(reward_per_unit × balance × elapsed / pool_total)`
//!
//! All arithmetic is checked integer math. The floor division deliberately
//! drops dust; remainders are never carried over.

use serde::{Deserialize, Serialize};
use tokenfarm_types::{AccountId, TimeUnit};

use crate::error::FarmError;
use crate::ledger::StakeLedger;
use crate::participant::ParticipantRecord;

/// Reward credit for `balance` out of `pool_total` over `elapsed` units.
///
/// Zero when nothing elapsed or the pool is empty.
pub fn reward_delta(
    reward_per_unit: u128,
    balance: u128,
    elapsed: u64,
    pool_total: u128,
) -> Result<u128, FarmError> {
    if elapsed == 0 || pool_total == 0 || balance == 0 {
        return Ok(0);
    }
    let numerator = reward_per_unit
        .checked_mul(balance)
        .and_then(|v| v.checked_mul(u128::from(elapsed)))
        .ok_or(FarmError::Overflow)?;
    Ok(numerator / pool_total)
}

/// Summary of a full-pool distribution pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// Unit the pass was computed at.
    pub unit: TimeUnit,
    /// Pool total snapshotted once for the whole pass.
    pub pool_total: u128,
    /// Number of registered participants visited.
    pub participants: usize,
    /// Sum of all credits applied in the pass.
    pub credited: u128,
}

/// Computes and applies proportional reward credit.
///
/// The engine holds only the reward rate; balances and totals live in the
/// [`StakeLedger`] passed to each call.
#[derive(Clone, Copy, Debug)]
pub struct RewardAccrualEngine {
    reward_per_unit: u128,
}

impl RewardAccrualEngine {
    pub fn new(reward_per_unit: u128) -> Self {
        Self { reward_per_unit }
    }

    pub fn reward_per_unit(&self) -> u128 {
        self.reward_per_unit
    }

    /// Credit owed to `record` for the units between its last accrual and `now`.
    pub fn credit(
        &self,
        record: &ParticipantRecord,
        pool_total: u128,
        now: TimeUnit,
    ) -> Result<u128, FarmError> {
        let elapsed = record.last_reward_unit.elapsed_until(now);
        reward_delta(self.reward_per_unit, record.staking_balance, elapsed, pool_total)
    }

    /// Pending reward `record` would hold if accrued at `now`.
    pub fn preview(
        &self,
        record: &ParticipantRecord,
        pool_total: u128,
        now: TimeUnit,
    ) -> Result<u128, FarmError> {
        record
            .pending_rewards
            .checked_add(self.credit(record, pool_total, now)?)
            .ok_or(FarmError::Overflow)
    }

    /// Accrue reward for one participant against the current pool total.
    ///
    /// Unknown participants are a no-op. The participant's last reward unit
    /// advances to `now` even when the pool is empty. Returns the credit.
    pub fn accrue(
        &self,
        ledger: &mut StakeLedger,
        participant: &AccountId,
        now: TimeUnit,
    ) -> Result<u128, FarmError> {
        let pool_total = ledger.total_staking_balance();
        let Some(record) = ledger.get_mut(participant) else {
            return Ok(0);
        };
        let pending = self.preview(record, pool_total, now)?;
        let delta = pending - record.pending_rewards;
        settle(record, pending, now);
        if delta > 0 {
            tracing::debug!(%participant, delta, unit = %now, "reward accrued");
        }
        Ok(delta)
    }

    /// Accrue reward for every registered participant at `now`.
    ///
    /// The pool total is read once and used for every participant. Credits
    /// are computed for the whole registry before any record is touched, so
    /// an overflow anywhere leaves the ledger unchanged.
    pub fn distribute_all(
        &self,
        ledger: &mut StakeLedger,
        now: TimeUnit,
    ) -> Result<Distribution, FarmError> {
        let pool_total = ledger.total_staking_balance();
        let plan = ledger
            .records()
            .iter()
            .map(|record| self.preview(record, pool_total, now))
            .collect::<Result<Vec<u128>, FarmError>>()?;

        let mut credited = 0u128;
        for (record, pending) in ledger.records_mut().iter_mut().zip(plan) {
            credited = credited.saturating_add(pending - record.pending_rewards);
            settle(record, pending, now);
        }

        Ok(Distribution {
            unit: now,
            pool_total,
            participants: ledger.len(),
            credited,
        })
    }
}

/// Store the new pending amount and move the accrual cursor forward.
fn settle(record: &mut ParticipantRecord, pending: u128, now: TimeUnit) {
    record.pending_rewards = pending;
    if now > record.last_reward_unit {
        record.last_reward_unit = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> AccountId {
        AccountId::new(name)
    }

    fn staked_ledger(stakes: &[(&str, u128)]) -> StakeLedger {
        let mut ledger = StakeLedger::new();
        for (name, amount) in stakes {
            ledger.deposit(&id(name), *amount, TimeUnit::GENESIS).unwrap();
        }
        ledger
    }

    #[test]
    fn delta_is_proportional_and_floored() {
        // 1000 per unit, 100 of 400 staked, 10 units → 2500
        assert_eq!(reward_delta(1000, 100, 10, 400).unwrap(), 2500);
        // 10 per unit, 1 of 3 staked, 1 unit → floor(10/3) = 3
        assert_eq!(reward_delta(10, 1, 1, 3).unwrap(), 3);
    }

    #[test]
    fn delta_is_zero_for_empty_pool_or_no_elapsed() {
        assert_eq!(reward_delta(1000, 100, 0, 400).unwrap(), 0);
        assert_eq!(reward_delta(1000, 100, 10, 0).unwrap(), 0);
        assert_eq!(reward_delta(1000, 0, 10, 400).unwrap(), 0);
    }

    #[test]
    fn delta_overflow_is_an_error() {
        assert!(matches!(
            reward_delta(u128::MAX, 2, 1, 2),
            Err(FarmError::Overflow)
        ));
    }

    #[test]
    fn accrue_credits_and_advances_cursor() {
        let engine = RewardAccrualEngine::new(1000);
        let mut ledger = staked_ledger(&[("alice", 100), ("bob", 300)]);

        let delta = engine.accrue(&mut ledger, &id("alice"), TimeUnit::new(10)).unwrap();
        assert_eq!(delta, 2500);
        let record = ledger.get(&id("alice")).unwrap();
        assert_eq!(record.pending_rewards, 2500);
        assert_eq!(record.last_reward_unit, TimeUnit::new(10));

        // Same unit again credits nothing.
        let delta = engine.accrue(&mut ledger, &id("alice"), TimeUnit::new(10)).unwrap();
        assert_eq!(delta, 0);
        assert_eq!(ledger.get(&id("alice")).unwrap().pending_rewards, 2500);
    }

    #[test]
    fn accrue_with_empty_pool_still_advances_cursor() {
        let engine = RewardAccrualEngine::new(1000);
        let mut ledger = staked_ledger(&[("alice", 100)]);
        ledger.withdraw(&id("alice")).unwrap();

        let delta = engine.accrue(&mut ledger, &id("alice"), TimeUnit::new(50)).unwrap();
        assert_eq!(delta, 0);
        assert_eq!(
            ledger.get(&id("alice")).unwrap().last_reward_unit,
            TimeUnit::new(50)
        );
    }

    #[test]
    fn accrue_never_moves_cursor_backwards() {
        let engine = RewardAccrualEngine::new(1000);
        let mut ledger = staked_ledger(&[("alice", 100)]);
        engine.accrue(&mut ledger, &id("alice"), TimeUnit::new(20)).unwrap();

        let delta = engine.accrue(&mut ledger, &id("alice"), TimeUnit::new(5)).unwrap();
        assert_eq!(delta, 0);
        assert_eq!(
            ledger.get(&id("alice")).unwrap().last_reward_unit,
            TimeUnit::new(20)
        );
    }

    #[test]
    fn accrue_unknown_participant_is_noop() {
        let engine = RewardAccrualEngine::new(1000);
        let mut ledger = staked_ledger(&[("alice", 100)]);
        assert_eq!(
            engine.accrue(&mut ledger, &id("ghost"), TimeUnit::new(5)).unwrap(),
            0
        );
        assert!(!ledger.is_registered(&id("ghost")));
    }

    #[test]
    fn distribute_all_uses_single_pool_snapshot() {
        let engine = RewardAccrualEngine::new(1000);
        let mut ledger = staked_ledger(&[("alice", 100), ("bob", 300)]);

        let report = engine.distribute_all(&mut ledger, TimeUnit::new(10)).unwrap();
        assert_eq!(report.pool_total, 400);
        assert_eq!(report.participants, 2);
        assert_eq!(report.credited, 10_000);
        assert_eq!(ledger.get(&id("alice")).unwrap().pending_rewards, 2_500);
        assert_eq!(ledger.get(&id("bob")).unwrap().pending_rewards, 7_500);
    }

    #[test]
    fn distribute_all_overflow_applies_nothing() {
        let engine = RewardAccrualEngine::new(u128::MAX / 2);
        let mut ledger = staked_ledger(&[("alice", 1), ("bob", 3)]);
        let before: Vec<_> = ledger.iter().map(|(_, r)| r.clone()).collect();

        let result = engine.distribute_all(&mut ledger, TimeUnit::new(10));
        assert!(matches!(result, Err(FarmError::Overflow)));
        let after: Vec<_> = ledger.iter().map(|(_, r)| r.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn preview_matches_accrue_without_mutating() {
        let engine = RewardAccrualEngine::new(7);
        let mut ledger = staked_ledger(&[("alice", 3), ("bob", 4)]);
        let record = ledger.get(&id("bob")).cloned().unwrap();

        let previewed = engine.preview(&record, 7, TimeUnit::new(9)).unwrap();
        assert_eq!(ledger.get(&id("bob")).unwrap().pending_rewards, 0);

        engine.accrue(&mut ledger, &id("bob"), TimeUnit::new(9)).unwrap();
        assert_eq!(ledger.get(&id("bob")).unwrap().pending_rewards, previewed);
    }
}
