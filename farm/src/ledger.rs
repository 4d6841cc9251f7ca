//! Stake ledger: per-participant balances, the pool total and the
//! append-only participant registry.
//!
//! Mutators are crate-private: callers reach them only through the
//! [`FarmController`](crate::FarmController), which runs accrual first and
//! rolls back on failure.

use std::collections::HashMap;

use tokenfarm_types::{AccountId, TimeUnit};

use crate::error::FarmError;
use crate::participant::ParticipantRecord;

/// Balances and totals for every identity that has ever staked.
///
/// Records are stored in registration order next to an index, so lookups
/// are O(1) and full-pool iteration is deterministic.
#[derive(Clone, Debug, Default)]
pub struct StakeLedger {
    order: Vec<AccountId>,
    records: Vec<ParticipantRecord>,
    index: HashMap<AccountId, usize>,
    total_staking_balance: u128,
}

/// Pre-operation state needed to undo a staged mutation of one participant.
#[derive(Clone, Debug)]
pub struct LedgerCheckpoint {
    participant: AccountId,
    record: Option<ParticipantRecord>,
    total_staking_balance: u128,
    registered: usize,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from records in registration order.
    ///
    /// Fails if an identity repeats or the total does not match the sum.
    pub fn from_records(
        records: Vec<(AccountId, ParticipantRecord)>,
        total_staking_balance: u128,
    ) -> Result<Self, FarmError> {
        let mut ledger = Self::new();
        for (id, record) in records {
            if ledger.index.contains_key(&id) {
                return Err(FarmError::Snapshot(format!("duplicate participant {id}")));
            }
            ledger.index.insert(id.clone(), ledger.order.len());
            ledger.order.push(id);
            ledger.records.push(record);
        }
        ledger.total_staking_balance = total_staking_balance;
        ledger.verify_totals()?;
        Ok(ledger)
    }

    pub fn total_staking_balance(&self) -> u128 {
        self.total_staking_balance
    }

    pub fn get(&self, participant: &AccountId) -> Option<&ParticipantRecord> {
        self.index.get(participant).map(|&i| &self.records[i])
    }

    pub fn is_registered(&self, participant: &AccountId) -> bool {
        self.index.contains_key(participant)
    }

    /// Registered identities in registration order.
    pub fn participants(&self) -> &[AccountId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &ParticipantRecord)> {
        self.order.iter().zip(self.records.iter())
    }

    /// Recompute the sum of balances and compare it with the recorded total.
    pub fn verify_totals(&self) -> Result<(), FarmError> {
        let computed = self
            .records
            .iter()
            .try_fold(0u128, |acc, r| acc.checked_add(r.staking_balance))
            .ok_or(FarmError::Overflow)?;
        if computed != self.total_staking_balance {
            return Err(FarmError::TotalMismatch {
                recorded: self.total_staking_balance,
                computed,
            });
        }
        Ok(())
    }

    pub(crate) fn get_mut(&mut self, participant: &AccountId) -> Option<&mut ParticipantRecord> {
        self.index
            .get(participant)
            .copied()
            .map(move |i| &mut self.records[i])
    }

    pub(crate) fn records(&self) -> &[ParticipantRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [ParticipantRecord] {
        &mut self.records
    }

    /// Add `amount` to the participant's stake, registering it at `now` if new.
    ///
    /// Returns the new staking balance.
    pub(crate) fn deposit(
        &mut self,
        participant: &AccountId,
        amount: u128,
        now: TimeUnit,
    ) -> Result<u128, FarmError> {
        if amount == 0 {
            return Err(FarmError::InvalidAmount);
        }
        let total = self
            .total_staking_balance
            .checked_add(amount)
            .ok_or(FarmError::Overflow)?;
        let current = self.get(participant).map_or(0, |r| r.staking_balance);
        let balance = current.checked_add(amount).ok_or(FarmError::Overflow)?;

        let i = match self.index.get(participant).copied() {
            Some(i) => i,
            None => {
                let i = self.order.len();
                self.index.insert(participant.clone(), i);
                self.order.push(participant.clone());
                self.records.push(ParticipantRecord::new(now));
                i
            }
        };
        self.records[i].staking_balance = balance;
        self.total_staking_balance = total;
        Ok(balance)
    }

    /// Remove the participant's entire stake. Returns the prior balance.
    pub(crate) fn withdraw(&mut self, participant: &AccountId) -> Result<u128, FarmError> {
        let prior = self.get(participant).map_or(0, |r| r.staking_balance);
        if prior == 0 {
            return Err(FarmError::InsufficientStake(participant.clone()));
        }
        let total = self
            .total_staking_balance
            .checked_sub(prior)
            .ok_or(FarmError::Overflow)?;
        if let Some(record) = self.get_mut(participant) {
            record.staking_balance = 0;
        }
        self.total_staking_balance = total;
        Ok(prior)
    }

    /// Capture what is needed to undo a mutation of `participant`.
    pub(crate) fn checkpoint(&self, participant: &AccountId) -> LedgerCheckpoint {
        LedgerCheckpoint {
            participant: participant.clone(),
            record: self.get(participant).cloned(),
            total_staking_balance: self.total_staking_balance,
            registered: self.order.len(),
        }
    }

    /// Roll back to `checkpoint`, un-registering the participant if it was
    /// registered after the checkpoint was taken.
    pub(crate) fn restore(&mut self, checkpoint: LedgerCheckpoint) {
        match checkpoint.record {
            Some(record) => {
                if let Some(current) = self.get_mut(&checkpoint.participant) {
                    *current = record;
                }
            }
            None => {
                while self.order.len() > checkpoint.registered {
                    if let Some(id) = self.order.pop() {
                        self.index.remove(&id);
                    }
                    self.records.pop();
                }
            }
        }
        self.total_staking_balance = checkpoint.total_staking_balance;
    }
}
