//! Serializable snapshot of the farm ledger.

use serde::{Deserialize, Serialize};
use tokenfarm_types::AccountId;

use crate::error::FarmError;
use crate::ledger::StakeLedger;
use crate::participant::ParticipantRecord;

/// Point-in-time copy of every participant record and the pool total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    pub reward_per_unit: u128,
    pub total_staking_balance: u128,
    /// Records in registration order.
    pub participants: Vec<(AccountId, ParticipantRecord)>,
}

impl FarmSnapshot {
    pub fn capture(ledger: &StakeLedger, reward_per_unit: u128) -> Self {
        Self {
            reward_per_unit,
            total_staking_balance: ledger.total_staking_balance(),
            participants: ledger
                .iter()
                .map(|(id, record)| (id.clone(), record.clone()))
                .collect(),
        }
    }

    /// Rebuild a ledger, validating the total against the records.
    pub fn into_ledger(self) -> Result<StakeLedger, FarmError> {
        StakeLedger::from_records(self.participants, self.total_staking_balance)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, FarmError> {
        bincode::serialize(self).map_err(|e| FarmError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FarmError> {
        bincode::deserialize(bytes).map_err(|e| FarmError::Snapshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenfarm_types::TimeUnit;

    #[test]
    fn capture_preserves_registration_order() {
        let mut ledger = StakeLedger::new();
        ledger.deposit(&AccountId::new("bob"), 3, TimeUnit::new(1)).unwrap();
        ledger.deposit(&AccountId::new("alice"), 1, TimeUnit::new(2)).unwrap();

        let snapshot = FarmSnapshot::capture(&ledger, 10);
        let ids: Vec<_> = snapshot.participants.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["bob", "alice"]);
        assert_eq!(snapshot.total_staking_balance, 4);

        let bytes = snapshot.to_bytes().unwrap();
        let restored = FarmSnapshot::from_bytes(&bytes).unwrap().into_ledger().unwrap();
        assert_eq!(restored.participants(), ledger.participants());
        assert_eq!(restored.total_staking_balance(), 4);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(matches!(
            FarmSnapshot::from_bytes(&[0xff, 0x01]),
            Err(FarmError::Snapshot(_))
        ));
    }
}
