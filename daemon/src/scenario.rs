//! Scenario replay against in-memory assets.
//!
//! A scenario is a TOML file holding an ordered list of `[[step]]` tables:
//!
//! ```toml
//! mining = false
//!
//! [[step]]
//! action = "mint"
//! account = "alice"
//! amount = 1000
//!
//! [[step]]
//! action = "deposit"
//! account = "alice"
//! amount = 100
//!
//! [[step]]
//! action = "advance"
//! units = 10
//! ```
//!
//! Rejected steps are recorded in the report and the replay continues.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokenfarm_assets::RewardAsset;
use tokenfarm_farm::{FarmConfig, FarmController, FarmEvent, ParticipantState};
use tokenfarm_nullables::{NullClock, NullRewardAsset, NullStakeAsset};
use tokenfarm_types::{AccountId, TimeUnit};

/// A parsed scenario file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    /// Advance the clock one unit on every read, like a chain that mines a
    /// block per transaction.
    #[serde(default)]
    pub mining: bool,

    /// Require `approve` steps before deposits can pull stake.
    #[serde(default)]
    pub enforce_allowances: bool,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// One scenario action. Amounts are 64-bit because TOML integers are.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Credit stake-asset balance to an account.
    Mint { account: AccountId, amount: u64 },
    /// Let the holding account pull up to `amount` from `account`.
    Approve { account: AccountId, amount: u64 },
    Deposit { account: AccountId, amount: u64 },
    Withdraw { account: AccountId },
    Claim { account: AccountId },
    /// Full-pool accrual. Runs as the configured distributor unless `caller` is set.
    Distribute { caller: Option<AccountId> },
    /// Move the clock forward.
    Advance { units: u64 },
}

/// A step the farm refused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RejectedStep {
    pub index: usize,
    pub error: String,
}

/// Final per-participant state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParticipantReport {
    pub participant: AccountId,
    #[serde(flatten)]
    pub state: ParticipantState,
    /// Reward asset minted to this participant so far.
    pub reward_balance: u128,
}

/// Outcome of a replay, printed as JSON by the binary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub reward_per_unit: u128,
    pub final_unit: TimeUnit,
    pub total_staking_balance: u128,
    pub holding_balance: u128,
    pub reward_supply: u128,
    pub participants: Vec<ParticipantReport>,
    pub events: Vec<FarmEvent>,
    pub rejected: Vec<RejectedStep>,
}

impl Scenario {
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Replay every step against fresh in-memory assets.
    pub fn run(&self, config: &FarmConfig) -> anyhow::Result<SimulationReport> {
        let stake = Arc::new(if self.enforce_allowances {
            NullStakeAsset::with_allowances()
        } else {
            NullStakeAsset::new()
        });
        let reward = Arc::new(NullRewardAsset::new());
        let clock = Arc::new(if self.mining {
            NullClock::mining(0)
        } else {
            NullClock::new(0)
        });

        let mut farm = FarmController::new(config, stake.clone(), reward.clone(), clock.clone())
            .context("invalid farm configuration")?;
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        farm.subscribe(Box::new(move |event: &FarmEvent| {
            tracing::info!(?event, "farm event");
            if let Ok(mut events) = sink.lock() {
                events.push(event.clone());
            }
        }));

        let mut rejected = Vec::new();
        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!(index, ?step, "replaying step");
            let outcome = match step {
                Step::Mint { account, amount } => {
                    stake.mint(account, u128::from(*amount));
                    Ok(())
                }
                Step::Approve { account, amount } => {
                    stake.approve(account, u128::from(*amount));
                    Ok(())
                }
                Step::Deposit { account, amount } => farm.deposit(account, u128::from(*amount)),
                Step::Withdraw { account } => farm.withdraw(account).map(|_| ()),
                Step::Claim { account } => farm.claim_rewards(account).map(|_| ()),
                Step::Distribute { caller } => {
                    let caller = caller.as_ref().unwrap_or(farm.distributor());
                    farm.distribute_rewards_all(caller).map(|_| ())
                }
                Step::Advance { units } => {
                    clock.advance(*units);
                    Ok(())
                }
            };
            if let Err(e) = outcome {
                tracing::warn!(index, error = %e, "step rejected");
                rejected.push(RejectedStep {
                    index,
                    error: e.to_string(),
                });
            }
        }

        farm.verify_totals().context("ledger totals diverged")?;

        let mut participants = Vec::new();
        for participant in farm.registered_participants()? {
            participants.push(ParticipantReport {
                state: farm.participant_state(&participant)?,
                reward_balance: reward.balance_of(&participant)?,
                participant,
            });
        }

        let events = events
            .lock()
            .map(|events| events.clone())
            .map_err(|_| anyhow::anyhow!("event sink poisoned"))?;

        Ok(SimulationReport {
            reward_per_unit: farm.reward_per_unit(),
            final_unit: clock.now(),
            total_staking_balance: farm.total_staking_balance()?,
            holding_balance: farm.holding_balance()?,
            reward_supply: reward.total_supply(),
            participants,
            events,
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_STAKERS: &str = r#"
        [[step]]
        action = "mint"
        account = "alice"
        amount = 1000

        [[step]]
        action = "mint"
        account = "bob"
        amount = 1000

        [[step]]
        action = "deposit"
        account = "alice"
        amount = 100

        [[step]]
        action = "deposit"
        account = "bob"
        amount = 300

        [[step]]
        action = "advance"
        units = 10

        [[step]]
        action = "distribute"

        [[step]]
        action = "claim"
        account = "alice"
    "#;

    fn config(rate: u64) -> FarmConfig {
        FarmConfig {
            reward_per_unit: rate,
            ..FarmConfig::default()
        }
    }

    #[test]
    fn parses_tagged_steps() {
        let scenario = Scenario::from_toml_str(TWO_STAKERS).unwrap();
        assert!(!scenario.mining);
        assert_eq!(scenario.steps.len(), 7);
        assert_eq!(
            scenario.steps[2],
            Step::Deposit {
                account: AccountId::new("alice"),
                amount: 100
            }
        );
        assert_eq!(scenario.steps[5], Step::Distribute { caller: None });
    }

    #[test]
    fn unknown_action_is_a_parse_error() {
        let result = Scenario::from_toml_str("[[step]]\naction = \"burn\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn replays_distribution_and_claim() {
        let scenario = Scenario::from_toml_str(TWO_STAKERS).unwrap();
        let report = scenario.run(&config(1000)).unwrap();

        assert!(report.rejected.is_empty());
        assert_eq!(report.final_unit, TimeUnit::new(10));
        assert_eq!(report.total_staking_balance, 400);
        assert_eq!(report.holding_balance, 400);
        assert_eq!(report.reward_supply, 2_500);

        let alice = &report.participants[0];
        assert_eq!(alice.participant, AccountId::new("alice"));
        assert_eq!(alice.state.pending_rewards, 0);
        assert_eq!(alice.reward_balance, 2_500);
        let bob = &report.participants[1];
        assert_eq!(bob.state.pending_rewards, 7_500);
        assert!(bob.state.is_staking);

        assert_eq!(report.events.len(), 4);
        assert_eq!(
            report.events[3],
            FarmEvent::RewardsClaimed {
                participant: AccountId::new("alice"),
                amount: 2_500
            }
        );
    }

    #[test]
    fn rejected_steps_are_reported_and_skipped() {
        let scenario = Scenario::from_toml_str(
            r#"
            enforce_allowances = true

            [[step]]
            action = "mint"
            account = "alice"
            amount = 50

            [[step]]
            action = "deposit"
            account = "alice"
            amount = 50

            [[step]]
            action = "approve"
            account = "alice"
            amount = 50

            [[step]]
            action = "deposit"
            account = "alice"
            amount = 50

            [[step]]
            action = "distribute"
            caller = "mallory"

            [[step]]
            action = "withdraw"
            account = "bob"
            "#,
        )
        .unwrap();
        let report = scenario.run(&config(10)).unwrap();

        let indices: Vec<_> = report.rejected.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 4, 5]);
        assert_eq!(report.total_staking_balance, 50);
        assert_eq!(report.participants.len(), 1);
    }

    #[test]
    fn approved_stake_can_be_withdrawn() {
        let scenario = Scenario::from_toml_str(
            r#"
            enforce_allowances = true

            [[step]]
            action = "mint"
            account = "alice"
            amount = 50

            [[step]]
            action = "approve"
            account = "alice"
            amount = 50

            [[step]]
            action = "deposit"
            account = "alice"
            amount = 50

            [[step]]
            action = "withdraw"
            account = "alice"
            "#,
        )
        .unwrap();
        let report = scenario.run(&config(10)).unwrap();

        assert!(report.rejected.is_empty(), "{:?}", report.rejected);
        assert_eq!(report.total_staking_balance, 0);
        assert_eq!(report.holding_balance, 0);
        assert!(!report.participants[0].state.is_staking);
    }

    #[test]
    fn mining_clock_ticks_per_operation() {
        let scenario = Scenario::from_toml_str(
            r#"
            mining = true

            [[step]]
            action = "mint"
            account = "alice"
            amount = 10

            [[step]]
            action = "deposit"
            account = "alice"
            amount = 10
            "#,
        )
        .unwrap();
        let report = scenario.run(&config(10)).unwrap();
        assert_eq!(report.participants[0].state.last_reward_unit, TimeUnit::new(1));
    }

    #[test]
    fn report_serializes_to_json() {
        let scenario = Scenario::from_toml_str(TWO_STAKERS).unwrap();
        let report = scenario.run(&config(1000)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["participants"][1]["staking_balance"], 300);
        assert_eq!(json["participants"][1]["participant"], "bob");
    }

    #[test]
    fn loads_scenario_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.toml");
        std::fs::write(&path, TWO_STAKERS).unwrap();
        let scenario = Scenario::from_toml_file(&path).unwrap();
        assert_eq!(scenario.steps.len(), 7);
    }
}
