//! Farm configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokenfarm_types::AccountId;

use crate::FarmError;

/// Configuration for a farm instance.
///
/// Can be loaded from a TOML file via [`FarmConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmConfig {
    /// Reward minted per time unit across the whole pool (raw units).
    /// TOML integers are 64-bit, so the configured rate is a `u64`.
    #[serde(default = "default_reward_per_unit")]
    pub reward_per_unit: u64,

    /// Stake-asset account that custodies deposits.
    #[serde(default = "default_holding_account")]
    pub holding_account: AccountId,

    /// Identity allowed to run full-pool distribution.
    #[serde(default = "default_distributor")]
    pub distributor: AccountId,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_reward_per_unit() -> u64 {
    1_000_000
}

fn default_holding_account() -> AccountId {
    AccountId::new("farm")
}

fn default_distributor() -> AccountId {
    AccountId::new("owner")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl FarmConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, FarmError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| FarmError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, FarmError> {
        let config: Self = toml::from_str(s).map_err(|e| FarmError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, FarmError> {
        toml::to_string_pretty(self).map_err(|e| FarmError::Config(e.to_string()))
    }

    /// Reject identities the farm cannot work with.
    pub fn validate(&self) -> Result<(), FarmError> {
        if !self.holding_account.is_valid() {
            return Err(FarmError::Config(format!(
                "invalid holding account {:?}",
                self.holding_account.as_str()
            )));
        }
        if !self.distributor.is_valid() {
            return Err(FarmError::Config(format!(
                "invalid distributor {:?}",
                self.distributor.as_str()
            )));
        }
        Ok(())
    }
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            reward_per_unit: default_reward_per_unit(),
            holding_account: default_holding_account(),
            distributor: default_distributor(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = FarmConfig::from_toml_str("").unwrap();
        assert_eq!(config, FarmConfig::default());
    }

    #[test]
    fn toml_overrides_fields() {
        let config = FarmConfig::from_toml_str(
            r#"
            reward_per_unit = 42
            distributor = "treasury"
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.reward_per_unit, 42);
        assert_eq!(config.distributor, AccountId::new("treasury"));
        assert_eq!(config.holding_account, AccountId::new("farm"));
        assert_eq!(config.log_format, "json");
    }

    #[test]
    fn toml_roundtrip() {
        let config = FarmConfig {
            reward_per_unit: 7,
            ..FarmConfig::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(FarmConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn invalid_distributor_is_rejected() {
        let result = FarmConfig::from_toml_str(r#"distributor = """#);
        assert!(matches!(result, Err(FarmError::Config(_))));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("farm.toml");
        std::fs::write(&path, "reward_per_unit = 9\n").unwrap();
        let config = FarmConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.reward_per_unit, 9);

        let missing = FarmConfig::from_toml_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(FarmError::Config(_))));
    }
}
