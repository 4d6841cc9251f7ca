//! TokenFarm command-line entry point.

mod scenario;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokenfarm_farm::FarmConfig;
use tokenfarm_utils::LogFormat;

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "tokenfarm", about = "Staking and reward-accrual ledger tools")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "TOKENFARM_CONFIG")]
    config: Option<PathBuf>,

    /// Reward minted per time unit across the whole pool.
    #[arg(long, env = "TOKENFARM_REWARD_PER_UNIT")]
    reward_per_unit: Option<u64>,

    /// Identity allowed to run full-pool distribution.
    #[arg(long, env = "TOKENFARM_DISTRIBUTOR")]
    distributor: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TOKENFARM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TOKENFARM_LOG_FORMAT")]
    log_format: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the effective configuration as TOML.
    #[command(name = "init-config")]
    InitConfig,
    /// Replay a scenario file against in-memory assets and print the final state.
    Simulate {
        /// Scenario TOML file.
        #[arg(long)]
        scenario: PathBuf,

        /// Pretty-print the JSON report.
        #[arg(long)]
        pretty: bool,
    },
}

impl Cli {
    /// Load the file config (if any) and apply flag and env overrides.
    fn resolve_config(&self) -> anyhow::Result<FarmConfig> {
        let mut config = match &self.config {
            Some(path) => FarmConfig::from_toml_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => FarmConfig::default(),
        };
        if let Some(rate) = self.reward_per_unit {
            config.reward_per_unit = rate;
        }
        if let Some(distributor) = &self.distributor {
            config.distributor = distributor.as_str().into();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    match cli.command {
        Command::InitConfig => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Simulate { scenario, pretty } => {
            let format: LogFormat = config.log_format.parse()?;
            tokenfarm_utils::init_logging(format, &config.log_level)?;
            if let Some(path) = &cli.config {
                tracing::info!("Loaded config from {}", path.display());
            }

            let scenario = Scenario::from_toml_file(&scenario)?;
            tracing::info!(
                steps = scenario.steps.len(),
                reward_per_unit = config.reward_per_unit,
                distributor = %config.distributor,
                "starting simulation"
            );
            let report = scenario.run(&config)?;
            if !report.rejected.is_empty() {
                tracing::warn!(rejected = report.rejected.len(), "some steps were rejected");
            }

            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{json}");
            tracing::info!("simulation finished at unit {}", report.final_unit);
        }
    }

    Ok(())
}
