//! VetMe daemon — command-line entry point for the staking ledger.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use vetme_service::{init_logging, Scenario, ServiceConfig, StakingService};
use vetme_types::{format_amount, SystemClock};
use vetme_utils::format_duration;

#[derive(Parser)]
#[command(name = "vetme", about = "VetMe staking ledger")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "VETME_CONFIG")]
    config: Option<PathBuf>,

    /// Ledger owner account (0x-prefixed hex).
    #[arg(long, env = "VETME_OWNER")]
    owner: Option<String>,

    /// Seconds between requesting and executing a withdrawal.
    #[arg(long, env = "VETME_WITHDRAW_COOLDOWN_SECS")]
    withdraw_cooldown_secs: Option<u64>,

    /// Staking pool size in whole tokens (stake cap and reward denominator).
    #[arg(long, env = "VETME_TOTAL_FOR_STAKE")]
    total_for_stake: Option<u64>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VETME_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VETME_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the effective configuration as TOML.
    Config,
    /// Initialise a ledger from the configuration and print its summary.
    Status,
    /// Replay a reward-period scenario and print a JSON report.
    Simulate {
        /// Scenario TOML file. Defaults to the built-in single-staker scenario.
        #[arg(long)]
        scenario: Option<PathBuf>,
    },
    /// Print the built-in scenario as a TOML template.
    Scenario,
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let base = match &cli.config {
        Some(path) => ServiceConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    let config = ServiceConfig {
        owner: cli.owner.clone().unwrap_or(base.owner.clone()),
        withdraw_cooldown_secs: cli
            .withdraw_cooldown_secs
            .unwrap_or(base.withdraw_cooldown_secs),
        total_for_stake: cli.total_for_stake.or(base.total_for_stake),
        log_format: cli.log_format.clone().unwrap_or(base.log_format.clone()),
        log_level: cli.log_level.clone().unwrap_or(base.log_level.clone()),
        ..base
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging(config.log_format()?, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::info!("loaded config from {}", path.display());
    }

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Status => {
            let service = StakingService::from_config(&config, Arc::new(SystemClock))?;
            let token = service.staking_token().await;
            println!("token:             {} ({})", token.name, token.symbol);
            println!("decimals:          {}", token.decimals);
            println!(
                "supply:            {}",
                format_amount(service.token_supply().await)
            );
            println!("owner:             {}", service.owner().await);
            println!("custody:           {}", service.custody().await);
            println!(
                "withdraw cooldown: {}",
                format_duration(config.withdraw_cooldown_secs)
            );
            match config.total_for_stake {
                Some(pool) => println!("pool size:         {pool}"),
                None => println!("pool size:         unbounded"),
            }
        }
        Command::Simulate { scenario } => {
            let scenario = match scenario {
                Some(path) => Scenario::from_toml_file(&path)
                    .with_context(|| format!("loading scenario from {}", path.display()))?,
                None => Scenario::single_staker(),
            };
            tracing::info!(
                name = %scenario.name,
                steps = scenario.steps.len(),
                period = %format_duration(scenario.reward_duration_secs),
                "running scenario"
            );
            let report = scenario.run(&config).await?;
            let failures = report.failures().count();
            if failures > 0 {
                tracing::warn!(failures, "some scenario steps were rejected");
            }
            println!("{}", report.to_json()?);
        }
        Command::Scenario => {
            print!("{}", Scenario::single_staker().to_toml_string()?);
        }
    }

    Ok(())
}
