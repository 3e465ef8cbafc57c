//! The `fedeval` command line.
//!
//! [`run`] executes parsed [`Args`] and writes command output to any
//! [`Write`]r; the binary passes stdout.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::config::CONFIG_ENV;
use crate::{start_server, ClientReport, Config, Denominator, MetricsAggregator, ReplayRuntime};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "fedeval",
    version,
    about = "Weighted evaluation-metric aggregation for FedAvg servers"
)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// `fedeval` subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load, override and validate a server config
    ValidateConfig {
        /// Config location
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Aggregate one round of client reports and print the result as JSON
    Aggregate {
        /// JSON array of {"num_examples": n, "metrics": {...}}
        #[clap(long)]
        reports: PathBuf,

        /// per_metric or global
        #[clap(long, default_value_t = Denominator::PerMetric)]
        denominator: Denominator,
    },
    /// Replay recorded evaluation rounds through the configured strategy
    Replay {
        /// Config location
        #[command(flatten)]
        config: ConfigArgs,

        /// JSON array of recorded rounds
        #[clap(long)]
        rounds: PathBuf,
    },
}

/// Where the server config lives.
#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the server config TOML
    #[clap(long, env = CONFIG_ENV)]
    pub config: PathBuf,
}

fn load_config(args: &ConfigArgs) -> Result<Config> {
    let mut config = Config::load_from_file(&args.config)?;
    config
        .apply_env_overrides()
        .context("failed to apply environment overrides")?;
    config
        .validate()
        .with_context(|| format!("invalid server config {:?}", args.config))?;
    Ok(config)
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {} file {:?}", what, path))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {} file {:?}", what, path))
}

/// Execute a parsed command, writing its output to `out`.
pub fn run(args: Args, out: &mut impl Write) -> Result<()> {
    match args.command {
        Commands::ValidateConfig { config } => match load_config(&config) {
            Ok(config) => {
                info!(
                    address = %config.server.address,
                    num_rounds = config.server.num_rounds,
                    "Config is OK"
                );
                writeln!(out, "Config is OK")?;
            }
            Err(e) => {
                error!("Error found in config: {:#}", e);
                return Err(e.context("config validation failed"));
            }
        },
        Commands::Aggregate {
            reports,
            denominator,
        } => {
            let reports: Vec<ClientReport> = read_json_file(&reports, "reports")?;
            let metrics = MetricsAggregator::new(denominator).aggregate(&reports)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&metrics)?)?;
        }
        Commands::Replay { config, rounds } => {
            let config = load_config(&config)?;
            let mut runtime = ReplayRuntime::new(read_json_file(&rounds, "rounds")?);
            let history = start_server(&config, &mut runtime)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&history)?)?;
        }
    }

    Ok(())
}
