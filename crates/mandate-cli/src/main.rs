//! Command-line interface for Mandate
//!
//! Runs the reference delegation scenario, computes counterfactual account
//! addresses, hashes delegation documents and prints the effective engine
//! configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use mandate_core::MandateConfig;
use mandate_delegation::EngineConfig;
use std::path::PathBuf;

mod commands;

use commands::{address, config, hash, scenario};

#[derive(Parser)]
#[command(name = "mandate")]
#[command(about = "Mandate - delegable authority for smart accounts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = ".mandate/config.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the alice-delegates-to-bob counter scenario
    Scenario(scenario::ScenarioArgs),

    /// Compute a deterministic deployment address
    Address(address::AddressArgs),

    /// Hash a delegation JSON document
    Hash(hash::HashArgs),

    /// Print the effective engine configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let engine_config = EngineConfig::load(Some(cli.config.as_path()))?;
    tracing::debug!(config = %cli.config.display(), "Engine configuration loaded");

    match cli.command {
        Commands::Scenario(args) => {
            let report = scenario::run(&args, engine_config)?;
            print!("{report}");
        }
        Commands::Address(args) => {
            println!("{}", address::run(&args)?);
        }
        Commands::Hash(args) => {
            print!("{}", hash::run(&args, &engine_config)?);
        }
        Commands::Config => {
            print!("{}", config::render(&engine_config)?);
        }
    }

    Ok(())
}
