//! Multi-network deployer for the staking contract stacks.
//!
//! ```bash
//! # Deploy the Matic stack to the Mumbai testnet
//! STAKEDEPLOY_SIGNER_KEY=... stakedeploy deploy --network MaticTest --stack matic
//!
//! # Deploy the Ethereum stack from a custom plan file, recording a manifest
//! stakedeploy deploy --network Ethereum --plan plan.toml --manifest run.json
//!
//! # List resolvable networks
//! stakedeploy networks
//! ```
//!
//! # Environment variables
//!
//! - `STAKEDEPLOY_CONFIG` — Path to the TOML configuration file
//!   (default: `stakedeploy.toml`)
//! - `STAKEDEPLOY_SIGNER_KEY` — Signing key for the built-in networks
//! - `RUST_LOG` — Log level filter (default: `info`)
//!
//! Exit status is 0 on success and 1 on any failure; the first failing step
//! aborts the run with no rollback.

mod config;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use stakedeploy::{
    ConfigError, DeploymentManifest, DeploymentPlan, NetworkProfile, StackKind,
};
use stakedeploy_evm::{ArtifactStore, DeployerOptions, EvmDeployer};
use tracing_subscriber::EnvFilter;

use crate::config::DeployConfig;

#[derive(Debug, Parser)]
#[command(name = "stakedeploy", version, about = "Multi-network EVM staking-contract deployer")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, env = "STAKEDEPLOY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Deploy a contract stack to one network and wire it together.
    Deploy(DeployArgs),
    /// List the networks the current configuration can resolve.
    Networks,
}

#[derive(Debug, clap::Args)]
struct DeployArgs {
    /// Target network name (e.g. `MaticTest`, `HecoTest`).
    #[arg(long)]
    network: String,

    /// Built-in stack to deploy.
    #[arg(long, value_parser = parse_stack, conflicts_with = "plan")]
    stack: Option<StackKind>,

    /// Custom deployment plan (TOML) instead of a built-in stack.
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Directory containing the Hardhat artifacts.
    #[arg(long, default_value = "artifacts")]
    artifacts: PathBuf,

    /// Write a JSON manifest of the run to this path.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Validate the plan and print the steps without sending anything.
    #[arg(long)]
    dry_run: bool,

    /// Seconds to wait for each transaction receipt.
    #[arg(long, default_value_t = 120)]
    receipt_timeout: u64,
}

fn parse_stack(s: &str) -> Result<StackKind, String> {
    s.parse().map_err(|e: ConfigError| e.to_string())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = DeployConfig::load(cli.config.as_deref())?;
    let registry = config.registry();

    match cli.command {
        Command::Networks => {
            for (name, chain_id) in registry.names() {
                let ready = registry.resolve(name).is_ok();
                println!(
                    "{name:<12} chain_id={chain_id:<8} {}",
                    if ready { "ready" } else { "no credential" }
                );
            }
            Ok(())
        }
        Command::Deploy(args) => deploy(&registry.resolve(&args.network)?, &args).await,
    }
}

async fn deploy(profile: &NetworkProfile, args: &DeployArgs) -> Result<(), Box<dyn std::error::Error>> {
    let plan = match (&args.stack, &args.plan) {
        (Some(stack), None) => stack.plan(),
        (None, Some(path)) => load_plan(path)?,
        _ => {
            return Err(Box::new(ConfigError::InvalidPlan {
                reason: "exactly one of --stack or --plan is required".to_owned(),
            }));
        }
    };
    plan.validate()?;

    tracing::info!(
        network = %profile.name,
        chain_id = profile.chain_id,
        contracts = plan.specs.len(),
        links = plan.links.len(),
        "Starting deployment run"
    );

    if args.dry_run {
        for spec in &plan.specs {
            println!("deploy {} ({} constructor args)", spec.contract, spec.args.len());
        }
        for link in &plan.links {
            println!("link   {}.addManager(..)", link.target);
        }
        return Ok(());
    }

    let contracts: Vec<&str> = plan.specs.iter().map(|s| s.contract.as_str()).collect();
    let artifacts = ArtifactStore::load(&args.artifacts, &contracts)?;

    let options = DeployerOptions {
        receipt_timeout_secs: args.receipt_timeout,
        ..DeployerOptions::default()
    };
    let deployer = EvmDeployer::connect(profile, artifacts, options)?;
    let deployer_address = deployer.signer_address();

    let outcome = stakedeploy::run(&deployer, &plan).await?;

    for handle in &outcome.handles {
        println!("{} address: {}", handle.contract, handle.address);
    }

    if let Some(path) = &args.manifest {
        let manifest =
            DeploymentManifest::new(&profile.name, profile.chain_id, deployer_address, &outcome);
        manifest.write(path)?;
        tracing::info!(path = %path.display(), "Wrote deployment manifest");
    }

    Ok(())
}

fn load_plan(path: &Path) -> Result<DeploymentPlan, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::File {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
