//! Certflow - Main entry point
//!
//! Automates certificate issuance and renewal for nginx-served domains by
//! orchestrating certbot and the nginx control path.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use certflow_common::{DomainSelector, SystemRunner};
use certflow_config::Settings;
use certflow_orchestrator::{flows, Orchestrator};

/// Certflow - certificate lifecycle automation for nginx and certbot
#[derive(Parser, Debug)]
#[command(name = "certflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a proxy config and obtain the first certificate for a domain
    Create {
        #[command(flatten)]
        target: Target,

        /// Upstream port for the new service config
        #[arg(long = "port")]
        port: String,

        /// Settings file path
        #[arg(short = 'c', long = "config", default_value = "config.json")]
        config: PathBuf,
    },
    /// Renew the certificate for an existing domain
    Update {
        #[command(flatten)]
        target: Target,

        /// Settings file path
        #[arg(short = 'c', long = "config", default_value = "config.json")]
        config: PathBuf,
    },
    /// Scan the certificate inventory and renew anything near expiry
    Cron {
        /// Settings file path
        #[arg(short = 'c', long = "config", default_value = "config.json")]
        config: PathBuf,
    },
}

/// Domain selection: exactly one of a subdomain or the primary domain.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Target {
    /// Subdomain of the configured primary domain
    subdomain: Option<String>,

    /// Operate on the primary domain itself
    #[arg(long = "main")]
    main: bool,
}

impl Target {
    fn into_selector(self) -> DomainSelector {
        match self.subdomain {
            Some(sub) if !self.main => DomainSelector::Sub(sub),
            _ => DomainSelector::Main,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Create {
            target,
            port,
            config,
        } => cmd_create(&config, target, &port),
        Commands::Update { target, config } => cmd_update(&config, target),
        Commands::Cron { config } => cmd_cron(&config),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn load_settings(path: &Path) -> Result<Settings> {
    Settings::load(path).with_context(|| format!("failed to load settings from {}", path.display()))
}

fn cmd_create(config_path: &Path, target: Target, port: &str) -> Result<()> {
    let settings = load_settings(config_path)?;
    let selector = target.into_selector();
    let runner = SystemRunner;

    Orchestrator::new(&settings, &selector, &runner).create(port);
    Ok(())
}

fn cmd_update(config_path: &Path, target: Target) -> Result<()> {
    let settings = load_settings(config_path)?;
    let selector = target.into_selector();
    let runner = SystemRunner;

    Orchestrator::new(&settings, &selector, &runner).update();
    Ok(())
}

fn cmd_cron(config_path: &Path) -> Result<()> {
    let settings = load_settings(config_path)?;
    let runner = SystemRunner;

    match flows::run_cron(&settings, &runner) {
        Ok(reports) => {
            info!(renewals = reports.len(), "Renewal scan finished");
        }
        Err(e) => {
            error!(error = %e, "Renewal scan failed");
        }
    }
    Ok(())
}
