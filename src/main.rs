//! LodeRunner Provisioner
//!
//! Creates the LodeRunner databases and containers on a Cosmos DB account or
//! the local emulator. Safe to run repeatedly.
//!
//! Usage:
//!   loderunner-provisioner --url https://localhost:8081 --key <KEY> --emulate

use anyhow::{Context, Result};
use clap::Parser;
use loderunner_provisioner::{
    config::{ConnectionConfig, Settings},
    error::ConfigError,
    cosmos::{wait_for_service, CosmosClient, ReadinessPolicy},
    logging::init_tracing,
    provisioner::{provision_with, ProvisioningSpec},
    report,
};
use std::collections::HashMap;
use std::io;

/// Create the LodeRunner databases and containers if they do not exist
#[derive(Parser, Debug)]
#[command(name = "loderunner-provisioner")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Account master key
    #[arg(short, long)]
    key: String,

    /// Account endpoint URL
    #[arg(short, long)]
    url: String,

    /// Target the local emulator (disables TLS certificate verification)
    #[arg(short, long)]
    emulate: bool,

    /// Log level: trace, debug, info, warn, error (overrides LOG_LEVEL env var)
    #[arg(long)]
    log_level: Option<String>,

    /// Retry an unreachable endpoint this many times (overrides COSMOS_WAIT_RETRIES)
    #[arg(long)]
    wait_retries: Option<u32>,
}

impl Args {
    /// Command-line values that take precedence over environment settings
    fn setting_overrides(&self) -> HashMap<&'static str, String> {
        let mut overrides = HashMap::new();
        if let Some(log_level) = &self.log_level {
            overrides.insert("LOG_LEVEL", log_level.clone());
        }
        if let Some(retries) = self.wait_retries {
            overrides.insert("COSMOS_WAIT_RETRIES", retries.to_string());
        }
        overrides
    }

    fn connection_config(&self) -> Result<ConnectionConfig, ConfigError> {
        ConnectionConfig::new(&self.url, &self.key, !self.emulate)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (before logging, so we can use log_level)
    let overrides = args.setting_overrides();
    let settings = Settings::load(|key| overrides.get(key).cloned())?;

    init_tracing(&settings.log_level)?;

    let config = args
        .connection_config()
        .context("Invalid connection settings")?;

    report::emit_tls_warning(&mut io::stderr(), &config)?;

    tracing::debug!(
        app_name = %settings.app_name,
        version = %settings.app_version,
        endpoint = %config.endpoint(),
        emulate = args.emulate,
        "Starting provisioning"
    );

    let policy = ReadinessPolicy::from(&settings.wait);
    let client = wait_for_service(&policy, || CosmosClient::connect(&config, &settings))
        .await
        .with_context(|| format!("Unable to connect to {}", config.endpoint()))?;

    let spec = ProvisioningSpec::lode_runner();
    let mut stdout = io::stdout();
    let mut write_error = None;

    provision_with(&client, &spec, |result| {
        if let Err(e) = report::write_result(&mut stdout, result) {
            write_error.get_or_insert(e);
        }
    })
    .await?;

    if let Some(e) = write_error {
        return Err(e).context("Failed to write status output");
    }

    Ok(())
}
