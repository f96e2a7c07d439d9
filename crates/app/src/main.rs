//! `oracle-request`: compose and submit one oracle request.
//!
//! Settings come from `settings.json` under the platform config dir (or `--config`).
//! Submission goes through the dry-run ledger client.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use oracle_app::{App, AppBuilder, RequestConfig};
use oracle_logging::LogLevel;
use oracle_request::{
    derive_box_name, DryRunClient, LedgerClient, NetworkParams, RequestComposer, SchemaRegistry,
};
use tracing::info;

const SERVICE: &str = "oracle-request";

#[derive(Parser, Debug)]
#[command(name = SERVICE, version, about = "Submit a request to the oracle main contract")]
struct Cli {
    /// Settings file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Key file holding the hex-encoded account secret
    #[arg(short, long)]
    key: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, conflicts_with = "verbose")]
    log_level: Option<LogLevel>,

    /// Seconds to wait after submission (overrides settings)
    #[arg(long)]
    wait_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut builder = AppBuilder::<RequestConfig>::new(SERVICE).verbose(cli.verbose);
    if let Some(level) = cli.log_level {
        builder = builder.log_level(level);
    }
    if let Some(path) = &cli.config {
        builder = builder.config_path(path);
    }
    if let Some(path) = &cli.key {
        builder = builder.key_path(path);
    }
    let App {
        keypair, settings, ..
    } = builder.build().context("failed to initialize")?;
    let config = settings.config;
    info!(endpoint = %config.ledger.endpoint, "using dry-run ledger client");

    let client = Arc::new(DryRunClient::new(NetworkParams::from(
        config.ledger.transaction_params(),
    )));
    let composer = RequestComposer::new(SchemaRegistry::main_contract()?);

    // Fresh params per submission so the validity window starts now.
    let network_params = client.transaction_params().await?;
    let request_key = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?
        .as_millis()
        .to_string()
        .into_bytes();
    info!(
        app_id = config.app_id,
        request_key = %String::from_utf8_lossy(&request_key),
        request_box = %hex::encode(derive_box_name(&keypair.address(), &request_key)),
        "composing request"
    );

    let params = config.request_params(&keypair, &request_key, network_params)?;
    let group = composer.build_request(params)?;

    let submit_client = Arc::clone(&client);
    let wait_rounds = config.wait_rounds;
    let result = tokio::spawn(async move { submit_client.execute(&group, wait_rounds).await })
        .await
        .context("submission task failed")??;
    info!(
        round = result.confirmed_round,
        tx_ids = ?result.tx_ids,
        "request confirmed"
    );

    let wait = cli.wait_secs.unwrap_or(config.post_submit_wait_secs);
    info!("waiting {wait}s for the oracle response");
    tokio::time::sleep(Duration::from_secs(wait)).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_flag() {
        let cli = Cli::try_parse_from([SERVICE, "--log-level", "trace"]).unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Trace));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        assert!(Cli::try_parse_from([SERVICE, "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_log_level_conflicts_with_verbose() {
        assert!(Cli::try_parse_from([SERVICE, "-v", "--log-level", "warn"]).is_err());
    }
}
