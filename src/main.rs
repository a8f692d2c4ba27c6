//! WAN failover daemon (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                        wan-failover                          │
//!   │                                                              │
//!   │  ┌────────┐   ┌─────────────────────┐   ┌─────────────────┐  │
//!   │  │ config │──▶│ FailoverController  │──▶│ ConnectivityGW  │──┼──▶ nmcli / busctl
//!   │  └────────┘   │ state + poll loop   │   │ (trait)         │──┼──▶ ping [-I dev]
//!   │               └──────────┬──────────┘   └─────────────────┘  │
//!   │                          │ after failover                    │
//!   │                          ▼                                   │
//!   │                  post-failover hook                          │
//!   │                                                              │
//!   │  lifecycle: SIGINT/SIGTERM → Shutdown broadcast              │
//!   │  observability: tracing (stdout/file), metrics (optional)    │
//!   └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use wan_failover::config::{load_or_default, FailoverConfig, DEFAULT_CONFIG_PATH};
use wan_failover::failover::{FailoverController, FailoverSettings};
use wan_failover::gateway::{ConnectivityGateway, NetworkManagerGateway};
use wan_failover::lifecycle::{wait_for_signal, Shutdown};
use wan_failover::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "wan-failover", version)]
#[command(about = "Fail over to a backup connection when the primary path loses internet", long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults are used when it does not exist.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Probe connectivity once and exit 0 (connected) or 1 (not connected).
    #[arg(long)]
    check: bool,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config file {}: {}",
                cli.config.display(),
                e
            );
            FailoverConfig::default()
        }
    };

    logging::init_logging(&config.logging, cli.log_level.as_deref())?;

    let gateway = Arc::new(NetworkManagerGateway::new(
        config.check_host.clone(),
        &config.probe,
        config.backup_link.clone(),
    ));

    if cli.check {
        return Ok(if gateway.probe(None).await {
            println!("Connected to internet");
            ExitCode::SUCCESS
        } else {
            println!("No internet connection");
            ExitCode::FAILURE
        });
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        backup = %config.backup_connection_name,
        check_host = %config.check_host,
        "wan-failover starting"
    );

    if config.metrics.enabled {
        match config.metrics.address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.metrics.address,
                "Failed to parse metrics address"
            ),
        }
    }

    let controller = FailoverController::new(gateway, FailoverSettings::from(&config));
    let shutdown = Shutdown::new();
    let monitor = tokio::spawn(controller.run(shutdown.subscribe()));

    let signal = wait_for_signal().await?;
    tracing::info!(signal, "Shutdown signal received");
    shutdown.trigger();

    let state = monitor.await?;
    tracing::info!(
        backup_active = state.backup_active(),
        "Shutdown complete"
    );
    Ok(ExitCode::SUCCESS)
}
