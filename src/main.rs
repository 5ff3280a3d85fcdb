//! Route registry service.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                ROUTE REGISTRY                │
//!                    │                                              │
//!   Event feed       │  ┌──────────┐      ┌───────────────────────┐ │
//!   (stdin, JSON) ───┼─▶│  events  │─────▶│ registry              │ │
//!                    │  │  intake  │      │  Uri → Pool (RwLock)  │ │
//!                    │  └──────────┘      └───────────┬───────────┘ │
//!                    │                                │             │
//!                    │          ┌─────────────────────┤             │
//!                    │          ▼                     ▼             │
//!                    │  ┌──────────────┐     ┌─────────────────┐    │
//!                    │  │ pruner       │     │ lookup          │────┼──▶ proxy layer
//!                    │  │ (interval)   │     │ exact/wildcard  │    │
//!                    │  └──────────────┘     └─────────────────┘    │
//!                    │                                              │
//!                    │  config · lifecycle · observability          │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::BufReader;

use route_registry::config::{load_config, RouterConfig};
use route_registry::events::EventIntake;
use route_registry::lifecycle::{signals, startup, Shutdown};
use route_registry::observability::{logging, metrics};
use route_registry::RouteRegistry;

#[derive(Parser)]
#[command(name = "route-registry")]
#[command(about = "Routing table for a reverse-proxy gateway", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the route table as JSON on shutdown.
    #[arg(long)]
    dump_on_exit: bool,
}

/// A pending blocking stdin read would otherwise hold the runtime open.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(cli));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    result
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("route-registry v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        prune_interval_secs = config.registry.prune_interval_secs,
        stale_threshold_secs = config.registry.stale_threshold_secs,
        start_response_delay_secs = config.registry.start_response_delay_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry = Arc::new(RouteRegistry::from_config(&config.registry));
    registry.start_pruning_cycle();

    let shutdown = Shutdown::new();
    let intake = EventIntake::new(registry.clone());
    let intake_task = tokio::spawn(
        intake.run(BufReader::new(tokio::io::stdin()), shutdown.subscribe()),
    );

    startup::await_start_response_delay(&registry, config.registry.start_response_delay()).await;

    signals::wait_for_shutdown_signal().await?;
    let notified = shutdown.trigger();
    tracing::info!(notified, "Shutdown signal received, stopping event intake");

    match intake_task.await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Event intake failed"),
        Err(e) => tracing::error!(error = %e, "Event intake task aborted"),
    }

    registry.stop_pruning_cycle().await;

    if cli.dump_on_exit {
        println!("{}", String::from_utf8_lossy(&registry.to_json()?));
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
