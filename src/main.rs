//! crewmesh - coordination service for cooperating agent instances.
//!
//! Main entry point: parses flags, starts the background sweeper, and
//! serves the HTTP surface until ctrl-c.

use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crewmesh_api::{ApiConfig, ApiServer};
use crewmesh_core::{CoordConfig, Coordinator, spawn_sweeper};

/// crewmesh CLI.
#[derive(Parser)]
#[command(name = "crewmesh")]
#[command(about = "Coordination service for cooperating agent instances")]
#[command(version)]
struct Cli {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Resource claim TTL in seconds
    #[arg(long, default_value_t = 1800)]
    claim_ttl_secs: u64,

    /// Seconds between background sweep passes
    #[arg(long, default_value_t = 300)]
    sweep_interval_secs: u64,

    /// Seconds of silence before an instance is marked offline
    #[arg(long, default_value_t = 600)]
    instance_stale_secs: u64,

    /// Disable the background sweeper
    #[arg(long)]
    no_sweep: bool,
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    info!("Starting crewmesh v{}", env!("CARGO_PKG_VERSION"));

    let config = CoordConfig {
        claim_ttl_secs: cli.claim_ttl_secs,
        sweep_interval_secs: cli.sweep_interval_secs,
        instance_stale_secs: cli.instance_stale_secs,
        sweep_enabled: !cli.no_sweep,
    };
    let coordinator = Arc::new(Coordinator::new(config));

    let (shutdown_tx, _) = broadcast::channel(4);

    let sweeper = if coordinator.config().sweep_enabled {
        Some(spawn_sweeper(
            Arc::clone(&coordinator),
            shutdown_tx.subscribe(),
        ))
    } else {
        info!("Background sweeper disabled");
        None
    };

    let server = ApiServer::new(
        ApiConfig {
            host: cli.host,
            port: cli.port,
        },
        Arc::clone(&coordinator),
    );
    let server_shutdown = shutdown_tx.subscribe();

    tokio::select! {
        result = server.run(server_shutdown) => {
            if let Err(err) = result {
                error!("Server error: {}", err);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received ctrl-c, shutting down");
        }
    }

    let _ = shutdown_tx.send(());
    if let Some(handle) = sweeper {
        let _ = handle.await;
    }

    info!("Shutdown complete");
    Ok(())
}
