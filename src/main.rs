//! meshping Binary Entry Point
//!
//! Loads the configuration named by the single command-line argument and runs
//! the reachability monitor until SIGTERM, SIGQUIT or Ctrl+C.

use std::path::PathBuf;

use clap::Parser;
use meshping::{MeshConfig, Monitor};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// meshping - full-mesh reachability checks over SSH + fping
#[derive(Parser, Debug)]
#[command(name = "meshping", version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,meshping=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Exactly one positional argument; clap exits non-zero otherwise
    let cli = Cli::parse();

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = MeshConfig::load(&cli.config).map_err(|e| {
        tracing::error!(error = %e, "error parsing config");
        e
    })?;

    tracing::info!(
        "Monitoring {} hosts as '{}', schedule: {}, output: {}",
        config.hosts.len(),
        config.username,
        config.schedule()?,
        config.output,
    );

    let summary = Monitor::new(config).run(shutdown_signal()).await?;

    tracing::info!(
        rendered = summary.rendered,
        aborted = summary.drain.aborted,
        "Shutdown complete"
    );
    Ok(())
}

/// Resolve on Ctrl+C, SIGTERM or SIGQUIT.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = unix_signal(tokio::signal::unix::SignalKind::terminate());
    #[cfg(unix)]
    let quit = unix_signal(tokio::signal::unix::SignalKind::quit());

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    #[cfg(not(unix))]
    let quit = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
        _ = quit => {
            tracing::info!("Received quit signal");
        }
    }
}

#[cfg(unix)]
async fn unix_signal(kind: tokio::signal::unix::SignalKind) {
    match tokio::signal::unix::signal(kind) {
        Ok(mut signal) => {
            signal.recv().await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install signal handler");
            std::future::pending::<()>().await;
        }
    }
}
