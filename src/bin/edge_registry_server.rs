//! Runs the edge device registry HTTP server and health monitor.
//!
//! Usage:
//!
//! ```text
//! edge-registry-server [--config registry.yaml] [--bind 0.0.0.0:8082] [-v]
//! ```

use camino::Utf8PathBuf;
use clap::Parser;
use edge_registry::access::{AccessGate, TracingAuthTelemetry};
use edge_registry::api::{ApiState, router};
use edge_registry::config::{AppConfig, ConfigOverrides};
use edge_registry::device::adapters::file::FileDeviceStore;
use edge_registry::device::adapters::http::HttpCapabilityProber;
use edge_registry::device::services::{
    DeviceRegistryService, DiscoveryCoordinator, HealthMonitor,
};
use edge_registry::telemetry::init_tracing;
use mockable::DefaultClock;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "edge-registry-server", version, about)]
struct Cli {
    /// YAML configuration file.
    #[arg(long)]
    config: Option<Utf8PathBuf>,
    /// Listen address, overriding configuration.
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Raise log verbosity; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let config = AppConfig::load(&ConfigOverrides {
        config_path: cli.config,
        bind_addr: cli.bind,
    })?;
    init_tracing(&config.logging, cli.verbose)?;

    let store = Arc::new(FileDeviceStore::open(&config.store.path).await?);
    let prober = Arc::new(HttpCapabilityProber::new(config.prober.clone())?);
    let clock = Arc::new(DefaultClock);

    let discovery = Arc::new(DiscoveryCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&prober),
        Arc::clone(&clock),
        &config.discovery,
    ));
    let registry = Arc::new(DeviceRegistryService::new(Arc::clone(&store)));
    let monitor = HealthMonitor::new(
        Arc::clone(&store),
        Arc::clone(&prober),
        Arc::clone(&clock),
        config.health.clone(),
    );
    let gate = Arc::new(AccessGate::from_config(
        &config.auth,
        Arc::new(TracingAuthTelemetry),
    ));
    info!(mode = %config.auth.mode, "access gate configured");

    let cancel = CancellationToken::new();
    let monitor_cancel = cancel.clone();
    let monitor_task = tokio::spawn(async move { monitor.run(monitor_cancel).await });

    let app = router(ApiState::new(discovery, registry, clock), gate);
    let listener = TcpListener::bind(config.server.bind_addr).await?;
    info!(addr = %listener.local_addr()?, store = %config.store.path, "edge registry listening");

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for shutdown signal");
            }
            shutdown.cancel();
        })
        .await?;

    cancel.cancel();
    monitor_task.await?;
    info!("edge registry stopped");
    Ok(())
}
