//! Prometheus exporter for cryptonight mining pool statistics.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use cpool_exporter_prometheus::{HttpServer, PoolConfig, StatsCollector};

/// Prometheus exporter for cryptonight mining pool statistics.
#[derive(Parser, Debug)]
#[command(name = "cpool-exporter-prometheus")]
#[command(about = "Export cryptonight pool daemon stats as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Address on which to expose metrics and web interface.
    #[arg(long = "web.listen-address", default_value = "0.0.0.0:10335")]
    listen: String,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path", default_value = "/metrics")]
    telemetry_path: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("cpool_exporter_prometheus={}", log_level).parse()?)
        .add_directive(format!("hyper={}", Level::WARN).parse()?)
        .add_directive(format!("reqwest={}", Level::WARN).parse()?);

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Cryptonight Pool Stats Exporter");

    if !args.telemetry_path.starts_with('/') {
        anyhow::bail!("Metrics path must start with /");
    }

    let listen_addr = args
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    // Fail fast on a misconfigured environment instead of surfacing the
    // error on the first scrape. The environment is still re-read per
    // scrape, so later address-list changes are picked up.
    let config = PoolConfig::from_env()?;
    info!(
        pools = ?config.dial_addrs,
        port = %config.port,
        proto = %config.proto,
        timeout_secs = config.timeout_secs,
        "Configuration resolved"
    );

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let collector = Arc::new(StatsCollector::new());
    let http_server = HttpServer::new(collector.clone(), listen_addr, args.telemetry_path);

    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.run(shutdown_rx).await {
            error!("HTTP server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = tokio::signal::unix::signal(
                    tokio::signal::unix::SignalKind::terminate()
                ).unwrap();
                sigterm.recv().await;
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    // Signal shutdown
    shutdown_tx.send(true)?;

    let _ = tokio::time::timeout(Duration::from_secs(5), http_task).await;

    // Print final stats
    let stats = collector.stats();
    info!(
        scrapes = stats.scrapes,
        pool_errors = stats.pool_errors,
        "Final statistics"
    );

    info!("Exporter stopped");
    Ok(())
}
