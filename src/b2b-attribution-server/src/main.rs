//! B2B attribution server — entry point.
//!
//! Main entry point that wires up the in-memory collaborators and starts
//! the HTTP server.

mod memory;

use b2b_attribution_api::ApiServer;
use b2b_attribution_core::EngineConfig;
use b2b_attribution_engine::AttributionFacade;
use clap::Parser;
use memory::{InMemoryResultWriter, InMemoryStorage};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "b2b-attribution-server")]
#[command(about = "B2B marketing attribution engine")]
#[command(version)]
struct Cli {
    /// HTTP bind address (overrides config)
    #[arg(long, env = "ATTRIBUTION__API__HOST")]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "ATTRIBUTION__API__PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "b2b_attribution=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("B2B attribution server starting up");

    // Load configuration
    let mut config = EngineConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // Apply CLI overrides
    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.port {
        config.api.port = port;
    }

    info!(
        host = %config.api.host,
        port = config.api.port,
        "Configuration loaded"
    );

    // Relational persistence and result storage are out of scope for the
    // engine itself, so the binary ships in-memory reference collaborators.
    // They start empty; whatever process ingests leads/opportunities/
    // touchpoints ahead of a calculate request is responsible for
    // populating them.
    let storage = Arc::new(InMemoryStorage::default());
    let writer = Arc::new(InMemoryResultWriter::default());
    let facade = Arc::new(AttributionFacade::new(config.clone(), storage, writer));

    let api_server = ApiServer::new(config.api.clone(), facade);

    info!("B2B attribution server is ready to serve traffic");

    // Graceful shutdown: listen for SIGTERM/SIGINT
    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to register SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => info!("Received SIGINT, shutting down"),
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
            info!("Received SIGINT, shutting down");
        }
    };

    // Start HTTP server with graceful shutdown
    let addr = std::net::SocketAddr::new(config.api.host.parse()?, config.api.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Starting HTTP server");
    axum::serve(listener, api_server.router())
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("B2B attribution server shut down cleanly");
    Ok(())
}
