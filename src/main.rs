//! Local stub HTTP server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::listener (127.0.0.1:port)
//!                        │
//!                        ▼
//!                     http::handler ──▶ capture::CaptureLog (always)
//!                        │
//!                        ▼
//!                     http::dispatcher ──▶ routing::RouteTable
//!                        │
//!     Client Response    ▼
//!     ◀────────────── configured response | 404 fallback
//! ```
//!
//! Routes come from a TOML file and can be hot reloaded with `--watch`.

use std::path::PathBuf;

use clap::Parser;
use local_web_server::config::{load_config, watcher::ConfigWatcher, ServerConfig};
use local_web_server::lifecycle::signals::shutdown_signal;
use local_web_server::observability::{logging, metrics};
use local_web_server::StubServer;

#[derive(Parser)]
#[command(name = "local-web-server")]
#[command(about = "Serve canned HTTP responses on a loopback port and record every request", long_about = None)]
struct Cli {
    /// Route configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to bind, overriding the configuration file.
    #[arg(short, long)]
    port: Option<u16>,

    /// Reload routes when the configuration file changes.
    #[arg(short, long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listener.port = port;
    }

    logging::init(&config.observability.log_level)?;
    tracing::info!("local-web-server v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut server = StubServer::with_config(&config)?;
    let addr = server.start().await?;
    tracing::info!(
        address = %addr,
        uri = %server.uri()?,
        routes = config.routes.len(),
        "Ready"
    );

    // Keep the watcher alive for the lifetime of the server.
    let mut _watcher = None;
    let mut updates = None;
    if let (true, Some(path)) = (cli.watch, &cli.config) {
        let (watcher, rx) = ConfigWatcher::new(path);
        _watcher = Some(watcher.run()?);
        updates = Some(rx);
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(new_config) = next_update(&mut updates) => {
                if let Err(e) = server.replace_routes(&new_config.routes) {
                    tracing::error!(error = %e, "Failed to apply reloaded routes");
                }
            }
        }
    }

    server.stop().await?;
    tracing::info!(captured = server.captured_count(), "Shutdown complete");
    Ok(())
}

async fn next_update(
    updates: &mut Option<tokio::sync::mpsc::UnboundedReceiver<ServerConfig>>,
) -> Option<ServerConfig> {
    match updates {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
