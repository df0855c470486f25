//! Same-origin API forwarding proxy.
//!
//! Forwards everything below each mount prefix to that mount's upstream,
//! so browser code can reach backend APIs without cross-origin requests.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                FORWARDING PROXY              │
//!                        │                                              │
//!   Client Request       │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ─────────────────────┼─▶│  axum   │──▶│  mount   │──▶│  request  │  │
//!   /api/proxy/v1/claims │  │ router  │   │ segments │   │ headers + │  │
//!                        │  └─────────┘   └──────────┘   │   body    │  │
//!                        │                               └─────┬─────┘  │
//!                        │                                     ▼        │
//!   Client Response      │  ┌──────────┐              ┌─────────────┐  │
//!   ◀────────────────────┼──│ response │◀─────────────│ hyper client│◀─┼── Upstream
//!   + x-proxied-by       │  │  relay   │              │ (no redirect│  │   API_URL
//!                        │  └──────────┘              │  following) │  │
//!                        │                            └─────────────┘  │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use skinzai_proxy::config::{load_config, ProxyConfig};
use skinzai_proxy::observability::logging;
use skinzai_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "skinzai-proxy")]
#[command(about = "Forwards mounted API paths to their upstream services", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    logging::init(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        "skinzai-proxy starting"
    );

    // Validates overrides too, and resolves upstreams from the environment once.
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
