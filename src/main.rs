//! SPA static asset server.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                    ASSET SERVER                       │
//!                      │                                                       │
//!   Client Request     │  ┌────────┐   ┌───────────┐   ┌──────────────────┐   │
//!   ───────────────────┼─▶│  http  │──▶│  assets   │──▶│ locator (roots)  │◀──┼── filesystem
//!                      │  │ server │   │ resolver  │   └──────────────────┘   │
//!                      │  └────────┘   └─────┬─────┘                           │
//!                      │                     │ ResolvedAsset                   │
//!   Client Response    │  ┌──────────┐       ▼                                 │
//!   ◀──────────────────┼──│ response │◀── ServeFile + HeaderPolicy            │
//!                      │  └──────────┘                                         │
//!                      │                                                       │
//!                      │  config · observability · lifecycle                   │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use spa_server::config::{apply_env_overrides, load_config, validate_config, ConfigError, ServerConfig};
use spa_server::observability::{init_logging, init_metrics};
use spa_server::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "spa-server")]
#[command(about = "Static asset server for single-page applications", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Asset root, searched in the order given. Replaces configured roots.
    #[arg(short, long = "root")]
    roots: Vec<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:7105.
    #[arg(short, long)]
    bind: Option<String>,
}

fn resolve_config(args: &Args) -> Result<ServerConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    if !args.roots.is_empty() {
        config.assets.roots = args.roots.clone();
    }
    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    init_logging(&config.observability)?;

    tracing::info!("spa-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        roots = ?config.assets.roots,
        base_url = %config.assets.base_url,
        request_timeout_secs = config.listener.request_timeout_secs,
        "Configuration loaded"
    );

    if !config.observability.telemetry_disabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
