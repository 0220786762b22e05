//! GLZ API proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!   event (JSON)           ┌───────────┐    ┌──────────┐    ┌─────────────────────────┐
//!   ──────────────────────▶│ invocation│───▶│ routing  │───▶│ resilience::retries     │
//!   (invoke / HTTP serve)  │  parser   │    │ resolver │    │  ┌───────────────────┐  │
//!                          └─────┬─────┘    └────┬─────┘    │  │ upstream::client  │──┼──▶ GLZ API
//!                                │ 400           │ 400      │  │ upstream::classify│  │
//!   envelope               ◀─────┴───────────────┴──────────┤  └───────────────────┘  │
//!   {statusCode, body, headers}                             └─────────────────────────┘
//! ```

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use glz_api_proxy::config::{load_config, ProxyConfig};
use glz_api_proxy::observability::{logging, metrics};
use glz_api_proxy::{HttpServer, InvocationContext, Proxy, Shutdown};

#[derive(Parser)]
#[command(name = "glz-api-proxy")]
#[command(about = "Translation proxy for the GLZ content API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the proxy routes over HTTP
    Serve {
        /// Override `server.bind_address`
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Handle a single event and print the envelope
    Invoke {
        /// File holding the event JSON; stdin when omitted
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(
        base_url = %config.upstream.base_url,
        max_retries = config.retries.max_retries,
        backoff_ms = config.retries.backoff_ms,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Serve { bind } => serve(config, bind).await,
        Commands::Invoke { event } => invoke(config, event).await,
    }
}

async fn serve(
    mut config: ProxyConfig,
    bind: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let proxy = Arc::new(Proxy::new(config)?);

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    HttpServer::new(proxy).run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn invoke(
    config: ProxyConfig,
    event: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = match event {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let event: serde_json::Value = serde_json::from_str(&raw)?;

    let proxy = Proxy::new(config)?;
    let envelope = proxy.handle(&event, &InvocationContext::new()).await;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
