//! Prompt admission gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /query
//!        │
//!        ▼
//!   ┌──────────┐   ┌──────────────┐   ┌──────────────┐   ┌─────────┐
//!   │ identity │──▶│ origin rate  │──▶│ key rate     │──▶│  quota  │
//!   └──────────┘   └──────────────┘   └──────────────┘   └────┬────┘
//!                                                             │
//!   ┌──────────┐   ┌──────────────┐   ┌──────────────┐   ┌────▼────┐
//!   │ content  │◀──│    dedup     │◀──│   template   │◀──│normalize│
//!   └────┬─────┘   └──────────────┘   └──────────────┘   └─────────┘
//!        │
//!        ▼
//!   ┌──────────┐   ┌──────────────┐
//!   │ backend  │──▶│  redaction   │──▶ {"result": ...}
//!   └──────────┘   └──────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use prompt_gateway::config::{load_startup_config, ObservabilityConfig};
use prompt_gateway::lifecycle::{build_gateway, wait_for_shutdown, StartupError};
use prompt_gateway::observability::{logging, metrics};
use prompt_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "prompt-gateway")]
#[command(about = "Admission-control gateway in front of an LLM backend", long_about = None)]
struct Args {
    /// TOML configuration file. Falls back to GATEWAY_CONFIG, then defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_startup_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(StartupError::from(e).into());
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!("prompt-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let gateway = build_gateway(&config).await?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        shutdown.trigger();
    });

    HttpServer::new(config, gateway)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
