//! Email validation webhook service.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /webhook
//!     ──────────────▶ http ──▶ webhook orchestrator
//!                                  │
//!                    ┌─────────────┴──────────────┐
//!                    ▼                            ▼
//!             validation client            contacts client
//!                    │                            │
//!                    └──────▶ resilience ◀────────┘
//!                       (circuit, bulkhead, deadline)
//!                                  │
//!                                  ▼
//!                            provider APIs
//!
//!     ◀────────────── XML <Response><Message>…</Message></Response>
//! ```

use clap::Parser;
use std::path::PathBuf;

use ev_webhook::config::{load_config, ObservabilityConfig};
use ev_webhook::lifecycle::{signals, startup, Shutdown};
use ev_webhook::observability::logging::init_tracing;

#[derive(Parser)]
#[command(name = "ev-webhook")]
#[command(about = "Email validation webhook", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    init_tracing(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ev-webhook starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mode = ?config.orchestration.mode,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    startup::run(config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
