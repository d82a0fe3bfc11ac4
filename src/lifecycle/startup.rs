//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the circuit registry from configuration
//! - Build provider clients and the orchestrator on top of it
//! - Start the metrics exporter
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{AppConfig, ConfigError};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;
use crate::providers::{ContactClient, EmailValidationClient};
use crate::resilience::{CircuitRegistry, Executor};
use crate::webhook::Orchestrator;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build provider HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Wire registry → executor → clients → orchestrator → server.
pub fn build(config: &AppConfig) -> Result<HttpServer, StartupError> {
    let registry = Arc::new(CircuitRegistry::from_config(&config.circuits));
    let executor = Executor::new(registry.clone());

    let validator = EmailValidationClient::new(&config.sendgrid, executor.clone())?;
    let contacts = ContactClient::new(&config.sendgrid, executor)?;
    let orchestrator = Orchestrator::new(validator, contacts, config.orchestration.mode);

    tracing::info!(
        mode = ?config.orchestration.mode,
        admin_enabled = config.admin.enabled,
        "Webhook orchestrator ready"
    );

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        registry,
        admin: config.admin.clone(),
    };
    Ok(HttpServer::new(config, state))
}

/// Build everything, bind, and serve until `shutdown` fires.
pub async fn run(config: AppConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = build(&config)?;

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    server.run(listener, shutdown.wait()).await?;
    Ok(())
}
