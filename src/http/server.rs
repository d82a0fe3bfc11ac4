//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Hand webhook bodies to the orchestrator and wrap replies in XML
//! - Mount the admin surface when enabled

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::{AdminConfig, AppConfig};
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::http::response::XmlReply;
use crate::resilience::CircuitRegistry;
use crate::webhook::WebhookOrchestrator;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<WebhookOrchestrator>,
    pub registry: Arc<CircuitRegistry>,
    pub admin: AdminConfig,
}

/// HTTP server for the webhook.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &AppConfig, state: AppState) -> Self {
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// The fully layered router, for serving or driving directly in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/webhook", post(webhook_handler))
            .route("/health", get(health_handler));

        if config.admin.enabled {
            router = router.merge(setup_admin_router(state.clone()));
        }

        router
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<S>(self, listener: TcpListener, shutdown: S) -> Result<(), std::io::Error>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn webhook_handler(State(state): State<AppState>, body: Bytes) -> Response {
    match state.orchestrator.handle(&body).await {
        Ok(message) => XmlReply::ok(message.text).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "Webhook request failed");
            XmlReply::from(err).into_response()
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
