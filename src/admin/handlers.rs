use axum::{
    extract::State,
    Json,
};
use serde::Serialize;
use crate::config::OrchestrationMode;
use crate::http::server::AppState;
use crate::resilience::{CircuitSnapshot, CircuitState};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub mode: OrchestrationMode,
    pub open_circuits: Vec<String>,
}

pub async fn get_status(
    State(state): State<AppState>,
) -> Json<SystemStatus> {
    let open_circuits: Vec<String> = state
        .registry
        .snapshots()
        .into_iter()
        .filter(|s| s.state != CircuitState::Closed)
        .map(|s| s.name)
        .collect();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if open_circuits.is_empty() { "operational" } else { "degraded" },
        mode: state.orchestrator.mode(),
        open_circuits,
    })
}

pub async fn get_circuits(
    State(state): State<AppState>,
) -> Json<Vec<CircuitSnapshot>> {
    Json(state.registry.snapshots())
}
