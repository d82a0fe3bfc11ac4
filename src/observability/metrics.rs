//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ev_circuit_calls_total` (counter): admitted calls by circuit, outcome
//! - `ev_circuit_rejections_total` (counter): calls turned away by circuit, reason
//! - `ev_circuit_call_duration_seconds` (histogram): admitted call latency
//! - `ev_circuit_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `ev_webhook_requests_total` (counter): webhook requests by outcome
//! - `ev_webhook_duration_seconds` (histogram): end-to-end webhook latency
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::resilience::CircuitState;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_call(circuit: &str, outcome: &'static str, started: Instant) {
    counter!(
        "ev_circuit_calls_total",
        "circuit" => circuit.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("ev_circuit_call_duration_seconds", "circuit" => circuit.to_string())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_rejection(circuit: &str, reason: &'static str) {
    counter!(
        "ev_circuit_rejections_total",
        "circuit" => circuit.to_string(),
        "reason" => reason
    )
    .increment(1);
}

pub fn record_circuit_state(circuit: &str, state: CircuitState) {
    let value = match state {
        CircuitState::Closed => 0.0,
        CircuitState::Open => 1.0,
        CircuitState::HalfOpen => 2.0,
    };
    gauge!("ev_circuit_state", "circuit" => circuit.to_string()).set(value);
}

pub fn record_webhook(outcome: &'static str, started: Instant) {
    counter!("ev_webhook_requests_total", "outcome" => outcome).increment(1);
    histogram!("ev_webhook_duration_seconds").record(started.elapsed().as_secs_f64());
}
