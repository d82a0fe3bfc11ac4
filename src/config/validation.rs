//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, thresholds in 1..=100)
//! - Check endpoints and bind addresses parse
//! - Require the secrets the selected orchestration mode needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{AppConfig, CircuitConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    let sendgrid = &config.sendgrid;
    if sendgrid.api_key.trim().is_empty() {
        errors.push(ValidationError::new("sendgrid.api_key", "must be set"));
    }
    if config.orchestration.mode.registers_contacts() && sendgrid.contact_list_id.trim().is_empty() {
        errors.push(ValidationError::new(
            "sendgrid.contact_list_id",
            "must be set when contacts are registered",
        ));
    }
    check_endpoint(&mut errors, "sendgrid.validation_endpoint", &sendgrid.validation_endpoint);
    check_endpoint(&mut errors, "sendgrid.contacts_endpoint", &sendgrid.contacts_endpoint);

    check_circuit(&mut errors, "circuits.email_validation", &config.circuits.email_validation);
    check_circuit(&mut errors, "circuits.contacts", &config.circuits.contacts);

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.admin.enabled && config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::new("admin.api_key", "must be set when admin is enabled"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

fn check_circuit(errors: &mut Vec<ValidationError>, prefix: &str, circuit: &CircuitConfig) {
    if circuit.timeout_ms == 0 {
        errors.push(ValidationError::new(
            format!("{}.timeout_ms", prefix),
            "must be greater than zero",
        ));
    }
    if circuit.max_concurrent == 0 {
        errors.push(ValidationError::new(
            format!("{}.max_concurrent", prefix),
            "must be greater than zero",
        ));
    }
    if circuit.error_threshold_percent == 0 || circuit.error_threshold_percent > 100 {
        errors.push(ValidationError::new(
            format!("{}.error_threshold_percent", prefix),
            "must be between 1 and 100",
        ));
    }
    if circuit.rolling_window_secs == 0 {
        errors.push(ValidationError::new(
            format!("{}.rolling_window_secs", prefix),
            "must be greater than zero",
        ));
    }
}
