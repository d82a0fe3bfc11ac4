//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the webhook
//! service. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the webhook service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Credentials and endpoints for the email provider.
    pub sendgrid: SendGridConfig,

    /// Per-circuit resilience settings.
    pub circuits: CircuitsConfig,

    /// Which orchestration variant handles webhook requests.
    pub orchestration: OrchestrationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Operator endpoints.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Upper bound on the whole webhook request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 15,
        }
    }
}

pub const DEFAULT_VALIDATION_ENDPOINT: &str = "https://api.sendgrid.com/v3/validations/email";
pub const DEFAULT_CONTACTS_ENDPOINT: &str = "https://api.sendgrid.com/v3/mc/contacts";

/// Email provider configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SendGridConfig {
    /// Bearer token for both provider APIs.
    pub api_key: String,

    /// Contact list new addresses are added to.
    pub contact_list_id: String,

    /// Email validation endpoint.
    pub validation_endpoint: String,

    /// Marketing contacts endpoint.
    pub contacts_endpoint: String,
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            contact_list_id: String::new(),
            validation_endpoint: DEFAULT_VALIDATION_ENDPOINT.to_string(),
            contacts_endpoint: DEFAULT_CONTACTS_ENDPOINT.to_string(),
        }
    }
}

impl std::fmt::Debug for SendGridConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridConfig")
            .field("api_key", &"<redacted>")
            .field("contact_list_id", &self.contact_list_id)
            .field("validation_endpoint", &self.validation_endpoint)
            .field("contacts_endpoint", &self.contacts_endpoint)
            .finish()
    }
}

/// Settings for one named circuit.
///
/// Loaded once at startup; a circuit never sees its config change afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitConfig {
    /// Deadline for a single protected call in milliseconds.
    pub timeout_ms: u64,

    /// Bulkhead capacity: calls in flight at once before new ones are rejected.
    pub max_concurrent: usize,

    /// How long an open circuit waits before admitting a trial call.
    pub cool_down_ms: u64,

    /// Rolling error percentage above which the circuit opens.
    pub error_threshold_percent: u8,

    /// Minimum counted outcomes in the window before the error rate is judged.
    pub request_volume_threshold: u64,

    /// Length of the rolling statistics window in seconds.
    pub rolling_window_secs: u64,
}

impl CircuitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cool_down(&self) -> Duration {
        Duration::from_millis(self.cool_down_ms)
    }

    pub fn rolling_window(&self) -> Duration {
        Duration::from_secs(self.rolling_window_secs)
    }
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_concurrent: 100,
            cool_down_ms: 5000,
            error_threshold_percent: 50,
            request_volume_threshold: 20,
            rolling_window_secs: 10,
        }
    }
}

/// Circuits used by the provider clients.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitsConfig {
    pub email_validation: CircuitConfig,
    pub contacts: CircuitConfig,
}

/// Orchestration variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationMode {
    /// Validate, then add acceptable addresses to the contact list.
    /// Input and provider problems become friendly messages.
    #[default]
    ValidateAndRegister,
    /// Validate and report the score only.
    /// Missing input and validation failures are returned as errors.
    ValidateOnly,
}

impl OrchestrationMode {
    pub fn registers_contacts(self) -> bool {
        matches!(self, OrchestrationMode::ValidateAndRegister)
    }

    /// Whether user-input and provider failures reach the caller as errors.
    pub fn surfaces_errors(self) -> bool {
        matches!(self, OrchestrationMode::ValidateOnly)
    }
}

impl std::str::FromStr for OrchestrationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "validate_and_register" => Ok(OrchestrationMode::ValidateAndRegister),
            "validate_only" => Ok(OrchestrationMode::ValidateOnly),
            other => Err(format!("unknown orchestration mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    pub mode: OrchestrationMode,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "ev_webhook=info,tower_http=info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount `/admin/*` routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_defaults() {
        let config = AppConfig::default();
        let circuit = &config.circuits.email_validation;
        assert_eq!(circuit.timeout(), Duration::from_secs(5));
        assert_eq!(circuit.max_concurrent, 100);
        assert_eq!(circuit.cool_down(), Duration::from_secs(5));
        assert_eq!(circuit.error_threshold_percent, 50);
        assert_eq!(config.orchestration.mode, OrchestrationMode::ValidateAndRegister);
        assert_eq!(config.sendgrid.contacts_endpoint, DEFAULT_CONTACTS_ENDPOINT);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [sendgrid]
            api_key = "key"

            [circuits.contacts]
            max_concurrent = 3

            [orchestration]
            mode = "validate_only"
            "#,
        )
        .unwrap();

        assert_eq!(config.sendgrid.api_key, "key");
        assert_eq!(config.sendgrid.validation_endpoint, DEFAULT_VALIDATION_ENDPOINT);
        assert_eq!(config.circuits.contacts.max_concurrent, 3);
        assert_eq!(config.circuits.contacts.timeout_ms, 5000);
        assert_eq!(config.orchestration.mode, OrchestrationMode::ValidateOnly);
        assert!(!config.orchestration.mode.registers_contacts());
    }

    #[test]
    fn test_api_key_is_redacted_in_debug() {
        let mut config = SendGridConfig::default();
        config.api_key = "super-secret".into();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
    }
}
