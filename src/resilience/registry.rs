//! Named circuit registry.
//!
//! Owns every circuit for the life of the process. Lookups are sharded
//! so callers on different circuits never wait on each other.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::config::{CircuitConfig, CircuitsConfig};
use crate::resilience::circuit_breaker::{Circuit, CircuitSnapshot};

pub const EMAIL_VALIDATION_CIRCUIT: &str = "email_validation";
pub const CONTACTS_CIRCUIT: &str = "contacts";

#[derive(Debug, Default)]
pub struct CircuitRegistry {
    circuits: DashMap<String, Arc<Circuit>>,
}

impl CircuitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the provider circuits configured.
    pub fn from_config(config: &CircuitsConfig) -> Self {
        let registry = Self::new();
        registry.configure(EMAIL_VALIDATION_CIRCUIT, config.email_validation.clone());
        registry.configure(CONTACTS_CIRCUIT, config.contacts.clone());
        registry
    }

    /// Create a circuit. Returns false, leaving the existing circuit alone,
    /// if the name is already taken.
    pub fn configure(&self, name: &str, config: CircuitConfig) -> bool {
        match self.circuits.entry(name.to_string()) {
            Entry::Occupied(_) => {
                tracing::warn!(circuit = name, "Circuit already configured, keeping existing settings");
                false
            }
            Entry::Vacant(slot) => {
                tracing::debug!(
                    circuit = name,
                    timeout_ms = config.timeout_ms,
                    max_concurrent = config.max_concurrent,
                    cool_down_ms = config.cool_down_ms,
                    error_threshold_percent = config.error_threshold_percent,
                    "Circuit configured"
                );
                slot.insert(Arc::new(Circuit::new(name, config)));
                true
            }
        }
    }

    /// Look up a circuit, creating it with default settings on first use.
    pub fn circuit(&self, name: &str) -> Arc<Circuit> {
        if let Some(circuit) = self.circuits.get(name) {
            return circuit.clone();
        }
        self.circuits
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::warn!(circuit = name, "Unconfigured circuit, using defaults");
                Arc::new(Circuit::new(name, CircuitConfig::default()))
            })
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Circuit>> {
        self.circuits.get(name).map(|c| c.clone())
    }

    /// Snapshots of every circuit, sorted by name.
    pub fn snapshots(&self) -> Vec<CircuitSnapshot> {
        let mut snapshots: Vec<_> = self.circuits.iter().map(|c| c.snapshot()).collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }
}
