//! Circuit breaker for provider protection.
//!
//! # States
//! - Closed: normal operation, calls pass through and outcomes are tallied
//! - Open: provider assumed down, calls fail fast
//! - Half-Open: a single trial call probes recovery
//!
//! # State Transitions
//! ```text
//! Closed → Open: window volume >= request_volume_threshold
//!                and error rate > error_threshold_percent
//! Open → Half-Open: cool-down elapsed (claimed by the next caller)
//! Half-Open → Closed: trial succeeds
//! Half-Open → Open: trial fails
//! ```
//!
//! # Design Decisions
//! - One circuit per provider call site, looked up by name
//! - Fail fast in Open state (no waiting for timeout)
//! - Single trial in Half-Open; a neutral trial outcome frees the slot
//! - Rejected calls never reach the window

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;

use crate::config::CircuitConfig;
use crate::observability::metrics;
use crate::resilience::bulkhead::{Bulkhead, BulkheadPermit};
use crate::resilience::error::CallError;
use crate::resilience::window::RollingWindow;

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// How an admitted call ended, from the circuit's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    /// Surfaced to the caller but says nothing about provider health.
    Neutral,
}

impl Outcome {
    pub fn of<T>(result: &Result<T, CallError>) -> Self {
        match result {
            Ok(_) => Outcome::Success,
            Err(e) if e.is_circuit_failure() => Outcome::Failure,
            Err(_) => Outcome::Neutral,
        }
    }
}

#[derive(Debug)]
struct Health {
    state: CircuitState,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
    window: RollingWindow,
}

/// Read-only view of a circuit.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub in_flight: usize,
    pub max_concurrent: usize,
    pub window_successes: u64,
    pub window_failures: u64,
    pub error_percent: f64,
    pub rejected_total: u64,
    pub timeouts_total: u64,
}

/// One named circuit: breaker state, rolling window and bulkhead.
#[derive(Debug)]
pub struct Circuit {
    name: String,
    config: CircuitConfig,
    bulkhead: Arc<Bulkhead>,
    health: Mutex<Health>,
    rejected: AtomicU64,
    timeouts: AtomicU64,
}

impl Circuit {
    pub fn new(name: impl Into<String>, config: CircuitConfig) -> Self {
        Self {
            name: name.into(),
            bulkhead: Arc::new(Bulkhead::new(config.max_concurrent)),
            health: Mutex::new(Health {
                state: CircuitState::Closed,
                opened_at: None,
                trial_in_flight: false,
                window: RollingWindow::new(config.rolling_window()),
            }),
            config,
            rejected: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    fn health(&self) -> MutexGuard<'_, Health> {
        self.health.lock().expect("circuit health mutex poisoned")
    }

    /// Current state. An open circuit whose cool-down has elapsed still
    /// reports `Open` until a caller claims the trial.
    pub fn state(&self) -> CircuitState {
        self.health().state
    }

    /// Decide whether a call may run now.
    ///
    /// The breaker is consulted before the bulkhead; a trial slot claimed
    /// here is handed back if the bulkhead then refuses the call.
    pub fn admit(self: &Arc<Self>) -> Result<Admission, CallError> {
        let trial = {
            let mut health = self.health();
            match health.state {
                CircuitState::Closed => false,
                CircuitState::Open => {
                    let cooled = health
                        .opened_at
                        .is_none_or(|at| at.elapsed() >= self.config.cool_down());
                    if !cooled {
                        drop(health);
                        return Err(self.reject(CallError::CircuitOpen(self.name.clone())));
                    }
                    self.transition(&mut health, CircuitState::HalfOpen);
                    health.trial_in_flight = true;
                    true
                }
                CircuitState::HalfOpen => {
                    if health.trial_in_flight {
                        drop(health);
                        return Err(self.reject(CallError::CircuitOpen(self.name.clone())));
                    }
                    health.trial_in_flight = true;
                    true
                }
            }
        };

        match self.bulkhead.try_acquire() {
            Some(permit) => Ok(Admission {
                circuit: self.clone(),
                _permit: permit,
                trial,
                settled: false,
            }),
            None => {
                if trial {
                    self.release_trial();
                }
                Err(self.reject(CallError::CapacityExceeded {
                    circuit: self.name.clone(),
                    max_concurrent: self.bulkhead.capacity(),
                }))
            }
        }
    }

    fn reject(&self, error: CallError) -> CallError {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        metrics::record_rejection(&self.name, error.kind());
        tracing::debug!(circuit = %self.name, reason = error.kind(), "Call rejected");
        error
    }

    fn release_trial(&self) {
        self.health().trial_in_flight = false;
    }

    fn record(&self, trial: bool, outcome: Outcome) {
        let mut health = self.health();

        if trial {
            health.trial_in_flight = false;
            match outcome {
                Outcome::Success => self.transition(&mut health, CircuitState::Closed),
                Outcome::Failure => self.transition(&mut health, CircuitState::Open),
                Outcome::Neutral => {}
            }
            return;
        }

        // Outcomes of calls admitted before the circuit opened are dropped.
        if health.state != CircuitState::Closed || outcome == Outcome::Neutral {
            return;
        }

        let now = Instant::now();
        health.window.record(now, outcome == Outcome::Success);

        if outcome == Outcome::Failure {
            let totals = health.window.totals(now);
            if totals.total() >= self.config.request_volume_threshold
                && totals.error_percent() > f64::from(self.config.error_threshold_percent)
            {
                tracing::warn!(
                    circuit = %self.name,
                    failures = totals.failures,
                    total = totals.total(),
                    error_percent = totals.error_percent(),
                    "Error rate over threshold"
                );
                self.transition(&mut health, CircuitState::Open);
            }
        }
    }

    fn transition(&self, health: &mut Health, next: CircuitState) {
        let previous = health.state;
        if previous == next {
            return;
        }
        health.state = next;
        match next {
            CircuitState::Open => {
                health.opened_at = Some(Instant::now());
                tracing::warn!(circuit = %self.name, from = %previous, "Circuit opened");
            }
            CircuitState::HalfOpen => {
                tracing::info!(circuit = %self.name, "Circuit half-open, admitting trial call");
            }
            CircuitState::Closed => {
                health.opened_at = None;
                health.window.clear();
                tracing::info!(circuit = %self.name, "Circuit closed after successful trial");
            }
        }
        metrics::record_circuit_state(&self.name, next);
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let (state, totals) = {
            let health = self.health();
            (health.state, health.window.totals(Instant::now()))
        };
        CircuitSnapshot {
            name: self.name.clone(),
            state,
            in_flight: self.bulkhead.in_flight(),
            max_concurrent: self.bulkhead.capacity(),
            window_successes: totals.successes,
            window_failures: totals.failures,
            error_percent: totals.error_percent(),
            rejected_total: self.rejected.load(Ordering::Relaxed),
            timeouts_total: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

/// Permission to run one call through a circuit.
///
/// Holds the bulkhead slot until dropped. Settle it with the call's
/// outcome; an unsettled admission (caller cancelled) only frees its
/// trial slot.
#[derive(Debug)]
pub struct Admission {
    circuit: Arc<Circuit>,
    _permit: BulkheadPermit,
    trial: bool,
    settled: bool,
}

impl Admission {
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn settle(mut self, outcome: Outcome) {
        self.settled = true;
        self.circuit.record(self.trial, outcome);
    }

    pub fn settle_timeout(self) {
        self.circuit.timeouts.fetch_add(1, Ordering::Relaxed);
        self.settle(Outcome::Failure);
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.circuit.release_trial();
        }
    }
}
