//! Protected call execution.
//!
//! # Flow
//! ```text
//! execute(circuit, work, fallback)
//!     → circuit.admit()          (breaker state, then bulkhead)
//!         rejected → fallback(CircuitOpen | CapacityExceeded)
//!     → spawn work, race it against the circuit timeout
//!         deadline first → record failure → fallback(Timeout)
//!         finished       → record outcome → Ok | fallback(err)
//! ```
//!
//! Work runs on its own task. When the deadline passes, the handle is
//! dropped rather than aborted: the request is left to finish in the
//! background while the caller moves on.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::observability::metrics;
use crate::resilience::circuit_breaker::Outcome;
use crate::resilience::error::CallError;
use crate::resilience::registry::CircuitRegistry;

#[derive(Debug, Clone)]
pub struct Executor {
    registry: Arc<CircuitRegistry>,
}

impl Executor {
    pub fn new(registry: Arc<CircuitRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CircuitRegistry> {
        &self.registry
    }

    /// Run `work` under the named circuit.
    ///
    /// `fallback` receives every error: rejections, timeouts and failures
    /// returned by `work`. Whatever it returns is the result of the call.
    pub async fn execute<T, W, Fut, F>(&self, circuit_name: &str, work: W, fallback: F) -> Result<T, CallError>
    where
        W: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, CallError>> + Send + 'static,
        T: Send + 'static,
        F: FnOnce(CallError) -> Result<T, CallError> + Send,
    {
        let circuit = self.registry.circuit(circuit_name);

        let admission = match circuit.admit() {
            Ok(admission) => admission,
            Err(rejection) => return fallback(rejection),
        };

        let deadline = circuit.config().timeout();
        let started = Instant::now();
        let task = tokio::spawn(work());

        let result = match tokio::time::timeout(deadline, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(CallError::Aborted(join_error.to_string())),
            Err(_) => {
                admission.settle_timeout();
                metrics::record_call(circuit_name, "timeout", started);
                tracing::warn!(circuit = circuit_name, timeout = ?deadline, "Call timed out, abandoning");
                return fallback(CallError::Timeout(deadline));
            }
        };

        // Work that hit its own client deadline is still a timeout.
        let outcome = Outcome::of(&result);
        if matches!(result, Err(CallError::Timeout(_))) {
            admission.settle_timeout();
        } else {
            admission.settle(outcome);
        }

        match result {
            Ok(value) => {
                metrics::record_call(circuit_name, "success", started);
                Ok(value)
            }
            Err(error) => {
                metrics::record_call(circuit_name, error.kind(), started);
                tracing::debug!(
                    circuit = circuit_name,
                    error = %error,
                    counted = outcome == Outcome::Failure,
                    "Call failed"
                );
                fallback(error)
            }
        }
    }
}
