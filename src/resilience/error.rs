//! Errors produced by protected calls.

use std::time::Duration;
use thiserror::Error;

/// Outcome of a protected call that did not produce a value.
///
/// Only server faults, timeouts, transport failures and aborted work count
/// against a circuit. Everything else is reported to the caller without
/// touching circuit health.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// Provider answered with an unexpected non-5xx status.
    #[error("provider rejected the request with status {status}")]
    ProviderClient { status: u16 },

    /// Provider answered with a 5xx status.
    #[error("provider failed with status {status}")]
    ProviderServer { status: u16 },

    /// Connection or IO failure before a status was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// The call did not finish before its deadline.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    /// The circuit is open and the call was not attempted.
    #[error("circuit '{0}' is open")]
    CircuitOpen(String),

    /// The bulkhead was full and the call was not attempted.
    #[error("circuit '{circuit}' is at capacity ({max_concurrent} calls in flight)")]
    CapacityExceeded { circuit: String, max_concurrent: usize },

    /// Provider payload could not be decoded.
    #[error("could not decode provider response: {0}")]
    Decode(String),

    /// The work task panicked or was cancelled.
    #[error("call aborted: {0}")]
    Aborted(String),
}

impl CallError {
    /// Classify an unexpected HTTP status.
    pub fn from_status(status: u16) -> Self {
        if status >= 500 {
            CallError::ProviderServer { status }
        } else {
            CallError::ProviderClient { status }
        }
    }

    /// Map a client error, using the configured deadline for timeouts.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            CallError::Timeout(timeout)
        } else if err.is_decode() {
            CallError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            CallError::from_status(status.as_u16())
        } else {
            CallError::Transport(err.to_string())
        }
    }

    /// Whether this outcome erodes circuit health.
    pub fn is_circuit_failure(&self) -> bool {
        matches!(
            self,
            CallError::ProviderServer { .. }
                | CallError::Timeout(_)
                | CallError::Transport(_)
                | CallError::Aborted(_)
        )
    }

    /// Whether the call was turned away before any work ran.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CallError::CircuitOpen(_) | CallError::CapacityExceeded { .. })
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::ProviderClient { .. } => "provider_client",
            CallError::ProviderServer { .. } => "provider_server",
            CallError::Transport(_) => "transport",
            CallError::Timeout(_) => "timeout",
            CallError::CircuitOpen(_) => "circuit_open",
            CallError::CapacityExceeded { .. } => "capacity_exceeded",
            CallError::Decode(_) => "decode",
            CallError::Aborted(_) => "aborted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(CallError::from_status(503), CallError::ProviderServer { status: 503 });
        assert_eq!(CallError::from_status(500), CallError::ProviderServer { status: 500 });
        assert_eq!(CallError::from_status(429), CallError::ProviderClient { status: 429 });
        assert_eq!(CallError::from_status(204), CallError::ProviderClient { status: 204 });
    }

    #[test]
    fn test_only_server_side_faults_count() {
        assert!(CallError::ProviderServer { status: 502 }.is_circuit_failure());
        assert!(CallError::Timeout(Duration::from_secs(1)).is_circuit_failure());
        assert!(CallError::Transport("reset".into()).is_circuit_failure());

        assert!(!CallError::ProviderClient { status: 400 }.is_circuit_failure());
        assert!(!CallError::Decode("eof".into()).is_circuit_failure());
        assert!(!CallError::CircuitOpen("c".into()).is_circuit_failure());
        assert!(!CallError::CapacityExceeded { circuit: "c".into(), max_concurrent: 1 }.is_circuit_failure());
    }

    #[test]
    fn test_error_display() {
        let err = CallError::CapacityExceeded { circuit: "contacts".into(), max_concurrent: 100 };
        assert_eq!(err.to_string(), "circuit 'contacts' is at capacity (100 calls in flight)");
        assert!(err.is_rejection());
    }
}
