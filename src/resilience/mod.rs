//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Provider call:
//!     → registry.rs (look up the named circuit)
//!     → circuit_breaker.rs (fail fast while open, single trial when half-open)
//!     → bulkhead.rs (cap concurrent in-flight calls)
//!     → executor.rs (deadline, outcome recording, fallback)
//!     → window.rs (rolling success/failure counts that drive the breaker)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every provider call has a deadline
//! - No retries: the breaker's cool-down is the only recovery pacing
//! - Only server-side faults erode health; bad client input never trips a circuit
//! - Registry is an owned value passed to the executor, not global state

pub mod bulkhead;
pub mod circuit_breaker;
pub mod error;
pub mod executor;
pub mod registry;
pub mod window;

pub use circuit_breaker::{Circuit, CircuitSnapshot, CircuitState, Outcome};
pub use error::CallError;
pub use executor::Executor;
pub use registry::{CircuitRegistry, CONTACTS_CIRCUIT, EMAIL_VALIDATION_CIRCUIT};
