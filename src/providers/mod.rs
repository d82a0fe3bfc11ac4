//! Outbound provider clients.
//!
//! # Data Flow
//! ```text
//! Orchestrator
//!     → validation.rs (POST address, decode verdict)
//!     → contacts.rs (PUT address onto the contact list)
//!         → resilience::Executor (circuit, bulkhead, deadline)
//!             → provider API
//! ```
//!
//! # Design Decisions
//! - Each client owns one named circuit; the two never share health
//! - The HTTP client deadline matches the circuit deadline
//! - Clients sit behind small traits so the orchestrator can be driven by fakes

pub mod contacts;
pub mod types;
pub mod validation;

pub use contacts::{ContactAdder, ContactClient};
pub use types::{ResultCategory, ValidationVerdict};
pub use validation::{EmailValidationClient, Validator};
