//! Webhook handling.
//!
//! # Data Flow
//! ```text
//! raw body
//!     → payload.rs (JSON, percent-decoding)
//!     → orchestrator.rs (validate → decide → register)
//!     → message.rs (fixed user-facing text)
//!     → envelope.rs (XML response document)
//! ```

pub mod envelope;
pub mod message;
pub mod orchestrator;
pub mod payload;

pub use orchestrator::{Orchestrator, WebhookError, WebhookMessage, WebhookOrchestrator};
