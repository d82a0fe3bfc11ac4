//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, routes)
//!     → request.rs (request ID set and propagated)
//!     → webhook orchestrator
//!     → response.rs (XML envelope, status code)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use response::XmlReply;
pub use server::{AppState, HttpServer};
