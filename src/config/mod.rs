//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed to startup, which builds circuits and clients from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; circuits are configured exactly once
//! - All fields have defaults to allow minimal configs
//! - Secrets come from the environment so they stay out of config files

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AdminConfig;
pub use schema::AppConfig;
pub use schema::CircuitConfig;
pub use schema::CircuitsConfig;
pub use schema::ObservabilityConfig;
pub use schema::OrchestrationMode;
pub use schema::SendGridConfig;
