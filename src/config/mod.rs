//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (skipped in production)
//!     → process environment
//! optional TOML file
//!     → loader.rs (parse & deserialize, then env overrides)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → handed to startup by value
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_env_file, ConfigError};
pub use schema::{AuthConfig, DatabaseConfig, ListenerConfig, ServerConfig, TimeoutConfig};
