//! Relief Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other relief crates:
//! - Application configuration (server, store seeding, uploads, chain simulation)
//! - Global error type with HTTP status mapping
//! - Structured logging with tracing
//! - Default config, data, upload, and log directories
//! - Common constants and simulated chain identifiers

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod constants;
pub mod ids;

// Re-export commonly used items at the crate root
pub use config::{AppConfig, ConfigHandle};
pub use error::{ReliefError, ReliefResult};
pub use logging::init_logging;
