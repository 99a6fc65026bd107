//! Shared configuration and response types for the token lifecycle service
//!
//! This crate provides functionality used across all server crates:
//! - Configuration types loaded from the environment
//! - The error response body returned by the HTTP layer

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, DatabaseConfig, Environment, LogFormat, LoggingConfig, ServerConfig,
    StorageBackend, TokenConfig,
};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
