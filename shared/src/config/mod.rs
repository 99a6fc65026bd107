//! Configuration module, split by concern:
//! - `token` - signing key, TTL policy and refresh lookup settings
//! - `database` - refresh token store backend and connection pool
//! - `environment` - environment detection and logging configuration
//! - `server` - HTTP server binding and request deadlines

pub mod database;
pub mod environment;
pub mod server;
pub mod token;

use serde::{Deserialize, Serialize};

pub use database::{DatabaseConfig, StorageBackend};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::ServerConfig;
pub use token::{TokenConfig, DEVELOPMENT_SIGNING_SECRET, MAX_TOKEN_TTL_SECONDS};

/// Complete application configuration, read once at process start
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Refresh token store configuration
    pub database: DatabaseConfig,

    /// Token policy
    pub token: TokenConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            token: TokenConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            token: TokenConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Reject settings that must never reach production
    pub fn validate(&self) -> Result<(), String> {
        if self.environment.is_production() && self.token.is_using_default_secret() {
            return Err("TOKEN_SIGNING_SECRET must be set in production".to_string());
        }
        if self.token.signing_secret.is_empty() {
            return Err("TOKEN_SIGNING_SECRET must not be empty".to_string());
        }
        if !self.token.has_valid_lifetimes() {
            return Err("token lifetimes must be between 1 second and 10 years".to_string());
        }
        if !(4..=31).contains(&self.token.hash_cost) {
            return Err("TOKEN_HASH_COST must be between 4 and 31".to_string());
        }
        if self.environment.is_production() && self.database.backend == StorageBackend::Memory {
            return Err("the in-memory store is not allowed in production".to_string());
        }
        Ok(())
    }
}
