//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management and schema bootstrap
//! - Refresh token repository

pub mod connection;
pub mod mysql;


// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::MySqlTokenRepository;
