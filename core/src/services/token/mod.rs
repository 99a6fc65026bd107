//! Token service module
//!
//! - Refresh secret hashing and lookup fingerprints
//! - Access token signing and refresh secret generation
//! - Pair issuance and single-use refresh rotation

mod config;
pub mod hasher;
mod issuer;
mod service;


pub use config::TokenServiceConfig;
pub use hasher::{BcryptSecretHasher, SecretHasher};
pub use issuer::{TokenIssuer, REFRESH_SECRET_BYTES};
pub use service::{TokenService, MAX_PRESENTED_SECRET_LEN};
