//! # Token Lifecycle Core
//!
//! Domain layer of the token lifecycle service: token entities, the refresh
//! token repository contract, secret hashing, token issuance and rotation.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{AccessClaims, RefreshTokenRecord, RefreshTokenState, TokenPair};
pub use errors::{DomainError, DomainResult, TokenError, ValidationError};
pub use repositories::{InMemoryTokenRepository, LookupStrategy, TokenRepository};
pub use services::{BcryptSecretHasher, SecretHasher, TokenIssuer, TokenService, TokenServiceConfig};
