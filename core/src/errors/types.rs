//! Token and validation error types
//!
//! None of these carry secret material: no plaintext refresh secret, no
//! digest and no signing key ever ends up in an error value.

use thiserror::Error;
use uuid::Uuid;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Refresh secret unknown, expired or malformed
    #[error("Invalid refresh credential")]
    InvalidCredential,

    /// Refresh secret matched a record that was already exchanged.
    ///
    /// Internal signal for anomaly detection; externally indistinguishable
    /// from `InvalidCredential`.
    #[error("Refresh credential reused (record {record_id})")]
    ReusedCredential { record_id: Uuid },

    #[error("Token signing failed")]
    SigningFailed,

    #[error("Secret hashing failed")]
    HashingFailed,

    #[error("Stored secret digest is malformed")]
    MalformedDigest,

    #[error("Invalid access token")]
    InvalidAccessToken,

    #[error("Access token expired")]
    AccessTokenExpired,
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Out of range: {field}")]
    OutOfRange { field: String },
}
