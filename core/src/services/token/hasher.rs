//! Refresh secret hashing
//!
//! Refresh secrets are long-lived bearer credentials, so they are stored
//! the way passwords are: salted bcrypt with a configurable cost. A separate
//! SHA-256 fingerprint serves only as a lookup key to narrow candidates
//! before the expensive verification.

use std::sync::Arc;

use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::{DomainError, DomainResult, TokenError};

/// One-way hashing of refresh secrets
pub trait SecretHasher: Send + Sync {
    /// Produces a salted digest of `secret`
    fn hash(&self, secret: &str) -> DomainResult<String>;

    /// Checks `candidate` against `digest`.
    ///
    /// Returns `Ok(false)` on mismatch; errors only when `digest` is malformed.
    fn verify(&self, digest: &str, candidate: &str) -> DomainResult<bool>;
}

/// bcrypt-backed hasher
#[derive(Debug, Clone)]
pub struct BcryptSecretHasher {
    cost: u32,
}

impl BcryptSecretHasher {
    /// Creates a hasher using the given bcrypt cost (4..=31)
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptSecretHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl SecretHasher for BcryptSecretHasher {
    fn hash(&self, secret: &str) -> DomainResult<String> {
        bcrypt::hash(secret, self.cost).map_err(|_| TokenError::HashingFailed.into())
    }

    fn verify(&self, digest: &str, candidate: &str) -> DomainResult<bool> {
        bcrypt::verify(candidate, digest).map_err(|_| TokenError::MalformedDigest.into())
    }
}

/// Deterministic, non-secret lookup key for a refresh secret (hex SHA-256)
pub fn secret_fingerprint(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Constant-time fingerprint comparison
pub fn fingerprints_match(stored: &str, candidate: &str) -> bool {
    constant_time_eq(stored.as_bytes(), candidate.as_bytes())
}

/// Hashes a secret on the blocking pool
pub async fn hash_secret(hasher: Arc<dyn SecretHasher>, secret: String) -> DomainResult<String> {
    tokio::task::spawn_blocking(move || hasher.hash(&secret))
        .await
        .map_err(|e| DomainError::Internal {
            message: format!("Hashing task failed: {}", e),
        })?
}

/// Verifies `candidate` against each record on the blocking pool and returns
/// the first record that matches.
///
/// Records with a malformed digest are skipped; they can never match.
pub async fn find_matching_record(
    hasher: Arc<dyn SecretHasher>,
    records: Vec<RefreshTokenRecord>,
    candidate: String,
) -> DomainResult<Option<RefreshTokenRecord>> {
    if records.is_empty() {
        return Ok(None);
    }

    tokio::task::spawn_blocking(move || {
        for record in records {
            match hasher.verify(&record.secret_hash, &candidate) {
                Ok(true) => return Ok(Some(record)),
                Ok(false) => continue,
                Err(DomainError::Token(TokenError::MalformedDigest)) => {
                    warn!(record_id = %record.id, "Skipping refresh token with malformed digest");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    })
    .await
    .map_err(|e| DomainError::Internal {
        message: format!("Verification task failed: {}", e),
    })?
}
