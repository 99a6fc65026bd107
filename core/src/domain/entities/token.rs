//! Token entities for access/refresh token issuance and rotation.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};

/// Access token expiration time (15 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Refresh token expiration time (24 hours)
pub const REFRESH_TOKEN_EXPIRY_HOURS: i64 = 24;

/// Default issuer claim
pub const JWT_ISSUER: &str = "token-lifecycle";

/// Instant `ttl` after `start`, or an error when it is not representable
pub fn expiry_after(start: DateTime<Utc>, ttl: Duration) -> DomainResult<DateTime<Utc>> {
    start
        .checked_add_signed(ttl)
        .ok_or_else(|| DomainError::Internal {
            message: "Token lifetime overflows the calendar".to_string(),
        })
}

/// Claims carried by a signed access token.
///
/// The token is self-contained: anyone holding the signing key can verify it
/// without consulting the refresh token store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Principal the token was issued to
    pub subject_id: Uuid,

    /// Unique identifier of this access token
    pub token_id: Uuid,

    /// Network origin observed at issuance
    pub origin: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,
}

impl AccessClaims {
    /// Creates claims for an access token issued at `issued_at` and living for `ttl`
    pub fn new(
        subject_id: Uuid,
        token_id: Uuid,
        origin: impl Into<String>,
        issuer: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> DomainResult<Self> {
        Ok(Self {
            subject_id,
            token_id,
            origin: origin.into(),
            iat: issued_at.timestamp(),
            exp: expiry_after(issued_at, ttl)?.timestamp(),
            iss: issuer.into(),
        })
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Presentation state of a refresh credential, derived at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTokenState {
    /// Created, unused and unexpired; the only state that permits rotation
    Active,
    /// Lifetime elapsed; never persisted explicitly
    Expired,
    /// Consumed by a rotation (terminal)
    Used,
}

/// Refresh token record stored in the database.
///
/// Only the bcrypt digest of the secret is kept. `used` moves from `false`
/// to `true` exactly once and is never reset.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Unique identifier for the record
    pub id: Uuid,

    /// Principal the credential was issued to
    pub subject_id: Uuid,

    /// Salted adaptive hash of the refresh secret
    pub secret_hash: String,

    /// Fast deterministic lookup key for the secret, if recorded
    pub secret_fingerprint: Option<String>,

    /// Network origin observed at issuance (informational)
    pub origin: String,

    /// Access token issued alongside this record; replaced on rotation
    pub linked_access_token_id: Uuid,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the record expires; never extended
    pub expires_at: DateTime<Utc>,

    /// Whether the secret has been exchanged already
    pub used: bool,
}

impl RefreshTokenRecord {
    /// Creates a new active record
    ///
    /// # Arguments
    ///
    /// * `id` - Record identifier chosen by the caller (stable across retries)
    /// * `subject_id` - The principal's UUID
    /// * `secret_hash` - The hashed refresh secret
    /// * `origin` - Client IP observed at issuance
    /// * `linked_access_token_id` - Id of the access token issued with it
    /// * `created_at` - Issuance instant
    /// * `ttl` - Refresh lifetime
    ///
    /// Fails with `DomainError::Internal` if the expiry overflows.
    pub fn new(
        id: Uuid,
        subject_id: Uuid,
        secret_hash: String,
        origin: impl Into<String>,
        linked_access_token_id: Uuid,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            subject_id,
            secret_hash,
            secret_fingerprint: None,
            origin: origin.into(),
            linked_access_token_id,
            created_at,
            expires_at: expiry_after(created_at, ttl)?,
            used: false,
        })
    }

    /// Attaches the lookup fingerprint of the secret
    pub fn with_fingerprint(mut self, fingerprint: String) -> Self {
        self.secret_fingerprint = Some(fingerprint);
        self
    }

    /// Checks if the record has expired at `now` (exclusive boundary)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Checks if the record may be presented for rotation at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired_at(now)
    }

    /// Checks if the record may be presented for rotation right now
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Derives the presentation state at `now`
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.used {
            RefreshTokenState::Used
        } else if self.is_expired_at(now) {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }

    /// Marks the record used and relinks it to the access token that replaced it.
    ///
    /// Returns `false` without touching the record if it was already used.
    pub fn mark_used(&mut self, new_access_token_id: Uuid) -> bool {
        if self.used {
            return false;
        }
        self.used = true;
        self.linked_access_token_id = new_access_token_id;
        true
    }
}

// Digest and fingerprint stay out of logs.
impl fmt::Debug for RefreshTokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRecord")
            .field("id", &self.id)
            .field("subject_id", &self.subject_id)
            .field("origin", &self.origin)
            .field("linked_access_token_id", &self.linked_access_token_id)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("used", &self.used)
            .finish_non_exhaustive()
    }
}

/// Token pair returned to the client
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed access token
    pub access_token: String,

    /// Opaque refresh secret (plaintext, only ever returned here)
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair with the lifetimes it was issued under
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in: access_ttl.num_seconds(),
            refresh_expires_in: refresh_ttl.num_seconds(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("access_expires_in", &self.access_expires_in)
            .field("refresh_expires_in", &self.refresh_expires_in)
            .finish()
    }
}
