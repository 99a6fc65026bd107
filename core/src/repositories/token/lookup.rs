//! Candidate selection for refresh secret lookups.
//!
//! Digests are salted, so a presented secret cannot be matched by equality.
//! `LinearScan` verifies every unexpired record and is the scalability bound
//! of the store: cost grows with the number of live records times the bcrypt
//! cost. `Fingerprint` narrows candidates with the SHA-256 fingerprint first.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::entities::token::{RefreshTokenRecord, RefreshTokenState};
use crate::errors::{DomainError, TokenError};
use crate::services::token::hasher::{fingerprints_match, secret_fingerprint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupStrategy {
    /// Verify every unexpired record
    #[default]
    LinearScan,
    /// Verify only records whose fingerprint matches, plus records without one
    Fingerprint,
}

impl LookupStrategy {
    /// Fingerprint to narrow by, if this strategy uses one
    pub fn candidate_fingerprint(&self, candidate: &str) -> Option<String> {
        match self {
            LookupStrategy::LinearScan => None,
            LookupStrategy::Fingerprint => Some(secret_fingerprint(candidate)),
        }
    }

    /// Whether `record` must be verified for a candidate with `fingerprint`.
    ///
    /// Records stored without a fingerprint are always admitted so the
    /// narrowing can never hide a valid credential.
    pub fn admits(&self, record: &RefreshTokenRecord, fingerprint: Option<&str>) -> bool {
        match fingerprint {
            None => true,
            Some(candidate) => record
                .secret_fingerprint
                .as_deref()
                .map_or(true, |stored| fingerprints_match(stored, candidate)),
        }
    }
}

impl FromStr for LookupStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scan" | "linear" | "linear-scan" => Ok(LookupStrategy::LinearScan),
            "fingerprint" | "index" => Ok(LookupStrategy::Fingerprint),
            _ => Err(format!("Invalid lookup strategy: {}", s)),
        }
    }
}

/// Turns the verified match of a lookup into the store's answer at `now`.
///
/// A used record yields `ReusedCredential`; no match or an expired one
/// yields `NotFound`.
pub fn lookup_outcome(
    found: Option<RefreshTokenRecord>,
    now: DateTime<Utc>,
) -> Result<RefreshTokenRecord, DomainError> {
    let not_found = || DomainError::NotFound {
        resource: "refresh token".to_string(),
    };

    let record = found.ok_or_else(not_found)?;
    match record.state_at(now) {
        RefreshTokenState::Active => Ok(record),
        RefreshTokenState::Used => Err(TokenError::ReusedCredential {
            record_id: record.id,
        }
        .into()),
        RefreshTokenState::Expired => Err(not_found()),
    }
}
