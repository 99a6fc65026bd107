//! Configuration for the token service

use chrono::Duration;
use jsonwebtoken::Algorithm;
use tl_shared::{config::MAX_TOKEN_TTL_SECONDS, TokenConfig};

use crate::domain::entities::token::{
    ACCESS_TOKEN_EXPIRY_MINUTES, JWT_ISSUER, REFRESH_TOKEN_EXPIRY_HOURS,
};
use crate::errors::{DomainError, DomainResult, ValidationError};

/// Configuration for the token service, fixed for the process lifetime
#[derive(Clone)]
pub struct TokenServiceConfig {
    /// Symmetric signing secret for access tokens
    pub signing_secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// Issuer claim
    pub issuer: String,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            signing_secret: tl_shared::config::DEVELOPMENT_SIGNING_SECRET.to_string(),
            algorithm: Algorithm::HS256,
            access_token_ttl: Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES),
            refresh_token_ttl: Duration::hours(REFRESH_TOKEN_EXPIRY_HOURS),
            issuer: JWT_ISSUER.to_string(),
        }
    }
}

impl TokenServiceConfig {
    /// Rejects lifetimes longer than ten years
    pub(crate) fn check_lifetime_bound(&self) -> DomainResult<()> {
        let max = Duration::seconds(MAX_TOKEN_TTL_SECONDS);
        if self.access_token_ttl > max {
            return Err(out_of_range("access_token_ttl"));
        }
        if self.refresh_token_ttl > max {
            return Err(out_of_range("refresh_token_ttl"));
        }
        Ok(())
    }
}

impl TryFrom<&TokenConfig> for TokenServiceConfig {
    type Error = DomainError;

    fn try_from(config: &TokenConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            signing_secret: config.signing_secret.clone(),
            algorithm: Algorithm::HS256,
            access_token_ttl: lifetime("access_token_ttl", config.access_token_ttl)?,
            refresh_token_ttl: lifetime("refresh_token_ttl", config.refresh_token_ttl)?,
            issuer: config.issuer.clone(),
        })
    }
}

fn lifetime(field: &str, seconds: i64) -> DomainResult<Duration> {
    if seconds <= 0 || seconds > MAX_TOKEN_TTL_SECONDS {
        return Err(out_of_range(field));
    }
    Ok(Duration::seconds(seconds))
}

fn out_of_range(field: &str) -> DomainError {
    ValidationError::OutOfRange {
        field: field.to_string(),
    }
    .into()
}

// Keep the signing secret out of logs.
impl std::fmt::Debug for TokenServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenServiceConfig")
            .field("algorithm", &self.algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}
