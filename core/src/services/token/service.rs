//! Rotation engine: issues token pairs and exchanges refresh secrets

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::token::{AccessClaims, RefreshTokenRecord, TokenPair};
use crate::errors::{DomainError, DomainResult, TokenError, ValidationError};
use crate::repositories::TokenRepository;

use super::config::TokenServiceConfig;
use super::hasher::{hash_secret, secret_fingerprint, SecretHasher};
use super::issuer::TokenIssuer;

/// Upper bound on a presented refresh secret; anything longer is rejected
/// before it reaches the hasher.
pub const MAX_PRESENTED_SECRET_LEN: usize = 512;

/// A freshly minted and durably saved pair
struct IssuedPair {
    pair: TokenPair,
    record_id: Uuid,
    access_token_id: Uuid,
}

/// Service issuing access/refresh pairs and rotating refresh secrets
///
/// Holds no mutable state of its own; concurrent rotations coordinate
/// through the repository's conditional write.
pub struct TokenService<R: TokenRepository> {
    pub(crate) repository: R,
    issuer: TokenIssuer,
    hasher: Arc<dyn SecretHasher>,
    config: TokenServiceConfig,
}

impl<R: TokenRepository> TokenService<R> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Refresh token store
    /// * `hasher` - Hasher for refresh secrets; must match the store's
    /// * `config` - Token service configuration
    ///
    /// # Returns
    ///
    /// A new `TokenService`, `TokenError::SigningFailed` if the signing
    /// secret is unusable, or `ValidationError::OutOfRange` if a lifetime
    /// exceeds ten years
    pub fn new(
        repository: R,
        hasher: Arc<dyn SecretHasher>,
        config: TokenServiceConfig,
    ) -> DomainResult<Self> {
        config.check_lifetime_bound()?;
        let issuer = TokenIssuer::new(&config)?;

        Ok(Self {
            repository,
            issuer,
            hasher,
            config,
        })
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Issues a new token pair for a subject (cold start)
    ///
    /// # Arguments
    ///
    /// * `subject_id` - The subject's UUID in textual form
    /// * `origin` - Client IP observed on the request
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Pair whose refresh record has been saved
    /// * `Err(DomainError::Validation)` - `subject_id` is empty or not a UUID
    /// * `Err(DomainError)` - Signing, hashing or persistence failed; nothing
    ///   is handed out
    #[tracing::instrument(skip(self))]
    pub async fn issue_pair(&self, subject_id: &str, origin: &str) -> DomainResult<TokenPair> {
        let subject_id = parse_subject_id(subject_id)?;
        let issued = self.mint_pair(subject_id, origin).await?;

        info!(
            subject_id = %subject_id,
            record_id = %issued.record_id,
            "Issued token pair"
        );

        Ok(issued.pair)
    }

    /// Exchanges a refresh secret for a new pair, invalidating the old one
    ///
    /// The replacement is saved before the presented record is marked used.
    /// A failure between the two steps leaves the old credential valid and
    /// never locks the client out.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The new pair; the presented secret is now used
    /// * `Err(TokenError::InvalidCredential)` - Unknown, expired or malformed secret
    /// * `Err(TokenError::ReusedCredential)` - Secret was already exchanged or a
    ///   concurrent rotation won; callers map this to `InvalidCredential`
    /// * `Err(DomainError::Persistence)` - Store failure
    #[tracing::instrument(skip(self, presented_secret))]
    pub async fn rotate(&self, presented_secret: &str, origin: &str) -> DomainResult<TokenPair> {
        if presented_secret.is_empty() || presented_secret.len() > MAX_PRESENTED_SECRET_LEN {
            debug!("Rejected refresh secret with invalid length");
            return Err(TokenError::InvalidCredential.into());
        }

        let current = match self
            .repository
            .find_valid_by_matching_secret(presented_secret)
            .await
        {
            Ok(record) => record,
            Err(DomainError::NotFound { .. }) => {
                return Err(TokenError::InvalidCredential.into());
            }
            Err(DomainError::Token(TokenError::ReusedCredential { record_id })) => {
                warn!(
                    target: "security",
                    record_id = %record_id,
                    origin = %origin,
                    "Refresh token reuse detected"
                );
                return Err(TokenError::ReusedCredential { record_id }.into());
            }
            Err(e) => return Err(e),
        };

        let issued = self.mint_pair(current.subject_id, origin).await?;

        match self
            .repository
            .mark_used_and_relink(current.id, issued.access_token_id)
            .await
        {
            Ok(()) => {
                info!(
                    subject_id = %current.subject_id,
                    old_record_id = %current.id,
                    new_record_id = %issued.record_id,
                    "Rotated refresh token"
                );
                Ok(issued.pair)
            }
            Err(DomainError::Token(TokenError::ReusedCredential { record_id })) => {
                warn!(
                    target: "security",
                    record_id = %record_id,
                    subject_id = %current.subject_id,
                    origin = %origin,
                    "Concurrent refresh token rotation lost the race"
                );
                self.retire_unissued(&issued).await;
                Err(TokenError::ReusedCredential { record_id }.into())
            }
            Err(DomainError::NotFound { .. }) => {
                self.retire_unissued(&issued).await;
                Err(TokenError::InvalidCredential.into())
            }
            Err(e) => {
                warn!(
                    record_id = %current.id,
                    error = %e,
                    "Failed to invalidate refresh token; previous credential remains valid"
                );
                self.retire_unissued(&issued).await;
                Err(e)
            }
        }
    }

    /// Verifies an access token offline and returns its claims
    pub fn verify_access_token(&self, token: &str) -> DomainResult<AccessClaims> {
        self.issuer.verify_access_token(token)
    }

    async fn mint_pair(&self, subject_id: Uuid, origin: &str) -> DomainResult<IssuedPair> {
        let now = Utc::now();
        let access_token_id = Uuid::new_v4();
        let record_id = Uuid::new_v4();

        let access_token = self
            .issuer
            .issue_access_token(subject_id, access_token_id, origin, now)?;
        let refresh_secret = self.issuer.issue_refresh_secret()?;

        let fingerprint = secret_fingerprint(&refresh_secret);
        let secret_hash = hash_secret(self.hasher.clone(), refresh_secret.clone()).await?;

        let record = RefreshTokenRecord::new(
            record_id,
            subject_id,
            secret_hash,
            origin,
            access_token_id,
            now,
            self.config.refresh_token_ttl,
        )?
        .with_fingerprint(fingerprint);

        self.repository.save(record).await?;

        Ok(IssuedPair {
            pair: TokenPair::new(
                access_token,
                refresh_secret,
                self.config.access_token_ttl,
                self.config.refresh_token_ttl,
            ),
            record_id,
            access_token_id,
        })
    }

    // The secret of an unissued record was never returned, so marking it
    // used only keeps the store tidy. Failure here is logged and ignored.
    async fn retire_unissued(&self, issued: &IssuedPair) {
        if let Err(e) = self
            .repository
            .mark_used_and_relink(issued.record_id, issued.access_token_id)
            .await
        {
            debug!(
                record_id = %issued.record_id,
                error = %e,
                "Could not retire unissued refresh token"
            );
        }
    }
}

fn parse_subject_id(raw: &str) -> DomainResult<Uuid> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "subject_id".to_string(),
        }
        .into());
    }

    Uuid::parse_str(trimmed).map_err(|_| {
        ValidationError::InvalidFormat {
            field: "subject_id".to_string(),
        }
        .into()
    })
}
