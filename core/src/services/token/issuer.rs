//! Access token signing and refresh secret generation

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;

use crate::domain::entities::token::AccessClaims;
use crate::errors::{DomainError, DomainResult, TokenError};

use super::config::TokenServiceConfig;

/// Bytes of entropy in a refresh secret
pub const REFRESH_SECRET_BYTES: usize = 32;

/// Builds signed access tokens and opaque refresh secrets.
///
/// The signing key is injected once at construction and never looked up
/// from ambient state.
pub struct TokenIssuer {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer from the token configuration
    ///
    /// # Returns
    ///
    /// * `Err(TokenError::SigningFailed)` - The signing secret is empty
    pub fn new(config: &TokenServiceConfig) -> DomainResult<Self> {
        if config.signing_secret.is_empty() {
            return Err(TokenError::SigningFailed.into());
        }

        let secret = config.signing_secret.as_bytes();
        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(Self {
            header: Header::new(config.algorithm),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
            access_ttl: config.access_token_ttl,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Signs an access token for `subject_id` identified by `token_id`
    pub fn issue_access_token(
        &self,
        subject_id: Uuid,
        token_id: Uuid,
        origin: &str,
        issued_at: DateTime<Utc>,
    ) -> DomainResult<String> {
        let claims = AccessClaims::new(
            subject_id,
            token_id,
            origin,
            self.issuer.as_str(),
            issued_at,
            self.access_ttl,
        )?;
        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|_| TokenError::SigningFailed.into())
    }

    /// Generates a 256-bit random refresh secret, base64url encoded without padding
    pub fn issue_refresh_secret(&self) -> DomainResult<String> {
        let mut bytes = [0u8; REFRESH_SECRET_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| DomainError::Internal {
                message: "Secure random source unavailable".to_string(),
            })?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Verifies an access token offline and returns its claims
    ///
    /// # Returns
    ///
    /// * `Ok(AccessClaims)` - Signature, issuer and expiry are valid
    /// * `Err(TokenError::AccessTokenExpired)` - Token expired
    /// * `Err(TokenError::InvalidAccessToken)` - Anything else
    pub fn verify_access_token(&self, token: &str) -> DomainResult<AccessClaims> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::AccessTokenExpired.into(),
                _ => TokenError::InvalidAccessToken.into(),
            })
    }
}
