//! Domain-specific error types and error handling.

mod types;

pub use types::{TokenError, ValidationError};

use thiserror::Error;
use tl_shared::{error_codes, ErrorResponse, IntoErrorResponse};

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Store unavailable or constraint violation
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// True for every refresh-credential rejection, reuse included
    pub fn is_credential_rejection(&self) -> bool {
        matches!(
            self,
            DomainError::Token(TokenError::InvalidCredential)
                | DomainError::Token(TokenError::ReusedCredential { .. })
        )
    }

    /// True when the error should be handled as a configuration fault
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::Token(TokenError::SigningFailed))
    }

    /// Collapses internal-only variants into what callers may observe
    pub fn external(self) -> DomainError {
        match self {
            DomainError::Token(TokenError::ReusedCredential { .. }) => {
                DomainError::Token(TokenError::InvalidCredential)
            }
            other => other,
        }
    }

    /// Stable code exposed to API clients
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => error_codes::VALIDATION_ERROR,
            DomainError::NotFound { .. } => error_codes::NOT_FOUND,
            DomainError::Persistence { .. } => error_codes::STORE_UNAVAILABLE,
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
            DomainError::Token(TokenError::InvalidCredential)
            | DomainError::Token(TokenError::ReusedCredential { .. }) => {
                error_codes::INVALID_CREDENTIAL
            }
            DomainError::Token(TokenError::InvalidAccessToken)
            | DomainError::Token(TokenError::AccessTokenExpired) => {
                error_codes::INVALID_ACCESS_TOKEN
            }
            DomainError::Token(_) => error_codes::INTERNAL_ERROR,
        }
    }

    /// Message safe to show to API clients
    pub fn public_message(&self) -> String {
        match self {
            DomainError::Validation(e) => e.to_string(),
            DomainError::NotFound { .. } => "Resource not found".to_string(),
            DomainError::Persistence { .. } => "Token store unavailable".to_string(),
            DomainError::Token(TokenError::InvalidCredential)
            | DomainError::Token(TokenError::ReusedCredential { .. }) => {
                "Invalid refresh token".to_string()
            }
            DomainError::Token(TokenError::InvalidAccessToken)
            | DomainError::Token(TokenError::AccessTokenExpired) => {
                "Invalid access token".to_string()
            }
            DomainError::Internal { .. } | DomainError::Token(_) => {
                "An internal error occurred".to_string()
            }
        }
    }

    pub(crate) fn persistence(message: impl Into<String>) -> Self {
        DomainError::Persistence {
            message: message.into(),
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.error_code(), self.public_message())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests;
