use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use tl_core::domain::entities::token::TokenPair;

/// Query string of `GET /tokens`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IssueTokensQuery {
    /// Subject UUID in canonical textual form
    #[validate(length(min = 1, max = 64))]
    pub user_id: Option<String>,
}

/// Body of `POST /refresh`
#[derive(Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

impl fmt::Debug for RefreshTokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRequest")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Token pair returned by both issuance and rotation
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub access_expires_in: i64,
    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            access_expires_in: pair.access_expires_in,
            refresh_expires_in: pair.refresh_expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_validation() {
        let valid = IssueTokensQuery {
            user_id: Some("11111111-1111-1111-1111-111111111111".to_string()),
        };
        assert!(valid.validate().is_ok());

        let empty = IssueTokensQuery {
            user_id: Some(String::new()),
        };
        assert!(empty.validate().is_err());

        // Absence is reported by the handler, not the validator
        assert!(IssueTokensQuery { user_id: None }.validate().is_ok());
    }

    #[test]
    fn test_refresh_request_debug_is_redacted() {
        let request = RefreshTokenRequest {
            refresh_token: "plaintext-secret".to_string(),
        };

        assert!(!format!("{:?}", request).contains("plaintext-secret"));
    }

    #[test]
    fn test_response_from_pair() {
        let pair = TokenPair::new(
            "access".to_string(),
            "refresh".to_string(),
            chrono::Duration::minutes(15),
            chrono::Duration::hours(24),
        );

        let response = TokenPairResponse::from(pair);
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.access_expires_in, 900);
        assert_eq!(response.refresh_expires_in, 86_400);
    }
}
