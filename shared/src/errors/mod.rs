//! Shared error response body returned by every HTTP endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Error codes exposed to API clients.
///
/// Credential failures of every kind (unknown, expired, reused, malformed)
/// share `INVALID_CREDENTIAL` so clients cannot tell them apart.
pub mod error_codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const INVALID_CREDENTIAL: &str = "invalid_credential";
    pub const INVALID_ACCESS_TOKEN: &str = "invalid_access_token";
    pub const NOT_FOUND: &str = "not_found";
    pub const STORE_UNAVAILABLE: &str = "store_unavailable";
    pub const TIMEOUT: &str = "timeout";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Trait for converting errors to ErrorResponse
pub trait IntoErrorResponse {
    fn to_error_response(&self) -> ErrorResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serializes_code_and_message() {
        let response = ErrorResponse::new(error_codes::INVALID_CREDENTIAL, "Invalid refresh token");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"], "invalid_credential");
        assert_eq!(json["message"], "Invalid refresh token");
        assert!(json.get("timestamp").is_some());
    }
}
