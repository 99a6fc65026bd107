//! Conversion of domain errors into HTTP responses
//!
//! Every refresh credential failure produces the same 401 body. Internal
//! details (store messages, digests, keys) never reach the client.

use actix_web::{http::StatusCode, HttpResponse};
use tracing::{error, warn};

use tl_core::errors::{DomainError, TokenError};
use tl_shared::{error_codes, ErrorResponse, IntoErrorResponse};

/// HTTP status for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Persistence { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Token(TokenError::InvalidCredential)
        | DomainError::Token(TokenError::ReusedCredential { .. })
        | DomainError::Token(TokenError::InvalidAccessToken)
        | DomainError::Token(TokenError::AccessTokenExpired) => StatusCode::UNAUTHORIZED,
        DomainError::Internal { .. } | DomainError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    /// Misconfiguration that fails every request until the process is fixed
    Fatal,
    Failure,
    Rejection,
}

fn severity_of(error: &DomainError, status: StatusCode) -> Severity {
    if error.is_fatal() {
        Severity::Fatal
    } else if status.is_server_error() {
        Severity::Failure
    } else {
        Severity::Rejection
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    let error = error.external();
    let status = status_for(&error);

    match severity_of(&error, status) {
        Severity::Fatal => error!(
            target: "fatal",
            error = %error,
            "Fatal token service fault; check the signing key"
        ),
        Severity::Failure => error!(error = %error, "Request failed"),
        Severity::Rejection => warn!(code = error.error_code(), "Request rejected"),
    }

    HttpResponse::build(status).json(error.to_error_response())
}

/// 400 response for bodies or queries that cannot be parsed
pub fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new(error_codes::BAD_REQUEST, message))
}

/// 503 response for requests that outlived their deadline
pub fn timeout_response() -> HttpResponse {
    warn!("Request deadline exceeded");
    HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
        error_codes::TIMEOUT,
        "The request timed out",
    ))
}
