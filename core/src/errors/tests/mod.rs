//! Unit tests for domain error types

use uuid::Uuid;

use crate::errors::{DomainError, TokenError, ValidationError};

#[test]
fn test_reuse_is_a_credential_rejection() {
    let reused = DomainError::Token(TokenError::ReusedCredential {
        record_id: Uuid::new_v4(),
    });
    let invalid = DomainError::Token(TokenError::InvalidCredential);

    assert!(reused.is_credential_rejection());
    assert!(invalid.is_credential_rejection());
    assert_eq!(reused.error_code(), invalid.error_code());
}

#[test]
fn test_external_view_hides_reuse() {
    let reused = DomainError::Token(TokenError::ReusedCredential {
        record_id: Uuid::new_v4(),
    });

    assert_eq!(
        reused.external(),
        DomainError::Token(TokenError::InvalidCredential)
    );
}

#[test]
fn test_external_view_keeps_other_errors() {
    let error = DomainError::Persistence {
        message: "connection refused".to_string(),
    };

    assert_eq!(error.clone().external(), error);
    assert!(!error.is_credential_rejection());
    assert_eq!(error.error_code(), "store_unavailable");
}

#[test]
fn test_validation_error_conversion() {
    let error: DomainError = ValidationError::InvalidFormat {
        field: "subject_id".to_string(),
    }
    .into();

    assert!(matches!(error, DomainError::Validation(_)));
    assert_eq!(error.error_code(), "validation_error");
    assert!(error.to_string().contains("subject_id"));
}

#[test]
fn test_signing_failure_is_fatal() {
    assert!(DomainError::Token(TokenError::SigningFailed).is_fatal());
    assert!(!DomainError::Token(TokenError::InvalidCredential).is_fatal());
}

#[test]
fn test_credential_messages_carry_no_secret_material() {
    let message = DomainError::Token(TokenError::InvalidCredential).to_string();
    assert_eq!(message, "Invalid refresh credential");
}

#[test]
fn test_public_message_hides_internals() {
    let reused = DomainError::Token(TokenError::ReusedCredential {
        record_id: Uuid::new_v4(),
    });
    let invalid = DomainError::Token(TokenError::InvalidCredential);
    assert_eq!(reused.public_message(), invalid.public_message());

    let store = DomainError::Persistence {
        message: "Duplicate entry 'abc' for key 'PRIMARY'".to_string(),
    };
    assert!(!store.public_message().contains("PRIMARY"));
}

#[test]
fn test_error_response_body() {
    use tl_shared::IntoErrorResponse;

    let body = DomainError::Token(TokenError::InvalidCredential).to_error_response();
    assert_eq!(body.error, "invalid_credential");
    assert_eq!(body.message, "Invalid refresh token");
}
