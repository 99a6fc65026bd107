//! Unit tests for token entities

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{
    AccessClaims, RefreshTokenRecord, RefreshTokenState, TokenPair,
    ACCESS_TOKEN_EXPIRY_MINUTES, JWT_ISSUER, REFRESH_TOKEN_EXPIRY_HOURS,
};
use crate::errors::DomainError;

fn new_record(ttl: Duration) -> RefreshTokenRecord {
    RefreshTokenRecord::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "$2b$04$placeholderplaceholderplaceholderplaceholderpla".to_string(),
        "203.0.113.7",
        Uuid::new_v4(),
        Utc::now(),
        ttl,
    )
    .unwrap()
}

#[test]
fn test_access_claims_creation() {
    let subject_id = Uuid::new_v4();
    let token_id = Uuid::new_v4();
    let issued_at = Utc::now();
    let claims = AccessClaims::new(
        subject_id,
        token_id,
        "203.0.113.7",
        JWT_ISSUER,
        issued_at,
        Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES),
    )
    .unwrap();

    assert_eq!(claims.subject_id, subject_id);
    assert_eq!(claims.token_id, token_id);
    assert_eq!(claims.origin, "203.0.113.7");
    assert_eq!(claims.iss, JWT_ISSUER);
    assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_EXPIRY_MINUTES * 60);
    assert!(!claims.is_expired());
}

#[test]
fn test_access_claims_expiration() {
    let claims = AccessClaims::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "203.0.113.7",
        JWT_ISSUER,
        Utc::now() - Duration::hours(1),
        Duration::minutes(15),
    )
    .unwrap();

    assert!(claims.is_expired());
}

#[test]
fn test_new_record_is_active() {
    let record = new_record(Duration::hours(REFRESH_TOKEN_EXPIRY_HOURS));

    assert!(!record.used);
    assert!(record.expires_at > record.created_at);
    assert!(record.is_active());
    assert_eq!(record.state_at(Utc::now()), RefreshTokenState::Active);
    assert!(record.secret_fingerprint.is_none());
}

#[test]
fn test_expiry_boundary_is_exclusive() {
    let record = new_record(Duration::hours(1));
    let at_expiry = record.expires_at;

    assert!(record.is_expired_at(at_expiry));
    assert!(!record.is_active_at(at_expiry));
    assert_eq!(record.state_at(at_expiry), RefreshTokenState::Expired);

    let just_before = at_expiry - Duration::milliseconds(1);
    assert!(record.is_active_at(just_before));
}

#[test]
fn test_mark_used_is_one_way() {
    let mut record = new_record(Duration::hours(1));
    let original_link = record.linked_access_token_id;
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    assert!(record.mark_used(first));
    assert!(record.used);
    assert_ne!(record.linked_access_token_id, original_link);
    assert_eq!(record.linked_access_token_id, first);

    // A second attempt leaves the record untouched
    assert!(!record.mark_used(second));
    assert_eq!(record.linked_access_token_id, first);
    assert_eq!(record.state_at(Utc::now()), RefreshTokenState::Used);
}

#[test]
fn test_used_takes_precedence_over_expired() {
    let mut record = new_record(Duration::hours(1));
    record.mark_used(Uuid::new_v4());

    assert_eq!(record.state_at(record.expires_at), RefreshTokenState::Used);
}

#[test]
fn test_token_pair_lifetimes() {
    let pair = TokenPair::new(
        "access".to_string(),
        "refresh".to_string(),
        Duration::minutes(15),
        Duration::hours(24),
    );

    assert_eq!(pair.access_expires_in, 900);
    assert_eq!(pair.refresh_expires_in, 86400);
}

#[test]
fn test_debug_output_hides_secrets() {
    let pair = TokenPair::new(
        "access-jwt-value".to_string(),
        "refresh-secret-value".to_string(),
        Duration::minutes(15),
        Duration::hours(24),
    );
    let record = new_record(Duration::hours(1)).with_fingerprint("abcdef".to_string());

    let pair_debug = format!("{:?}", pair);
    let record_debug = format!("{:?}", record);

    assert!(!pair_debug.contains("refresh-secret-value"));
    assert!(!pair_debug.contains("access-jwt-value"));
    assert!(!record_debug.contains(&record.secret_hash));
    assert!(!record_debug.contains("abcdef"));
}

#[test]
fn test_token_pair_json_field_names() {
    let pair = TokenPair::new(
        "a".to_string(),
        "r".to_string(),
        Duration::minutes(15),
        Duration::hours(24),
    );
    let json = serde_json::to_value(&pair).unwrap();

    assert_eq!(json["access_token"], "a");
    assert_eq!(json["refresh_token"], "r");
}

#[test]
fn test_overflowing_lifetime_is_an_error() {
    let result = RefreshTokenRecord::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "$2b$04$digest".to_string(),
        "203.0.113.7",
        Uuid::new_v4(),
        Utc::now(),
        Duration::days(1_000_000_000),
    );
    assert!(matches!(result, Err(DomainError::Internal { .. })));

    let claims = AccessClaims::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "203.0.113.7",
        JWT_ISSUER,
        Utc::now(),
        Duration::days(1_000_000_000),
    );
    assert!(claims.is_err());
}
