//! Tests for the in-memory token repository and lookup strategies

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::{DomainError, TokenError};
use crate::repositories::token::{
    lookup_outcome, InMemoryTokenRepository, LookupStrategy, TokenRepository,
};
use crate::services::token::hasher::secret_fingerprint;
use crate::services::token::{BcryptSecretHasher, SecretHasher};

fn hasher() -> Arc<dyn SecretHasher> {
    Arc::new(BcryptSecretHasher::new(4))
}

fn record_for(hasher: &Arc<dyn SecretHasher>, secret: &str, ttl: Duration) -> RefreshTokenRecord {
    RefreshTokenRecord::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        hasher.hash(secret).unwrap(),
        "203.0.113.7",
        Uuid::new_v4(),
        Utc::now(),
        ttl,
    )
    .unwrap()
}

#[tokio::test]
async fn test_find_by_matching_secret() {
    let hasher = hasher();
    let repo = InMemoryTokenRepository::new(hasher.clone(), LookupStrategy::LinearScan);
    let record = record_for(&hasher, "secret-one", Duration::hours(1));
    repo.save(record.clone()).await.unwrap();
    repo.save(record_for(&hasher, "secret-two", Duration::hours(1)))
        .await
        .unwrap();

    let found = repo.find_valid_by_matching_secret("secret-one").await.unwrap();
    assert_eq!(found.id, record.id);

    let missing = repo.find_valid_by_matching_secret("secret-three").await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_expired_records_are_not_candidates() {
    let hasher = hasher();
    let repo = InMemoryTokenRepository::new(hasher.clone(), LookupStrategy::LinearScan);
    repo.save(record_for(&hasher, "stale", Duration::zero()))
        .await
        .unwrap();

    let result = repo.find_valid_by_matching_secret("stale").await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_used_record_reports_reuse() {
    let hasher = hasher();
    let repo = InMemoryTokenRepository::new(hasher.clone(), LookupStrategy::LinearScan);
    let record = record_for(&hasher, "one-shot", Duration::hours(1));
    repo.save(record.clone()).await.unwrap();

    let replacement = Uuid::new_v4();
    repo.mark_used_and_relink(record.id, replacement).await.unwrap();

    let result = repo.find_valid_by_matching_secret("one-shot").await;
    assert_eq!(
        result.unwrap_err(),
        DomainError::Token(TokenError::ReusedCredential {
            record_id: record.id
        })
    );

    let stored = repo.find_by_id(record.id).await.unwrap().unwrap();
    assert!(stored.used);
    assert_eq!(stored.linked_access_token_id, replacement);
}

#[tokio::test]
async fn test_mark_used_is_single_shot() {
    let hasher = hasher();
    let repo = InMemoryTokenRepository::new(hasher.clone(), LookupStrategy::LinearScan);
    let record = record_for(&hasher, "cas", Duration::hours(1));
    repo.save(record.clone()).await.unwrap();

    let first_link = Uuid::new_v4();
    assert!(repo.mark_used_and_relink(record.id, first_link).await.is_ok());

    let second = repo.mark_used_and_relink(record.id, Uuid::new_v4()).await;
    assert!(matches!(
        second,
        Err(DomainError::Token(TokenError::ReusedCredential { .. }))
    ));

    // Loser does not overwrite the winner's link
    let stored = repo.find_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(stored.linked_access_token_id, first_link);
}

#[tokio::test]
async fn test_mark_used_unknown_record() {
    let repo = InMemoryTokenRepository::new(hasher(), LookupStrategy::LinearScan);

    let result = repo.mark_used_and_relink(Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_save_is_idempotent_for_identical_record() {
    let hasher = hasher();
    let repo = InMemoryTokenRepository::new(hasher.clone(), LookupStrategy::LinearScan);
    let record = record_for(&hasher, "retry", Duration::hours(1));

    repo.save(record.clone()).await.unwrap();
    repo.save(record.clone()).await.unwrap();
    assert_eq!(repo.len().await, 1);

    let mut conflicting = record.clone();
    conflicting.origin = "198.51.100.1".to_string();
    let result = repo.save(conflicting).await;
    assert!(matches!(result, Err(DomainError::Persistence { .. })));
}

#[tokio::test]
async fn test_malformed_digest_is_skipped() {
    let hasher = hasher();
    let repo = InMemoryTokenRepository::new(hasher.clone(), LookupStrategy::LinearScan);
    let mut broken = record_for(&hasher, "ignored", Duration::hours(1));
    broken.secret_hash = "corrupted".to_string();
    repo.save(broken).await.unwrap();
    let good = record_for(&hasher, "wanted", Duration::hours(1));
    repo.save(good.clone()).await.unwrap();

    let found = repo.find_valid_by_matching_secret("wanted").await.unwrap();
    assert_eq!(found.id, good.id);
}

#[tokio::test]
async fn test_fingerprint_strategy_narrows_and_admits_legacy_records() {
    let hasher = hasher();
    let repo = InMemoryTokenRepository::new(hasher.clone(), LookupStrategy::Fingerprint);

    let indexed = record_for(&hasher, "indexed", Duration::hours(1))
        .with_fingerprint(secret_fingerprint("indexed"));
    let legacy = record_for(&hasher, "legacy", Duration::hours(1));
    repo.save(indexed.clone()).await.unwrap();
    repo.save(legacy.clone()).await.unwrap();

    assert_eq!(
        repo.find_valid_by_matching_secret("indexed").await.unwrap().id,
        indexed.id
    );
    assert_eq!(
        repo.find_valid_by_matching_secret("legacy").await.unwrap().id,
        legacy.id
    );
}

#[test]
fn test_fingerprint_admission() {
    let hasher = hasher();
    let strategy = LookupStrategy::Fingerprint;
    let record =
        record_for(&hasher, "x", Duration::hours(1)).with_fingerprint(secret_fingerprint("x"));

    let matching = strategy.candidate_fingerprint("x");
    let other = strategy.candidate_fingerprint("y");
    assert!(strategy.admits(&record, matching.as_deref()));
    assert!(!strategy.admits(&record, other.as_deref()));

    assert_eq!(LookupStrategy::LinearScan.candidate_fingerprint("x"), None);
    assert!(LookupStrategy::LinearScan.admits(&record, None));
}

#[test]
fn test_lookup_strategy_from_str() {
    assert_eq!("scan".parse::<LookupStrategy>().unwrap(), LookupStrategy::LinearScan);
    assert_eq!(
        "Fingerprint".parse::<LookupStrategy>().unwrap(),
        LookupStrategy::Fingerprint
    );
    assert!("btree".parse::<LookupStrategy>().is_err());
    assert_eq!(LookupStrategy::default(), LookupStrategy::LinearScan);
}

#[test]
fn test_lookup_outcome_by_state() {
    let hasher = hasher();
    let now = Utc::now();
    let active = record_for(&hasher, "x", Duration::hours(1));
    assert_eq!(lookup_outcome(Some(active.clone()), now).unwrap().id, active.id);

    let mut used = active.clone();
    used.mark_used(Uuid::new_v4());
    assert!(matches!(
        lookup_outcome(Some(used), now),
        Err(DomainError::Token(TokenError::ReusedCredential { record_id }))
            if record_id == active.id
    ));

    assert!(matches!(
        lookup_outcome(Some(active.clone()), active.expires_at),
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        lookup_outcome(None, now),
        Err(DomainError::NotFound { .. })
    ));
}
