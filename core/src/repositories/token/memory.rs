//! In-process implementation of TokenRepository
//!
//! Backs tests and the `memory` storage backend. All state sits behind one
//! `RwLock`, which makes `mark_used_and_relink` a plain check-and-set.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::{DomainError, TokenError};
use crate::services::token::hasher::{find_matching_record, SecretHasher};

use super::lookup::{lookup_outcome, LookupStrategy};
use super::r#trait::TokenRepository;

/// In-memory token repository
pub struct InMemoryTokenRepository {
    records: Arc<RwLock<HashMap<Uuid, RefreshTokenRecord>>>,
    hasher: Arc<dyn SecretHasher>,
    strategy: LookupStrategy,
}

impl InMemoryTokenRepository {
    /// Create an empty repository verifying secrets with `hasher`
    pub fn new(hasher: Arc<dyn SecretHasher>, strategy: LookupStrategy) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            hasher,
            strategy,
        }
    }

    pub fn strategy(&self) -> LookupStrategy {
        self.strategy
    }

    /// Number of stored records, used or not
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Snapshot of every stored record
    pub async fn records(&self) -> Vec<RefreshTokenRecord> {
        self.records.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn save(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        let mut records = self.records.write().await;

        if let Some(existing) = records.get(&record.id) {
            if *existing == record {
                return Ok(record);
            }
            return Err(DomainError::persistence("Duplicate refresh token id"));
        }

        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_valid_by_matching_secret(
        &self,
        candidate: &str,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let now = Utc::now();
        let fingerprint = self.strategy.candidate_fingerprint(candidate);

        // Verify outside the lock; the conditional write catches anything
        // that changes in between.
        let candidates: Vec<RefreshTokenRecord> = {
            let records = self.records.read().await;
            records
                .values()
                .filter(|r| !r.is_expired_at(now))
                .filter(|r| self.strategy.admits(r, fingerprint.as_deref()))
                .cloned()
                .collect()
        };

        let found =
            find_matching_record(self.hasher.clone(), candidates, candidate.to_string()).await?;
        lookup_outcome(found, now)
    }

    async fn mark_used_and_relink(
        &self,
        id: Uuid,
        new_access_token_id: Uuid,
    ) -> Result<(), DomainError> {
        let mut records = self.records.write().await;

        let record = records.get_mut(&id).ok_or_else(|| DomainError::NotFound {
            resource: format!("refresh token {}", id),
        })?;

        if record.mark_used(new_access_token_id) {
            Ok(())
        } else {
            Err(TokenError::ReusedCredential { record_id: id }.into())
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError> {
        Ok(self.records.read().await.get(&id).cloned())
    }
}
