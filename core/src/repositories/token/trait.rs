//! Token repository trait defining the persistence contract for refresh token records.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainError;

/// Repository trait for refresh token record persistence
///
/// Implementations never retry internally; retry policy belongs to the caller.
///
/// # Consistency Requirements
/// - A successful `mark_used_and_relink` is visible to every later lookup
/// - `mark_used_and_relink` is a conditional write: it only succeeds while
///   the record is still unused, so at most one concurrent rotation wins
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Insert a new refresh token record
    ///
    /// Saving the same record twice (a retry with a stable id) succeeds.
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The stored record
    /// * `Err(DomainError::Persistence)` - Constraint violation or store failure
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use uuid::Uuid;
    /// # use tl_core::repositories::TokenRepository;
    /// # use tl_core::domain::entities::token::RefreshTokenRecord;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let record = RefreshTokenRecord::new(
    ///     Uuid::new_v4(),
    ///     Uuid::new_v4(),
    ///     "$2b$12$...".to_string(),
    ///     "203.0.113.7",
    ///     Uuid::new_v4(),
    ///     Utc::now(),
    ///     Duration::hours(24),
    /// )?;
    ///
    /// let saved = repo.save(record).await?;
    /// println!("Refresh token saved with ID: {}", saved.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn save(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError>;

    /// Find the unexpired record whose digest verifies against `candidate`
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - Matching record, unused and unexpired
    /// * `Err(TokenError::ReusedCredential)` - Matching record was already used
    /// * `Err(DomainError::NotFound)` - Nothing verifies
    /// * `Err(DomainError::Persistence)` - Store failure
    async fn find_valid_by_matching_secret(
        &self,
        candidate: &str,
    ) -> Result<RefreshTokenRecord, DomainError>;

    /// Atomically mark a record used and relink it to its replacement access token
    ///
    /// # Returns
    /// * `Ok(())` - This call flipped the record
    /// * `Err(TokenError::ReusedCredential)` - The record was already used
    /// * `Err(DomainError::NotFound)` - No record with that id
    /// * `Err(DomainError::Persistence)` - Store failure
    async fn mark_used_and_relink(
        &self,
        id: Uuid,
        new_access_token_id: Uuid,
    ) -> Result<(), DomainError>;

    /// Find a record by its ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError>;
}

#[async_trait]
impl<T: TokenRepository + ?Sized> TokenRepository for Arc<T> {
    async fn save(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        (**self).save(record).await
    }

    async fn find_valid_by_matching_secret(
        &self,
        candidate: &str,
    ) -> Result<RefreshTokenRecord, DomainError> {
        (**self).find_valid_by_matching_secret(candidate).await
    }

    async fn mark_used_and_relink(
        &self,
        id: Uuid,
        new_access_token_id: Uuid,
    ) -> Result<(), DomainError> {
        (**self).mark_used_and_relink(id, new_access_token_id).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError> {
        (**self).find_by_id(id).await
    }
}
