//! MySQL implementation of the TokenRepository trait.
//!
//! Refresh token records live in the `refresh_tokens` table. Secrets are
//! salted, so lookups load the unexpired candidates and verify each digest
//! through the shared hasher.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use tracing::warn;
use uuid::Uuid;

use tl_core::domain::entities::token::RefreshTokenRecord;
use tl_core::errors::{DomainError, TokenError};
use tl_core::repositories::token::lookup_outcome;
use tl_core::repositories::{LookupStrategy, TokenRepository};
use tl_core::services::token::hasher::find_matching_record;
use tl_core::services::token::SecretHasher;

const RECORD_COLUMNS: &str = "id, subject_id, secret_hash, secret_fingerprint, origin, \
     linked_access_token_id, created_at, expires_at, used";

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
    /// Hasher used to verify candidate digests
    hasher: Arc<dyn SecretHasher>,
    strategy: LookupStrategy,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    /// * `hasher` - Hasher matching the one the digests were produced with
    /// * `strategy` - How lookup candidates are selected
    pub fn new(pool: MySqlPool, hasher: Arc<dyn SecretHasher>, strategy: LookupStrategy) -> Self {
        Self {
            pool,
            hasher,
            strategy,
        }
    }

    /// Candidate query for `strategy`; the fingerprint variant takes one
    /// extra bind after the expiry instant
    pub(crate) fn lookup_query(strategy: LookupStrategy) -> String {
        match strategy {
            LookupStrategy::LinearScan => format!(
                "SELECT {} FROM refresh_tokens WHERE expires_at > ?",
                RECORD_COLUMNS
            ),
            LookupStrategy::Fingerprint => format!(
                "SELECT {} FROM refresh_tokens WHERE expires_at > ? \
                 AND (secret_fingerprint = ? OR secret_fingerprint IS NULL)",
                RECORD_COLUMNS
            ),
        }
    }

    fn store_error(context: &str, e: sqlx::Error) -> DomainError {
        tracing::error!("{}: {}", context, e);
        DomainError::Persistence {
            message: format!("{}: {}", context, e),
        }
    }

    /// Convert database row to RefreshTokenRecord entity
    fn row_to_record(row: &sqlx::mysql::MySqlRow) -> Result<RefreshTokenRecord, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get id: {}", e) })?;
        let subject_id: String = row.try_get("subject_id").map_err(|e| DomainError::Internal {
            message: format!("Failed to get subject_id: {}", e),
        })?;
        let linked: String = row
            .try_get("linked_access_token_id")
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to get linked_access_token_id: {}", e),
            })?;

        Ok(RefreshTokenRecord {
            id: parse_uuid(&id, "id")?,
            subject_id: parse_uuid(&subject_id, "subject_id")?,
            secret_hash: row.try_get("secret_hash").map_err(|e| DomainError::Internal {
                message: format!("Failed to get secret_hash: {}", e),
            })?,
            secret_fingerprint: row
                .try_get::<Option<String>, _>("secret_fingerprint")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get secret_fingerprint: {}", e),
                })?,
            origin: row.try_get("origin").map_err(|e| DomainError::Internal {
                message: format!("Failed to get origin: {}", e),
            })?,
            linked_access_token_id: parse_uuid(&linked, "linked_access_token_id")?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get created_at: {}", e),
                })?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::Internal {
                    message: format!("Failed to get expires_at: {}", e),
                })?,
            used: row.try_get("used").map_err(|e| DomainError::Internal {
                message: format!("Failed to get used: {}", e),
            })?,
        })
    }

    async fn exists(&self, id: Uuid) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT COUNT(*) AS found FROM refresh_tokens WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::store_error("Failed to check refresh token existence", e))?;

        let found: i64 = row.try_get("found").map_err(|e| DomainError::Internal {
            message: format!("Failed to get existence result: {}", e),
        })?;

        Ok(found > 0)
    }
}

fn parse_uuid(value: &str, column: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in {}: {}", column, e),
    })
}

/// Decodes candidate rows, skipping any that cannot be decoded so one
/// corrupt row never hides the valid ones
fn decodable_records<T>(
    rows: impl IntoIterator<Item = T>,
    decode: impl Fn(&T) -> Result<RefreshTokenRecord, DomainError>,
) -> Vec<RefreshTokenRecord> {
    rows.into_iter()
        .filter_map(|row| match decode(&row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable refresh token row");
                None
            }
        })
        .collect()
}

// A retry carries the same id, subject and digest; timestamps lose precision
// in DATETIME(6) and are not compared.
fn is_same_record(stored: &RefreshTokenRecord, incoming: &RefreshTokenRecord) -> bool {
    stored.id == incoming.id
        && stored.subject_id == incoming.subject_id
        && stored.secret_hash == incoming.secret_hash
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, subject_id, secret_hash, secret_fingerprint, origin,
                linked_access_token_id, created_at, expires_at, used
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(record.id.to_string())
            .bind(record.subject_id.to_string())
            .bind(&record.secret_hash)
            .bind(&record.secret_fingerprint)
            .bind(&record.origin)
            .bind(record.linked_access_token_id.to_string())
            .bind(record.created_at)
            .bind(record.expires_at)
            .bind(record.used)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(record),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                match self.find_by_id(record.id).await? {
                    Some(stored) if is_same_record(&stored, &record) => Ok(record),
                    _ => Err(DomainError::Persistence {
                        message: "Duplicate refresh token id".to_string(),
                    }),
                }
            }
            Err(e) => Err(Self::store_error("Failed to save refresh token", e)),
        }
    }

    async fn find_valid_by_matching_secret(
        &self,
        candidate: &str,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let now = Utc::now();
        let sql = Self::lookup_query(self.strategy);
        let mut query = sqlx::query(&sql).bind(now);
        if let Some(fingerprint) = self.strategy.candidate_fingerprint(candidate) {
            query = query.bind(fingerprint);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::store_error("Failed to load refresh token candidates", e))?;

        let records = decodable_records(rows, Self::row_to_record);

        let found =
            find_matching_record(self.hasher.clone(), records, candidate.to_string()).await?;
        lookup_outcome(found, now)
    }

    async fn mark_used_and_relink(
        &self,
        id: Uuid,
        new_access_token_id: Uuid,
    ) -> Result<(), DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET used = TRUE, linked_access_token_id = ?
            WHERE id = ? AND used = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(new_access_token_id.to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| Self::store_error("Failed to mark refresh token used", e))?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        if self.exists(id).await? {
            Err(TokenError::ReusedCredential { record_id: id }.into())
        } else {
            Err(DomainError::NotFound {
                resource: format!("refresh token {}", id),
            })
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let query = format!("SELECT {} FROM refresh_tokens WHERE id = ? LIMIT 1", RECORD_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::store_error("Failed to find refresh token by id", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }
}
