//! Per-scope sequence counters stored in Postgres.
//!
//! Each scope owns one row in `id_sequences`. Allocation is a single
//! conditional `UPDATE ... RETURNING`, which Postgres serializes on the row
//! lock, so concurrent callers never observe the same value. The update only
//! applies below 999, so an exhausted scope fails without consuming anything.

use async_trait::async_trait;
use pitchside_id::{AllocError, Scope, Sequence, SequenceAllocator};
use sqlx::postgres::PgPool;
use tracing::{debug, info};

use super::registry::count_with_prefix;
use super::DbError;

const MAX_SEQUENCE: i32 = Sequence::MAX.value() as i32;

/// Sequence allocator backed by the `id_sequences` table.
#[derive(Debug, Clone)]
pub struct PgSequenceAllocator {
    pool: PgPool,
    seed_from_registry: bool,
}

impl PgSequenceAllocator {
    /// Create a new allocator.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            seed_from_registry: false,
        }
    }

    /// Start new scopes after the identifiers already in `issued_ids`.
    ///
    /// Used when taking over from count-based allocation, where identifiers
    /// were issued without a counter row.
    pub fn seed_from_registry(mut self, enabled: bool) -> Self {
        self.seed_from_registry = enabled;
        self
    }

    /// Returns the last value handed out for a scope, if any.
    pub async fn last_value(&self, scope: &Scope) -> Result<Option<Sequence>, DbError> {
        let last: Option<i32> =
            sqlx::query_scalar("SELECT last_value FROM id_sequences WHERE scope = $1")
                .bind(scope.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(DbError::Query)?;
        Ok(last.and_then(|v| u64::try_from(v).ok()).and_then(Sequence::new))
    }

    /// Increments an existing counter below the cap.
    async fn bump(&self, key: &str) -> Result<Option<i32>, DbError> {
        sqlx::query_scalar(
            r#"
            UPDATE id_sequences
            SET last_value = last_value + 1,
                updated_at = now()
            WHERE scope = $1
              AND last_value < $2
            RETURNING last_value
            "#,
        )
        .bind(key)
        .bind(MAX_SEQUENCE)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::Query)
    }

    /// Creates the counter row unless another caller already did.
    async fn create(&self, key: &str, first: i32) -> Result<Option<i32>, DbError> {
        sqlx::query_scalar(
            r#"
            INSERT INTO id_sequences (scope, last_value)
            VALUES ($1, $2)
            ON CONFLICT (scope) DO NOTHING
            RETURNING last_value
            "#,
        )
        .bind(key)
        .bind(first)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::Query)
    }

    async fn seed(&self, scope: &Scope) -> Result<i32, DbError> {
        if !self.seed_from_registry {
            return Ok(0);
        }
        let existing =
            count_with_prefix(&self.pool, scope.issued_kind(), &scope.issued_prefix()).await?;
        info!(%scope, existing, "seeding sequence from registry");
        Ok(i32::try_from(existing).unwrap_or(i32::MAX))
    }

    async fn allocate(&self, scope: &Scope) -> Result<Option<i32>, DbError> {
        let key = scope.to_string();

        if let Some(value) = self.bump(&key).await? {
            return Ok(Some(value));
        }

        // No row below the cap: either the scope is new or it is exhausted.
        let seed = self.seed(scope).await?;
        if seed < MAX_SEQUENCE {
            if let Some(value) = self.create(&key, seed + 1).await? {
                return Ok(Some(value));
            }
        }

        // The row exists: created concurrently, or already at the cap.
        self.bump(&key).await
    }
}

#[async_trait]
impl SequenceAllocator for PgSequenceAllocator {
    async fn next_sequence(&self, scope: &Scope) -> Result<Sequence, AllocError> {
        let value = self.allocate(scope).await.map_err(AllocError::backend)?;
        let sequence = value
            .and_then(|v| u64::try_from(v).ok())
            .and_then(Sequence::new)
            .ok_or_else(|| AllocError::Overflow {
                scope: scope.to_string(),
            })?;
        debug!(%scope, %sequence, "allocated sequence");
        Ok(sequence)
    }
}
