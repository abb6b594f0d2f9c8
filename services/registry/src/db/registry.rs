//! Registry of issued identifiers.
//!
//! The registry is the store side of issuance: it counts identifiers by
//! prefix and inserts new ones under a primary-key constraint, reporting
//! collisions as [`DbError::DuplicateId`] so callers can retry.

use std::future::Future;

use async_trait::async_trait;
use pitchside_id::{
    AllocError, AnyId, ApplicationId, BookingId, EntityKind, IdIssuer, IssueError, JobId,
    PrefixCounter, SequenceAllocator,
};
use sqlx::postgres::PgPool;
use tracing::{debug, warn};

use super::error::map_insert_error;
use super::DbError;

/// Default number of insert attempts for one issuance.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Store for issued identifiers.
#[derive(Debug, Clone)]
pub struct IdRegistry {
    pool: PgPool,
    max_attempts: u32,
}

impl IdRegistry {
    /// Create a new registry.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets how many times an issuance is retried after a duplicate insert.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Counts registered identifiers of `kind` starting with `prefix`.
    pub async fn count_with_prefix(&self, kind: EntityKind, prefix: &str) -> Result<u64, DbError> {
        count_with_prefix(&self.pool, kind, prefix).await
    }

    /// Registers an identifier.
    ///
    /// # Errors
    ///
    /// Returns `DbError::DuplicateId` if the identifier is already registered.
    pub async fn insert(&self, id: &AnyId) -> Result<(), DbError> {
        let text = id.to_string();
        sqlx::query("INSERT INTO issued_ids (id, kind) VALUES ($1, $2)")
            .bind(&text)
            .bind(id.kind().as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, &text))?;
        Ok(())
    }

    /// Reports whether an identifier is registered.
    pub async fn exists(&self, id: &str) -> Result<bool, DbError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM issued_ids WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::Query)
    }

    /// Issues identifiers with `issue` until one inserts cleanly.
    ///
    /// Only duplicate inserts are retried. Issuance errors (overflow, invalid
    /// parent) and other store errors are returned at once.
    pub async fn issue_with<T, F, Fut>(&self, mut issue: F) -> Result<T, DbError>
    where
        T: Into<AnyId> + Copy,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, IssueError>>,
    {
        for attempt in 1..=self.max_attempts {
            let id = issue().await?;
            let any: AnyId = id.into();
            match self.insert(&any).await {
                Ok(()) => {
                    debug!(id = %any, attempt, "registered id");
                    return Ok(id);
                }
                Err(DbError::DuplicateId { id }) => {
                    warn!(%id, attempt, "issued id already registered, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(DbError::RetriesExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Issues and registers a Job ID.
    pub async fn issue_job<A: SequenceAllocator>(
        &self,
        issuer: &IdIssuer<A>,
        category: &str,
        location: &str,
    ) -> Result<JobId, DbError> {
        self.issue_with(move || issuer.compose_job_id(category, location))
            .await
    }

    /// Issues and registers a Booking ID.
    pub async fn issue_booking<A: SequenceAllocator>(
        &self,
        issuer: &IdIssuer<A>,
        category: &str,
        location: &str,
    ) -> Result<BookingId, DbError> {
        self.issue_with(move || issuer.compose_booking_id(category, location))
            .await
    }

    /// Issues and registers an Application ID under a registered Job.
    ///
    /// # Errors
    ///
    /// Returns `DbError::UnknownParent` if the parent is well formed but not
    /// registered.
    pub async fn issue_application<A: SequenceAllocator>(
        &self,
        issuer: &IdIssuer<A>,
        parent_job_id: &str,
    ) -> Result<ApplicationId, DbError> {
        let parent = JobId::parse(parent_job_id).map_err(|source| IssueError::InvalidParentId {
            id: parent_job_id.to_string(),
            source,
        })?;
        if !self.exists(&parent.to_string()).await? {
            return Err(DbError::UnknownParent {
                id: parent.to_string(),
            });
        }
        let parent = &parent;
        self.issue_with(move || issuer.application_for(parent)).await
    }
}

#[async_trait]
impl PrefixCounter for IdRegistry {
    async fn count_with_prefix(&self, kind: EntityKind, prefix: &str) -> Result<u64, AllocError> {
        count_with_prefix(&self.pool, kind, prefix)
            .await
            .map_err(AllocError::backend)
    }
}

pub(crate) async fn count_with_prefix(
    pool: &PgPool,
    kind: EntityKind,
    prefix: &str,
) -> Result<u64, DbError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM issued_ids
        WHERE kind = $1
          AND id LIKE $2 ESCAPE '\'
        "#,
    )
    .bind(kind.as_str())
    .bind(like_prefix(prefix))
    .fetch_one(pool)
    .await
    .map_err(DbError::Query)?;

    Ok(u64::try_from(count).unwrap_or(0))
}

/// Escapes LIKE metacharacters and appends the wildcard.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
