//! Database error types.

use pitchside_id::IssueError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to connect to the database.
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    /// Failed to execute a query.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),

    /// No migrations directory next to the working directory or the crate.
    #[error("migrations directory not found (tried {tried})")]
    MigrationDirNotFound { tried: String },

    /// The identifier is already registered (unique violation).
    #[error("identifier already registered: {id}")]
    DuplicateId { id: String },

    /// The parent Job of an Application is not registered.
    #[error("parent job not registered: {id}")]
    UnknownParent { id: String },

    /// Issuing the identifier failed before it reached the store.
    #[error(transparent)]
    Issue(#[from] IssueError),

    /// Every attempt collided with an existing identifier.
    #[error("gave up after {attempts} attempts: every issued identifier was already registered")]
    RetriesExhausted { attempts: u32 },
}

impl DbError {
    /// Returns true if this error reports a duplicate identifier.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DbError::DuplicateId { .. })
    }
}

/// Maps a unique violation on insert to [`DbError::DuplicateId`].
pub(crate) fn map_insert_error(err: sqlx::Error, id: &str) -> DbError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return DbError::DuplicateId { id: id.to_string() };
        }
    }
    DbError::Query(err)
}
