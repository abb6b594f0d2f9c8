//! Postgres access for identifier issuance.
//!
//! Two tables back the registry: `id_sequences` holds one counter per
//! allocation scope and `issued_ids` holds every identifier handed out.

mod error;
mod registry;
mod sequences;

pub use error::DbError;
pub use registry::{IdRegistry, DEFAULT_MAX_ATTEMPTS};
pub use sequences::PgSequenceAllocator;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,

    /// Upper bound on open connections.
    pub max_connections: u32,

    /// Connections kept open while idle.
    pub min_connections: u32,

    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,

    pub idle_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/pitchside".to_string(),
            max_connections: 8,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(300),
        }
    }
}

impl DbConfig {
    /// Reads `DATABASE_URL`, `DB_MAX_CONNECTIONS`, `DB_MIN_CONNECTIONS` and
    /// `DB_ACQUIRE_TIMEOUT_SECS`; unset or unparsable values keep defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: env_or("DB_MIN_CONNECTIONS", defaults.min_connections),
            acquire_timeout: Duration::from_secs(env_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )),
            idle_timeout: defaults.idle_timeout,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(setting = name, value = %raw, "ignoring unparsable setting");
            default
        }),
        Err(_) => default,
    }
}

/// Shared handle to the registry database.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Opens a connection pool.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect(&config.database_url)
            .await
            .map_err(DbError::Connect)?;

        info!(
            max_connections = config.max_connections,
            "Connected to registry database"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trips a trivial query.
    pub async fn health_check(&self) -> Result<(), DbError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::Query)?;
        Ok(())
    }

    /// Applies the bundled migrations.
    ///
    /// The directory is looked up relative to the working directory first, so
    /// the binary also works outside the source tree.
    pub async fn run_migrations(&self) -> Result<(), DbError> {
        let candidates = [
            PathBuf::from("migrations"),
            PathBuf::from("services/registry/migrations"),
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations"),
        ];

        let Some(dir) = candidates.iter().find(|dir| dir.is_dir()) else {
            let tried = candidates
                .iter()
                .map(|dir| dir.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(DbError::MigrationDirNotFound { tried });
        };

        let migrator = Migrator::new(dir.clone())
            .await
            .map_err(DbError::Migration)?;
        migrator.run(&self.pool).await.map_err(DbError::Migration)?;
        info!(migrations_dir = %dir.display(), "Registry migrations applied");
        Ok(())
    }

    pub fn sequence_allocator(&self) -> PgSequenceAllocator {
        PgSequenceAllocator::new(self.pool.clone())
    }

    pub fn registry(&self) -> IdRegistry {
        IdRegistry::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_defaults() {
        let config = DbConfig::default();
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("PITCH_TEST_DB_POOL", "lots");
        assert_eq!(env_or("PITCH_TEST_DB_POOL", 4u32), 4);
        std::env::set_var("PITCH_TEST_DB_POOL", "12");
        assert_eq!(env_or("PITCH_TEST_DB_POOL", 4u32), 12);
        assert_eq!(env_or("PITCH_TEST_DB_POOL_UNSET", 7u64), 7);
    }
}
