//! pitchside identifier registry.
//!
//! Persists the two pieces of state identifier issuance needs: a counter per
//! allocation scope and the set of identifiers already handed out. The
//! counters make allocation atomic; the registry's primary key catches any
//! identifier issued twice by a non-atomic allocator.

pub mod config;
pub mod db;

pub use config::RegistryConfig;
pub use db::{Database, DbConfig, DbError, IdRegistry, PgSequenceAllocator};

use anyhow::Result;
use pitchside_id::IdIssuer;

/// Connects, checks the database answers, optionally migrates, and returns an issuer and registry wired
/// to the configured database.
pub async fn connect(config: &RegistryConfig) -> Result<(IdIssuer<PgSequenceAllocator>, IdRegistry)> {
    let db = Database::connect(&config.database).await?;
    db.health_check().await?;
    if config.run_migrations {
        db.run_migrations().await?;
    }

    let allocator = db
        .sequence_allocator()
        .seed_from_registry(config.seed_from_registry);
    let registry = db.registry().with_max_attempts(config.max_issue_attempts);

    Ok((IdIssuer::new(allocator), registry))
}
