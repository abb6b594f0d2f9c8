use anyhow::{Context, Result};

use crate::db::DbConfig;

/// Registry configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub database: DbConfig,
    /// Insert attempts per issuance before giving up on duplicates.
    pub max_issue_attempts: u32,
    /// Start new counter rows after identifiers already registered.
    pub seed_from_registry: bool,
    /// Run migrations on startup.
    pub run_migrations: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            database: DbConfig::default(),
            max_issue_attempts: crate::db::DEFAULT_MAX_ATTEMPTS,
            seed_from_registry: false,
            run_migrations: false,
        }
    }
}

impl RegistryConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let max_issue_attempts = match std::env::var("PITCH_MAX_ISSUE_ATTEMPTS") {
            Ok(v) => v
                .parse::<u32>()
                .with_context(|| format!("invalid PITCH_MAX_ISSUE_ATTEMPTS: {v:?}"))?,
            Err(_) => defaults.max_issue_attempts,
        };
        if max_issue_attempts == 0 {
            anyhow::bail!("PITCH_MAX_ISSUE_ATTEMPTS must be at least 1");
        }

        Ok(Self {
            database: DbConfig::from_env(),
            max_issue_attempts,
            seed_from_registry: env_flag("PITCH_SEED_FROM_REGISTRY"),
            run_migrations: env_flag("PITCH_RUN_MIGRATIONS"),
        })
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
