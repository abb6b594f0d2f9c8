//! Error handling and display for the CLI.

use colored::Colorize;
use pitchside_id::{IdError, IssueError};
use pitchside_registry::DbError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid identifier {id:?}: {source}")]
    InvalidId {
        id: String,
        #[source]
        source: IdError,
    },

    #[error("{id} is a {kind} identifier; only applications have a parent job")]
    NotAnApplication { id: String, kind: String },

    #[error("{invalid} of {total} identifiers are invalid")]
    InvalidIds { invalid: usize, total: usize },

    #[error(transparent)]
    Issue(#[from] IssueError),

    #[error(transparent)]
    Registry(#[from] DbError),
}

impl CliError {
    pub fn invalid_id(id: impl Into<String>, source: IdError) -> Self {
        Self::InvalidId {
            id: id.into(),
            source,
        }
    }
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let hint = if let Some(cli_err) = err.downcast_ref::<CliError>() {
        cli_hint(cli_err)
    } else {
        err.downcast_ref::<DbError>().and_then(db_hint)
    };

    if let Some(hint) = hint {
        eprintln!("\n{}", format!("Hint: {hint}").yellow());
    }
}

fn cli_hint(err: &CliError) -> Option<String> {
    match err {
        CliError::InvalidId { source, .. } => id_hint(source),
        CliError::NotAnApplication { .. } => {
            Some("Application identifiers start with 'A' and are 13 characters long.".to_string())
        }
        CliError::InvalidIds { .. } => None,
        CliError::Issue(issue) => issue_hint(issue),
        CliError::Registry(db) => db_hint(db),
    }
}

fn id_hint(err: &IdError) -> Option<String> {
    match err {
        IdError::UnknownKind { .. } => Some(
            "Identifiers start with J (job), A (application) or B (booking).".to_string(),
        ),
        IdError::InvalidLength { .. } => {
            Some("Job and booking IDs are 10 characters; application IDs are 13.".to_string())
        }
        IdError::InvalidCode { .. } => {
            Some("Category, city and area codes are two uppercase letters.".to_string())
        }
        _ => None,
    }
}

fn issue_hint(err: &IssueError) -> Option<String> {
    match err {
        IssueError::InvalidParentId { source, .. } => id_hint(source)
            .or_else(|| Some("Pass the parent job ID, e.g. JCOBAPA001.".to_string())),
        IssueError::SequenceOverflow { scope } => Some(format!(
            "Scope {scope} has used every sequence from 001 to 999."
        )),
        IssueError::Allocator(_) => None,
    }
}

fn db_hint(err: &DbError) -> Option<String> {
    match err {
        DbError::Connect(_) => {
            Some("Check DATABASE_URL and that Postgres is reachable.".to_string())
        }
        DbError::UnknownParent { id } => Some(format!(
            "Job {id} is not registered. Issue jobs with `pitch issue job --backend postgres`."
        )),
        DbError::RetriesExhausted { .. } => {
            Some("Raise PITCH_MAX_ISSUE_ATTEMPTS if collisions are expected.".to_string())
        }
        DbError::MigrationDirNotFound { .. } | DbError::Query(_) => Some(
            "Set PITCH_RUN_MIGRATIONS=1 to create the registry tables on startup.".to_string(),
        ),
        DbError::Issue(issue) => issue_hint(issue),
        _ => None,
    }
}
