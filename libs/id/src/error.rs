//! Error types for ID parsing, sequence allocation and issuance.

use thiserror::Error;

use crate::EntityKind;

/// Boxed error from an allocator backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when parsing or validating IDs.
///
/// Parsing never panics; every malformed input maps to one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The ID string is empty.
    #[error("ID cannot be empty")]
    Empty,

    /// The leading character is not a known entity prefix.
    #[error("unknown ID prefix '{found}': expected one of 'J', 'A', 'B'")]
    UnknownKind { found: char },

    /// The ID does not have the fixed width of its kind.
    #[error("invalid {kind} ID length: expected {expected}, got {actual}")]
    InvalidLength {
        kind: EntityKind,
        expected: usize,
        actual: usize,
    },

    /// A code field is not two uppercase ASCII letters.
    #[error("invalid {field} code '{value}'")]
    InvalidCode { field: &'static str, value: String },

    /// A sequence field is not three digits in 001..=999.
    #[error("invalid {field} '{value}': expected three digits from 001 to 999")]
    InvalidSequence { field: &'static str, value: String },

    /// The ID is well formed but names a different kind of entity.
    #[error("expected a {expected} ID, got a {actual} ID")]
    WrongKind {
        expected: EntityKind,
        actual: EntityKind,
    },
}

impl IdError {
    /// Returns true if this error is about the leading kind character.
    pub fn is_prefix_error(&self) -> bool {
        matches!(self, IdError::UnknownKind { .. } | IdError::WrongKind { .. })
    }
}

/// Errors raised by a sequence allocator.
#[derive(Debug, Error)]
pub enum AllocError {
    /// The scope has already issued 999 sequence numbers.
    #[error("sequence overflow in scope '{scope}': no sequence numbers left above 999")]
    Overflow { scope: String },

    /// The backing store failed.
    #[error("allocator backend failed: {0}")]
    Backend(#[source] BoxError),
}

impl AllocError {
    /// Wraps a backend failure.
    pub fn backend(err: impl Into<BoxError>) -> Self {
        AllocError::Backend(err.into())
    }
}

/// Errors returned when issuing a new identifier.
#[derive(Debug, Error)]
pub enum IssueError {
    /// The supplied parent is not a well-formed Job ID.
    #[error("invalid parent job ID '{id}': {source}")]
    InvalidParentId {
        id: String,
        #[source]
        source: IdError,
    },

    /// The scope has run out of sequence numbers.
    #[error("sequence overflow in scope '{scope}'")]
    SequenceOverflow { scope: String },

    /// The allocator backend failed.
    #[error("sequence allocation failed: {0}")]
    Allocator(#[source] BoxError),
}

impl From<AllocError> for IssueError {
    fn from(err: AllocError) -> Self {
        match err {
            AllocError::Overflow { scope } => IssueError::SequenceOverflow { scope },
            AllocError::Backend(source) => IssueError::Allocator(source),
        }
    }
}
