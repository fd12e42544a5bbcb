//! Error types for journal operations.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by the idea journal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JournalError {
    /// Required price fields are blank; nothing was committed
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A record with this id is already in the journal
    #[error("duplicate idea id: {0}")]
    DuplicateId(Uuid),

    /// No record with this id
    #[error("idea not found: {0}")]
    NotFound(Uuid),
}
