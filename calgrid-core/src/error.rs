//! Error types for the calgrid engine.

use thiserror::Error;

/// Errors that can occur in calgrid operations.
#[derive(Error, Debug)]
pub enum CalGridError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Reschedule(#[from] RescheduleError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalGridError {
    /// True for failures that were caught before reaching the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, CalGridError::Validation(_))
    }
}

impl From<serde_json::Error> for CalGridError {
    fn from(err: serde_json::Error) -> Self {
        CalGridError::Serialization(err.to_string())
    }
}

/// Field-level problems with an event, reported before any store call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("end must be after start for timed events")]
    EndNotAfterStart,
}

impl ValidationError {
    /// Name of the form field the error should be shown next to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyTitle => "title",
            ValidationError::EndNotAfterStart => "end",
        }
    }
}

/// Reasons a drag gesture was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RescheduleError {
    #[error("event '{0}' is not in the current view")]
    UnknownEvent(String),

    #[error("event '{0}' has a commit in flight")]
    CommitInFlight(String),

    #[error("another drag gesture is already active")]
    GestureActive,
}

/// Result type alias for calgrid operations.
pub type CalGridResult<T> = Result<T, CalGridError>;
