use thiserror::Error;

/// Errors surfaced by habit stack operations.
///
/// Every failure is reported synchronously to the caller of the operation
/// that triggered it. None of them are retried automatically, except that
/// version conflicts are retried internally a bounded number of times
/// before surfacing as [`StackError::Conflict`].
#[derive(Debug, Error)]
pub enum StackError {
    #[error("Habit stack not found: {0}")]
    NotFound(String),

    #[error("Habit not found: {habit_id} in stack {stack_id}")]
    HabitNotFound { stack_id: String, habit_id: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Habit stack {id} was modified concurrently (version {expected} is stale)")]
    Conflict { id: String, expected: u64 },

    #[error("Persistence error: {0:#}")]
    Persistence(anyhow::Error),
}

impl StackError {
    pub(crate) fn persistence(e: impl Into<anyhow::Error>) -> Self {
        Self::Persistence(e.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::HabitNotFound { .. })
    }
}

pub type StackResult<T> = Result<T, StackError>;
