use thiserror::Error;

use crate::outcome::Outcome;

/// Error returned by an application use case for an expected failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UseCaseError {
    message: String,
}

impl UseCaseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors shared by every application use case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Something failed that the use case did not anticipate.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl AppError {
    /// Records an unexpected error, logging the underlying cause.
    pub fn unexpected(err: impl std::fmt::Display) -> Self {
        let cause = err.to_string();
        tracing::error!(error = %cause, "an unexpected error occurred");
        Self::Unexpected(cause)
    }

    /// Converts the error into a failed use-case outcome.
    pub fn into_outcome<T>(self) -> Outcome<T, UseCaseError> {
        match self {
            Self::Unexpected(_) => {
                Outcome::Failure(UseCaseError::new("An unexpected error occurred."))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_error_keeps_cause() {
        let err = AppError::unexpected("connection reset");
        assert_eq!(err, AppError::Unexpected("connection reset".to_string()));
        assert_eq!(
            err.to_string(),
            "An unexpected error occurred: connection reset"
        );
    }

    #[test]
    fn unexpected_error_becomes_failed_outcome() {
        let outcome: Outcome<u32, UseCaseError> = AppError::unexpected("boom").into_outcome();
        assert!(outcome.is_failure());
        assert_eq!(
            outcome.error().map(UseCaseError::message),
            Some("An unexpected error occurred.")
        );
    }
}
