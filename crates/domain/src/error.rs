//! Kernel error types.

use thiserror::Error;

/// Errors raised by the domain kernel at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// A handler failed while the dispatcher ran in fail-fast mode.
    #[error("Handler {handler} failed on {event_type}: {reason}")]
    HandlerFailed {
        handler: String,
        event_type: &'static str,
        reason: String,
    },

    /// The kernel was configured with an invalid value.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Error returned by an event handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type returned by event handlers.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
