//! Forum error types.

use common::UniqueEntityId;
use domain::KernelError;
use thiserror::Error;

/// Errors raised by the forum layer.
#[derive(Debug, Error)]
pub enum ForumError {
    #[error("post not found: {0}")]
    PostNotFound(UniqueEntityId),

    #[error("comment not found: {0}")]
    CommentNotFound(UniqueEntityId),

    /// Event dispatch or dispatcher configuration failed.
    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("startup failed: {0}")]
    Startup(String),
}

pub type Result<T> = std::result::Result<T, ForumError>;
