//! Shared primitives for the forum domain kernel.
//!
//! - [`UniqueEntityId`] and [`Identifier`] for entity identity
//! - [`Outcome`] and [`Either`] for expected failures
//! - [`Guard`] precondition checks and [`Changes`] aggregation
//! - [`AppError`] and [`UseCaseError`] for the application layer

pub mod changes;
pub mod either;
pub mod error;
pub mod guard;
pub mod outcome;
pub mod types;

pub use changes::{Changes, WithChanges};
pub use either::{Either, left, right};
pub use error::{AppError, UseCaseError};
pub use guard::{Guard, GuardArgument, GuardResult};
pub use outcome::Outcome;
pub use types::{Identifier, UniqueEntityId};
