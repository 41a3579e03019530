//! Domain kernel shared by the forum application.
//!
//! This crate provides the building blocks every bounded context uses:
//! - Entity and ValueObject for identity and value semantics
//! - AggregateRoot, which records the domain events it raises
//! - DomainEvents, the dispatcher that delivers those events after commit
//! - WatchedList for reconciling child collections against storage
//! - build_forest for threading flat parent/child records

pub mod aggregate;
pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod hierarchy;
pub mod value_object;
pub mod watched_list;

pub use aggregate::{AggregateRoot, AggregateType};
pub use config::{DispatcherConfig, FailurePolicy};
pub use entity::Entity;
pub use error::{HandlerError, HandlerResult, KernelError};
pub use events::{
    DispatchReport, DomainEvent, DomainEvents, EventHandler, HandlerFailure, NamedHandler, named,
};
pub use hierarchy::{Hierarchical, TreeNode, build_forest, children_of};
pub use value_object::ValueObject;
pub use watched_list::{ByEq, ByKey, ItemEquivalence, WatchedList};
