//! Domain events and the handlers that react to them.

mod dispatcher;

use chrono::{DateTime, Utc};
use common::UniqueEntityId;

use crate::error::HandlerResult;

pub use dispatcher::{DispatchReport, DomainEvents, HandlerFailure};

/// Trait for domain events.
///
/// Domain events represent facts that have happened to an aggregate.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Returns the event type name.
    ///
    /// This is the key handlers are registered under.
    fn event_type(&self) -> &'static str;

    /// Returns when the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Returns the ID of the aggregate that raised the event.
    fn aggregate_id(&self) -> &UniqueEntityId;
}

/// Reacts to domain events of the kinds it was registered for.
///
/// Any `Fn(&E) -> HandlerResult` closure is a handler; wrap it with
/// [`named`] to give it a name in logs.
pub trait EventHandler<E>: Send + Sync {
    /// Returns the handler name used in logs and failure reports.
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Handles a single event.
    fn handle(&self, event: &E) -> HandlerResult;
}

impl<E, F> EventHandler<E> for F
where
    F: Fn(&E) -> HandlerResult + Send + Sync,
{
    fn handle(&self, event: &E) -> HandlerResult {
        self(event)
    }
}

/// A closure handler carrying a name.
pub struct NamedHandler<F> {
    name: &'static str,
    handler: F,
}

/// Gives a closure handler a name.
pub fn named<E, F>(name: &'static str, handler: F) -> NamedHandler<F>
where
    F: Fn(&E) -> HandlerResult + Send + Sync,
{
    NamedHandler { name, handler }
}

impl<E, F> EventHandler<E> for NamedHandler<F>
where
    F: Fn(&E) -> HandlerResult + Send + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    fn handle(&self, event: &E) -> HandlerResult {
        (self.handler)(event)
    }
}
