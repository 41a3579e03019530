//! Aggregate roots: entities that record the domain events they raise.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::UniqueEntityId;

use crate::entity::Entity;
use crate::events::{DomainEvent, DomainEvents};

/// Provides the type tag of an aggregate, used for diagnostics.
///
/// Implemented by the props type of each aggregate.
pub trait AggregateType {
    /// Returns the aggregate type name (e.g. `"Post"`).
    fn aggregate_type() -> &'static str;
}

/// Ordered queue of pending events, shared between an aggregate and the
/// dispatcher that will flush it.
#[derive(Debug)]
pub(crate) struct EventQueue<E>(Arc<Mutex<Vec<E>>>);

impl<E> Clone for EventQueue<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }
}

impl<E> EventQueue<E> {
    fn lock(&self) -> MutexGuard<'_, Vec<E>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true if both handles point at the same queue.
    pub(crate) fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn push(&self, event: E) {
        self.lock().push(event);
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }

    /// Removes and returns every pending event, oldest first.
    pub(crate) fn take_all(&self) -> Vec<E> {
        std::mem::take(&mut *self.lock())
    }

    /// Puts undelivered events back ahead of anything queued since they were taken.
    pub(crate) fn restore_front(&self, mut undelivered: Vec<E>) {
        let mut queue = self.lock();
        undelivered.append(&mut queue);
        *queue = undelivered;
    }
}

impl<E: Clone> EventQueue<E> {
    pub(crate) fn snapshot(&self) -> Vec<E> {
        self.lock().clone()
    }
}

/// An entity that accumulates domain events until they are dispatched.
///
/// Appending the first event marks the aggregate with its dispatcher; the
/// persistence layer flushes the events with
/// [`DomainEvents::dispatch_events_for_aggregate`] once the unit of work has
/// committed.
pub struct AggregateRoot<P, E> {
    entity: Entity<P>,
    events: EventQueue<E>,
    dispatcher: DomainEvents<E>,
}

impl<P, E> AggregateRoot<P, E>
where
    P: AggregateType,
    E: DomainEvent,
{
    /// Creates an aggregate bound to `dispatcher`, generating an ID when none is given.
    pub fn new(props: P, id: Option<UniqueEntityId>, dispatcher: &DomainEvents<E>) -> Self {
        Self {
            entity: Entity::new(props, id),
            events: EventQueue::default(),
            dispatcher: dispatcher.clone(),
        }
    }

    pub fn id(&self) -> &UniqueEntityId {
        self.entity.id()
    }

    pub fn aggregate_type(&self) -> &'static str {
        P::aggregate_type()
    }

    pub fn entity(&self) -> &Entity<P> {
        &self.entity
    }

    pub fn props(&self) -> &P {
        self.entity.props()
    }

    pub fn props_mut(&mut self) -> &mut P {
        self.entity.props_mut()
    }

    pub fn dispatcher(&self) -> &DomainEvents<E> {
        &self.dispatcher
    }

    /// Returns the pending events in the order they were raised.
    pub fn domain_events(&self) -> Vec<E> {
        self.events.snapshot()
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    pub fn has_pending_events(&self) -> bool {
        self.pending_event_count() > 0
    }

    /// Records a domain event and marks this aggregate for dispatch.
    pub fn add_domain_event(&mut self, event: E) {
        tracing::debug!(
            aggregate_type = P::aggregate_type(),
            aggregate_id = %self.id(),
            event_type = event.event_type(),
            "domain event created"
        );
        self.events.push(event);
        self.dispatcher.mark_aggregate_for_dispatch(self);
    }

    /// Drops every pending event without dispatching it.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub(crate) fn event_queue(&self) -> &EventQueue<E> {
        &self.events
    }
}

impl<P, E> PartialEq for AggregateRoot<P, E> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

impl<P, E> Eq for AggregateRoot<P, E> {}

impl<P, E> std::fmt::Debug for AggregateRoot<P, E>
where
    P: AggregateType + std::fmt::Debug,
    E: DomainEvent,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(P::aggregate_type())
            .field("id", self.id())
            .field("props", self.props())
            .field("pending_events", &self.pending_event_count())
            .finish()
    }
}
