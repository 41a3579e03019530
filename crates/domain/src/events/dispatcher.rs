//! Deferred domain event dispatch.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::UniqueEntityId;

use super::{DomainEvent, EventHandler};
use crate::aggregate::{AggregateRoot, AggregateType, EventQueue};
use crate::config::{DispatcherConfig, FailurePolicy};
use crate::error::{KernelError, Result};

type SharedHandler<E> = Arc<dyn EventHandler<E>>;

/// An aggregate waiting for its events to be flushed.
///
/// Holds one queue per in-memory instance marked under the ID, in marking order.
struct MarkedAggregate<E> {
    id: UniqueEntityId,
    aggregate_type: &'static str,
    queues: Vec<EventQueue<E>>,
}

impl<E> MarkedAggregate<E> {
    fn attach(&mut self, queue: &EventQueue<E>) -> bool {
        if self.queues.iter().any(|q| q.is_same(queue)) {
            return false;
        }
        self.queues.push(queue.clone());
        true
    }
}

struct Registry<E> {
    config: DispatcherConfig,
    handlers: Mutex<HashMap<String, Vec<SharedHandler<E>>>>,
    marked: Mutex<Vec<MarkedAggregate<E>>>,
}

/// A handler failure isolated during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub handler: String,
    pub event_type: &'static str,
    pub reason: String,
}

/// Summary of one [`DomainEvents::dispatch_events_for_aggregate`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Type of the flushed aggregate, `None` when nothing was marked under the ID.
    pub aggregate_type: Option<&'static str>,
    /// Number of events delivered.
    pub events_dispatched: usize,
    /// Number of successful handler invocations.
    pub handler_invocations: usize,
    /// Handler failures that were isolated.
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    /// Returns true if an aggregate was found and flushed.
    pub fn was_dispatched(&self) -> bool {
        self.aggregate_type.is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Dispatcher for domain events raised by aggregates.
///
/// Keeps the handler registry and the set of aggregates with pending events.
/// One instance is built at application startup and shared by cloning the
/// handle; clones see the same registries. Tests build isolated instances.
///
/// Delivery is synchronous. Within one aggregate, events are delivered in the
/// order they were raised, and handlers for one event type run in
/// registration order. No lock is held while a handler runs, so handlers may
/// register handlers, raise events, or dispatch other aggregates.
pub struct DomainEvents<E> {
    registry: Arc<Registry<E>>,
}

impl<E> Clone for DomainEvents<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E: DomainEvent> Default for DomainEvents<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for DomainEvents<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainEvents")
            .field("config", &self.registry.config)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("handler panicked: {message}")
    } else {
        "handler panicked".to_string()
    }
}

impl<E: DomainEvent> DomainEvents<E> {
    /// Creates a dispatcher with the default configuration.
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            registry: Arc::new(Registry {
                config,
                handlers: Mutex::new(HashMap::new()),
                marked: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.registry.config
    }

    /// Registers a handler for events of `event_type`.
    ///
    /// Several handlers may share an event type; all of them run, in the
    /// order they were registered.
    pub fn register(
        &self,
        event_type: impl Into<String>,
        handler: impl EventHandler<E> + 'static,
    ) {
        let event_type = event_type.into();
        tracing::debug!(
            event_type = %event_type,
            handler = handler.name(),
            "registering domain event handler"
        );
        lock(&self.registry.handlers)
            .entry(event_type)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Returns the number of handlers registered for `event_type`.
    pub fn handler_count(&self, event_type: &str) -> usize {
        lock(&self.registry.handlers)
            .get(event_type)
            .map_or(0, Vec::len)
    }

    /// Removes every registered handler.
    pub fn clear_handlers(&self) {
        lock(&self.registry.handlers).clear();
    }

    /// Records that `aggregate` has pending events.
    ///
    /// An aggregate is recorded at most once per ID, however many times it
    /// is marked before being flushed. A second in-memory instance with the
    /// same ID joins that record, and its events are flushed after those of
    /// instances marked earlier.
    pub fn mark_aggregate_for_dispatch<P: AggregateType>(
        &self,
        aggregate: &AggregateRoot<P, E>,
    ) {
        let mut marked = lock(&self.registry.marked);
        if let Some(existing) = marked.iter_mut().find(|m| m.id == *aggregate.id()) {
            if existing.attach(aggregate.event_queue()) {
                tracing::debug!(
                    aggregate_type = P::aggregate_type(),
                    aggregate_id = %aggregate.id(),
                    instances = existing.queues.len(),
                    "another instance joined marked aggregate"
                );
            }
            return;
        }

        marked.push(MarkedAggregate {
            id: aggregate.id().clone(),
            aggregate_type: P::aggregate_type(),
            queues: vec![aggregate.event_queue().clone()],
        });
        metrics::counter!("domain_aggregates_marked_total").increment(1);
        tracing::debug!(
            aggregate_type = P::aggregate_type(),
            aggregate_id = %aggregate.id(),
            "aggregate marked for dispatch"
        );
    }

    pub fn is_marked(&self, id: &UniqueEntityId) -> bool {
        lock(&self.registry.marked).iter().any(|m| m.id == *id)
    }

    /// Returns the IDs of marked aggregates, in marking order.
    pub fn marked_aggregate_ids(&self) -> Vec<UniqueEntityId> {
        lock(&self.registry.marked)
            .iter()
            .map(|m| m.id.clone())
            .collect()
    }

    /// Forgets every marked aggregate without dispatching its events.
    pub fn clear_marked_aggregates(&self) {
        lock(&self.registry.marked).clear();
    }

    /// Delivers the pending events of the aggregate marked under `id`.
    ///
    /// Each event goes to every handler registered for its type. Afterwards
    /// the aggregate's events are cleared and it is no longer marked. When no
    /// aggregate is marked under `id` this is a no-op.
    ///
    /// With [`FailurePolicy::Isolate`] a failing or panicking handler is logged
    /// and reported, and delivery continues. With [`FailurePolicy::FailFast`]
    /// the first failure stops delivery: the failing event and every later
    /// one are put back on the aggregate, which is marked again.
    #[tracing::instrument(skip(self), fields(aggregate_id = %id))]
    pub fn dispatch_events_for_aggregate(&self, id: &UniqueEntityId) -> Result<DispatchReport> {
        let Some(aggregate) = self.take_marked(id) else {
            tracing::trace!("no aggregate marked for dispatch");
            return Ok(DispatchReport::default());
        };

        let events: Vec<(usize, E)> = aggregate
            .queues
            .iter()
            .enumerate()
            .flat_map(|(slot, queue)| queue.take_all().into_iter().map(move |e| (slot, e)))
            .collect();
        let mut report = DispatchReport {
            aggregate_type: Some(aggregate.aggregate_type),
            ..DispatchReport::default()
        };

        for (index, (_, event)) in events.iter().enumerate() {
            let event_type = event.event_type();

            for handler in self.handlers_for(event_type) {
                let Err(reason) = Self::invoke(handler.as_ref(), event) else {
                    report.handler_invocations += 1;
                    continue;
                };

                metrics::counter!(
                    "domain_event_handler_failures_total",
                    "event_type" => event_type
                )
                .increment(1);
                let failure = HandlerFailure {
                    handler: handler.name().to_string(),
                    event_type,
                    reason,
                };

                match self.registry.config.failure_policy {
                    FailurePolicy::Isolate => {
                        tracing::warn!(
                            handler = %failure.handler,
                            event_type,
                            reason = %failure.reason,
                            "domain event handler failed, continuing"
                        );
                        report.failures.push(failure);
                    }
                    FailurePolicy::FailFast => {
                        tracing::error!(
                            handler = %failure.handler,
                            event_type,
                            reason = %failure.reason,
                            "domain event handler failed, aborting dispatch"
                        );
                        Self::restore_undelivered(&aggregate, &events[index..]);
                        self.remark(aggregate);
                        return Err(KernelError::HandlerFailed {
                            handler: failure.handler,
                            event_type,
                            reason: failure.reason,
                        });
                    }
                }
            }

            report.events_dispatched += 1;
            metrics::counter!("domain_events_dispatched_total", "event_type" => event_type)
                .increment(1);
        }

        tracing::info!(
            aggregate_type = aggregate.aggregate_type,
            events = report.events_dispatched,
            handlers = report.handler_invocations,
            failures = report.failures.len(),
            "dispatched domain events"
        );

        Ok(report)
    }

    fn take_marked(&self, id: &UniqueEntityId) -> Option<MarkedAggregate<E>> {
        let mut marked = lock(&self.registry.marked);
        let index = marked.iter().position(|m| m.id == *id)?;
        Some(marked.remove(index))
    }

    fn restore_undelivered(aggregate: &MarkedAggregate<E>, undelivered: &[(usize, E)]) {
        for (slot, queue) in aggregate.queues.iter().enumerate() {
            let own: Vec<E> = undelivered
                .iter()
                .filter(|(from, _)| *from == slot)
                .map(|(_, event)| event.clone())
                .collect();
            if !own.is_empty() {
                queue.restore_front(own);
            }
        }
    }

    fn remark(&self, aggregate: MarkedAggregate<E>) {
        let mut marked = lock(&self.registry.marked);
        match marked.iter_mut().find(|m| m.id == aggregate.id) {
            Some(existing) => {
                let mut queues = aggregate.queues;
                for queue in &existing.queues {
                    if !queues.iter().any(|q| q.is_same(queue)) {
                        queues.push(queue.clone());
                    }
                }
                existing.queues = queues;
            }
            None => marked.push(aggregate),
        }
    }

    fn handlers_for(&self, event_type: &str) -> Vec<SharedHandler<E>> {
        lock(&self.registry.handlers)
            .get(event_type)
            .cloned()
            .unwrap_or_default()
    }

    fn invoke(handler: &dyn EventHandler<E>, event: &E) -> std::result::Result<(), String> {
        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(event))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err.to_string()),
            Err(payload) => Err(panic_reason(payload.as_ref())),
        }
    }
}
