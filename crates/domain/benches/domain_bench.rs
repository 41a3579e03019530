use chrono::{DateTime, Utc};
use common::UniqueEntityId;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use domain::{AggregateRoot, AggregateType, DomainEvent, DomainEvents, HandlerResult, WatchedList};

#[derive(Debug, Clone)]
struct ThreadProps;

impl AggregateType for ThreadProps {
    fn aggregate_type() -> &'static str {
        "Thread"
    }
}

#[derive(Debug, Clone)]
struct ReplyPosted {
    thread_id: UniqueEntityId,
    at: DateTime<Utc>,
}

impl DomainEvent for ReplyPosted {
    fn event_type(&self) -> &'static str {
        "ReplyPosted"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.at
    }

    fn aggregate_id(&self) -> &UniqueEntityId {
        &self.thread_id
    }
}

fn bench_watched_list_churn(c: &mut Criterion) {
    let baseline: Vec<u32> = (0..100).collect();

    c.bench_function("domain/watched_list_churn_100", |b| {
        b.iter_batched(
            || WatchedList::by_eq(baseline.clone()),
            |mut list| {
                for n in 0..50 {
                    list.remove(&n);
                    list.add(n + 100);
                }
                for n in 0..25 {
                    list.add(n);
                }
                list
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_dispatch_single_event(c: &mut Criterion) {
    let dispatcher: DomainEvents<ReplyPosted> = DomainEvents::new();
    dispatcher.register("ReplyPosted", |_: &ReplyPosted| -> HandlerResult { Ok(()) });

    c.bench_function("domain/dispatch_single_event", |b| {
        b.iter(|| {
            let mut thread = AggregateRoot::new(ThreadProps, None, &dispatcher);
            let event = ReplyPosted {
                thread_id: thread.id().clone(),
                at: Utc::now(),
            };
            thread.add_domain_event(event);
            dispatcher
                .dispatch_events_for_aggregate(thread.id())
                .unwrap()
        });
    });
}

fn bench_dispatch_100_events(c: &mut Criterion) {
    let dispatcher: DomainEvents<ReplyPosted> = DomainEvents::new();
    for _ in 0..3 {
        dispatcher.register("ReplyPosted", |_: &ReplyPosted| -> HandlerResult { Ok(()) });
    }

    c.bench_function("domain/dispatch_100_events_3_handlers", |b| {
        b.iter_batched(
            || {
                let mut thread = AggregateRoot::new(ThreadProps, None, &dispatcher);
                for _ in 0..100 {
                    let event = ReplyPosted {
                        thread_id: thread.id().clone(),
                        at: Utc::now(),
                    };
                    thread.add_domain_event(event);
                }
                thread
            },
            |thread| {
                dispatcher
                    .dispatch_events_for_aggregate(thread.id())
                    .unwrap()
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_watched_list_churn,
    bench_dispatch_single_event,
    bench_dispatch_100_events,
);
criterion_main!(benches);
