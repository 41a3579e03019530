//! Reactions to forum events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::UniqueEntityId;
use domain::{DomainEvents, EventHandler, HandlerError, HandlerResult};

use crate::events::ForumEvent;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A message queued for a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: UniqueEntityId,
    pub post_id: UniqueEntityId,
    pub message: String,
}

/// In-memory delivery channel for notifications.
///
/// Cloning shares the queue. A closed outbox rejects deliveries, which is how
/// an unavailable mail service shows up.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    sent: Arc<Mutex<Vec<Notification>>>,
    closed: Arc<AtomicBool>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliver(&self, notification: Notification) -> HandlerResult {
        if self.closed.load(Ordering::SeqCst) {
            return Err(HandlerError::new("outbox is closed"));
        }
        lock(&self.sent).push(notification);
        Ok(())
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn reopen(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Notification> {
        lock(&self.sent).clone()
    }
}

/// Tells authors about new comments on their posts and replies to their comments.
#[derive(Debug, Clone)]
pub struct ReplyNotifier {
    outbox: Outbox,
}

impl ReplyNotifier {
    pub fn new(outbox: Outbox) -> Self {
        Self { outbox }
    }
}

impl EventHandler<ForumEvent> for ReplyNotifier {
    fn name(&self) -> &str {
        "reply-notifier"
    }

    fn handle(&self, event: &ForumEvent) -> HandlerResult {
        let ForumEvent::CommentPosted(data) = event else {
            return Ok(());
        };

        let (recipient, message) = match &data.parent_author_id {
            Some(parent_author) => (parent_author, "Someone replied to your comment"),
            None => (&data.post_author_id, "Someone commented on your post"),
        };
        if *recipient == data.member_id {
            return Ok(());
        }

        tracing::debug!(%recipient, post_id = %data.post_id, "sending reply notification");
        self.outbox.deliver(Notification {
            recipient: recipient.clone(),
            post_id: data.post_id.clone(),
            message: message.to_string(),
        })
    }
}

/// Read-side counters kept up to date from forum events.
#[derive(Debug, Clone, Default)]
pub struct PostStats {
    comment_counts: Arc<Mutex<HashMap<UniqueEntityId, usize>>>,
    posts: Arc<AtomicUsize>,
}

impl PostStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_count(&self) -> usize {
        self.posts.load(Ordering::SeqCst)
    }

    pub fn comment_count(&self, post_id: &UniqueEntityId) -> usize {
        lock(&self.comment_counts)
            .get(post_id)
            .copied()
            .unwrap_or_default()
    }
}

impl EventHandler<ForumEvent> for PostStats {
    fn name(&self) -> &str {
        "post-stats"
    }

    fn handle(&self, event: &ForumEvent) -> HandlerResult {
        match event {
            ForumEvent::PostCreated(data) => {
                self.posts.fetch_add(1, Ordering::SeqCst);
                lock(&self.comment_counts).insert(data.post_id.clone(), 0);
            }
            ForumEvent::CommentPosted(data) => {
                *lock(&self.comment_counts)
                    .entry(data.post_id.clone())
                    .or_default() += 1;
            }
            ForumEvent::CommentRemoved(data) => {
                if let Some(count) = lock(&self.comment_counts).get_mut(&data.post_id) {
                    *count = count.saturating_sub(1);
                }
            }
            ForumEvent::PostEdited(_) => {}
        }
        Ok(())
    }
}

/// Subscribes the forum handlers to the events they react to.
pub fn register_handlers(
    dispatcher: &DomainEvents<ForumEvent>,
    stats: &PostStats,
    outbox: &Outbox,
) {
    for event_type in [
        ForumEvent::POST_CREATED,
        ForumEvent::COMMENT_POSTED,
        ForumEvent::COMMENT_REMOVED,
    ] {
        dispatcher.register(event_type, stats.clone());
    }
    dispatcher.register(ForumEvent::COMMENT_POSTED, ReplyNotifier::new(outbox.clone()));

    tracing::info!(
        comment_posted = dispatcher.handler_count(ForumEvent::COMMENT_POSTED),
        "forum event handlers registered"
    );
}
