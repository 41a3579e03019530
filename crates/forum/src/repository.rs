//! In-memory post storage that flushes domain events after each save.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use common::UniqueEntityId;
use domain::{DispatchReport, DomainEvents, WatchedList};

use crate::comment::Comment;
use crate::error::{ForumError, Result};
use crate::events::ForumEvent;
use crate::post::{Post, PostProps};
use crate::text::{PostText, PostTitle};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stored columns of a post.
#[derive(Debug, Clone)]
struct PostRow {
    member_id: UniqueEntityId,
    title: PostTitle,
    text: PostText,
    total_num_comments: usize,
    created_at: DateTime<Utc>,
}

/// Post repository backed by in-memory tables.
///
/// `save` writes the post row, applies the comment list's pending inserts and
/// deletes, and then dispatches the post's domain events.
#[derive(Debug)]
pub struct InMemoryPostRepository {
    dispatcher: DomainEvents<ForumEvent>,
    posts: Mutex<HashMap<UniqueEntityId, PostRow>>,
    comments: Mutex<HashMap<UniqueEntityId, Comment>>,
}

impl InMemoryPostRepository {
    pub fn new(dispatcher: &DomainEvents<ForumEvent>) -> Self {
        Self {
            dispatcher: dispatcher.clone(),
            posts: Mutex::new(HashMap::new()),
            comments: Mutex::new(HashMap::new()),
        }
    }

    pub fn dispatcher(&self) -> &DomainEvents<ForumEvent> {
        &self.dispatcher
    }

    /// Persists `post` and dispatches its pending events.
    #[tracing::instrument(skip(self, post), fields(post_id = %post.id()))]
    pub fn save(&self, post: &mut Post) -> Result<DispatchReport> {
        let row = PostRow {
            member_id: post.member_id().clone(),
            title: post.title().clone(),
            text: post.text().clone(),
            total_num_comments: post.total_num_comments(),
            created_at: post.props().created_at,
        };
        lock(&self.posts).insert(post.id().clone(), row);

        {
            let list = post.comments();
            let mut comments = lock(&self.comments);
            for removed in list.removed_items() {
                comments.remove(removed.id());
            }
            for added in list.new_items() {
                comments.insert(added.id().clone(), added.clone());
            }
            tracing::debug!(
                inserted = list.new_items().len(),
                deleted = list.removed_items().len(),
                "comments synchronized"
            );
        }
        post.mark_comments_persisted();
        metrics::counter!("forum_posts_saved_total").increment(1);

        Ok(self.dispatcher.dispatch_events_for_aggregate(post.id())?)
    }

    /// Loads a post with its comments, oldest comment first.
    pub fn find_by_id(&self, post_id: &UniqueEntityId) -> Result<Post> {
        let row = lock(&self.posts)
            .get(post_id)
            .cloned()
            .ok_or_else(|| ForumError::PostNotFound(post_id.clone()))?;

        let mut comments: Vec<Comment> = lock(&self.comments)
            .values()
            .filter(|c| c.post_id() == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.props().created_at);

        let props = PostProps {
            member_id: row.member_id,
            title: row.title,
            text: row.text,
            comments: WatchedList::by_eq(comments),
            total_num_comments: row.total_num_comments,
            created_at: row.created_at,
        };
        Ok(Post::restore(post_id.clone(), props, &self.dispatcher))
    }

    pub fn exists(&self, post_id: &UniqueEntityId) -> bool {
        lock(&self.posts).contains_key(post_id)
    }

    /// Number of stored comments for `post_id`.
    pub fn stored_comment_count(&self, post_id: &UniqueEntityId) -> usize {
        lock(&self.comments)
            .values()
            .filter(|c| c.post_id() == post_id)
            .count()
    }
}
