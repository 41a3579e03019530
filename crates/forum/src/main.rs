//! Forum demo entry point.
//!
//! Publishes a post, threads a short discussion under it, and logs the
//! resulting metrics on shutdown.

use common::{Outcome, UniqueEntityId};
use domain::{DispatcherConfig, DomainEvents, TreeNode};
use forum::{
    Comment, EditPost, EditPostRequest, ForumError, ForumEvent, InMemoryPostRepository, Outbox,
    Post, PostDraft, PostStats, ReplyRequest, register_handlers, reply_to_comment,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn log_thread(nodes: &[TreeNode<Comment>], depth: usize) {
    for node in nodes {
        tracing::info!(
            depth,
            comment_id = %node.item.id(),
            text = node.item.text(),
            replies = node.children.len(),
            "thread"
        );
        log_thread(&node.children, depth + 1);
    }
}

fn reply(
    repo: &InMemoryPostRepository,
    post_id: &UniqueEntityId,
    member_id: &UniqueEntityId,
    text: &str,
    parent_comment_id: Option<UniqueEntityId>,
) -> Option<UniqueEntityId> {
    let outcome = reply_to_comment(
        repo,
        ReplyRequest {
            post_id: post_id.clone(),
            member_id: member_id.clone(),
            text: text.to_string(),
            parent_comment_id,
        },
    );
    match outcome {
        Outcome::Success(comment_id) => comment_id,
        Outcome::Failure(err) => {
            tracing::warn!(error = %err, "reply rejected");
            None
        }
    }
}

fn main() -> Result<(), ForumError> {
    // 1. Load configuration
    let config = DispatcherConfig::from_env()?;

    // 2. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 3. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|err| ForumError::Startup(err.to_string()))?;

    // 4. Wire the dispatcher, handlers and repository
    tracing::info!(failure_policy = %config.failure_policy, "starting forum");
    let dispatcher: DomainEvents<ForumEvent> = DomainEvents::with_config(config);
    let stats = PostStats::new();
    let outbox = Outbox::new();
    register_handlers(&dispatcher, &stats, &outbox);
    let repo = InMemoryPostRepository::new(&dispatcher);

    // 5. Publish a post and discuss it
    let author = UniqueEntityId::new();
    let reader = UniqueEntityId::new();
    let draft = PostDraft {
        member_id: Some(author.clone()),
        title: Some("Why does the borrow checker reject this?".to_string()),
        text: Some("I keep two mutable references to the same vector...".to_string()),
    };
    let mut post = match Post::create(draft, &dispatcher).into_result() {
        Ok(Some(post)) => post,
        Ok(None) => return Err(ForumError::Startup("post creation returned no value".into())),
        Err(reason) => return Err(ForumError::Startup(reason)),
    };
    repo.save(&mut post)?;
    let post_id = post.id().clone();

    let question = reply(&repo, &post_id, &reader, "Can you share the snippet?", None);
    if let Some(question) = question {
        reply(&repo, &post_id, &author, "Sure, it's below.", Some(question.clone()));
        reply(&repo, &post_id, &reader, "Split the borrow with split_at_mut.", Some(question));
    }
    reply(&repo, &post_id, &reader, "", None);

    let mut post = repo.find_by_id(&post_id)?;
    let edited = EditPost::new().execute(
        &mut post,
        EditPostRequest {
            title: Some("Two mutable borrows of one vector".to_string()),
            text: None,
        },
    );
    if let Some(err) = edited.left() {
        tracing::warn!(error = %err, "edit rejected");
    }
    repo.save(&mut post)?;

    // 6. Report
    log_thread(&post.thread(), 0);
    tracing::info!(
        posts = stats.post_count(),
        comments = stats.comment_count(&post_id),
        notifications = outbox.sent().len(),
        "forum session finished"
    );
    tracing::info!(metrics = %metrics_handle.render(), "final metrics");

    Ok(())
}
