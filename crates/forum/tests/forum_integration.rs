//! Integration tests for the forum.
//!
//! These tests run the use cases against the in-memory repository with the
//! forum handlers registered, checking what the handlers observed.

use common::{Outcome, UniqueEntityId, UseCaseError};
use domain::{DispatcherConfig, DomainEvents, FailurePolicy, KernelError};
use forum::{
    Comment, EditPost, EditPostRequest, ForumError, ForumEvent, InMemoryPostRepository, Outbox,
    Post, PostDraft, PostStats, ReplyRequest, register_handlers, reply_to_comment,
};

struct Forum {
    repo: InMemoryPostRepository,
    stats: PostStats,
    outbox: Outbox,
}

fn forum_with(policy: FailurePolicy) -> Forum {
    let dispatcher: DomainEvents<ForumEvent> =
        DomainEvents::with_config(DispatcherConfig::default().with_failure_policy(policy));
    let stats = PostStats::new();
    let outbox = Outbox::new();
    register_handlers(&dispatcher, &stats, &outbox);
    Forum {
        repo: InMemoryPostRepository::new(&dispatcher),
        stats,
        outbox,
    }
}

fn publish(forum: &Forum, author: &UniqueEntityId) -> Post {
    let draft = PostDraft {
        member_id: Some(author.clone()),
        title: Some("Async cancellation".to_string()),
        text: Some("What happens to a future when it is dropped?".to_string()),
    };
    let mut post = Post::create(draft, forum.repo.dispatcher())
        .into_value()
        .unwrap();
    forum.repo.save(&mut post).unwrap();
    post
}

fn comment(
    forum: &Forum,
    post: &Post,
    member: &UniqueEntityId,
    text: &str,
    parent: Option<&UniqueEntityId>,
) -> Outcome<UniqueEntityId, UseCaseError> {
    reply_to_comment(
        &forum.repo,
        ReplyRequest {
            post_id: post.id().clone(),
            member_id: member.clone(),
            text: text.to_string(),
            parent_comment_id: parent.cloned(),
        },
    )
}

mod discussion {
    use super::*;

    #[test]
    fn comments_update_stats_and_notify() {
        let forum = forum_with(FailurePolicy::Isolate);
        let author = UniqueEntityId::new();
        let reader = UniqueEntityId::new();
        let post = publish(&forum, &author);

        let question = comment(&forum, &post, &reader, "Is it cancelled at the next await?", None)
            .into_value()
            .unwrap();
        comment(&forum, &post, &author, "Yes, at the next await point.", Some(&question))
            .into_value()
            .unwrap();

        assert_eq!(forum.stats.post_count(), 1);
        assert_eq!(forum.stats.comment_count(post.id()), 2);

        let recipients: Vec<UniqueEntityId> =
            forum.outbox.sent().into_iter().map(|n| n.recipient).collect();
        assert_eq!(recipients, vec![author.clone(), reader.clone()]);
    }

    #[test]
    fn loaded_post_threads_replies() {
        let forum = forum_with(FailurePolicy::Isolate);
        let author = UniqueEntityId::new();
        let post = publish(&forum, &author);

        let root = comment(&forum, &post, &author, "root", None)
            .into_value()
            .unwrap();
        comment(&forum, &post, &author, "first reply", Some(&root))
            .into_value()
            .unwrap();
        comment(&forum, &post, &author, "another top-level", None)
            .into_value()
            .unwrap();

        let loaded = forum.repo.find_by_id(post.id()).unwrap();
        let threads = loaded.thread();

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].item.text(), "root");
        assert_eq!(threads[0].children[0].item.text(), "first reply");
        assert!(threads[1].children.is_empty());
    }

    #[test]
    fn removing_a_comment_updates_storage_and_stats() {
        let forum = forum_with(FailurePolicy::Isolate);
        let author = UniqueEntityId::new();
        let post = publish(&forum, &author);
        let doomed = comment(&forum, &post, &author, "spam", None)
            .into_value()
            .unwrap();

        let mut loaded = forum.repo.find_by_id(post.id()).unwrap();
        assert!(loaded.remove_comment(&doomed).is_success());
        forum.repo.save(&mut loaded).unwrap();

        assert_eq!(forum.repo.stored_comment_count(post.id()), 0);
        assert_eq!(forum.stats.comment_count(post.id()), 0);
        assert_eq!(forum.repo.find_by_id(post.id()).unwrap().total_num_comments(), 0);
    }

    #[test]
    fn two_loaded_copies_both_deliver_their_comments() {
        let forum = forum_with(FailurePolicy::Isolate);
        let author = UniqueEntityId::new();
        let reader = UniqueEntityId::new();
        let post = publish(&forum, &author);

        let mut first = forum.repo.find_by_id(post.id()).unwrap();
        let mut second = forum.repo.find_by_id(post.id()).unwrap();
        let reply = |member: &UniqueEntityId, text: &str| {
            Comment::create(post.id(), member, text, None)
                .into_value()
                .unwrap()
        };
        assert!(first.add_comment(reply(&reader, "from the first copy")).is_success());
        assert!(second.add_comment(reply(&author, "from the second copy")).is_success());

        let flushed = forum.repo.save(&mut second).unwrap();
        let after = forum.repo.save(&mut first).unwrap();

        assert_eq!(flushed.events_dispatched + after.events_dispatched, 2);
        assert!(!first.aggregate().has_pending_events());
        assert!(!second.aggregate().has_pending_events());
        assert_eq!(forum.repo.stored_comment_count(post.id()), 2);
        assert_eq!(forum.stats.comment_count(post.id()), 2);
    }

    #[test]
    fn edit_then_save_dispatches_edit_event() {
        let forum = forum_with(FailurePolicy::Isolate);
        let author = UniqueEntityId::new();
        let mut post = publish(&forum, &author);

        let result = EditPost::new().execute(
            &mut post,
            EditPostRequest {
                title: Some("Cancellation safety".to_string()),
                text: None,
            },
        );
        assert!(result.is_right());

        let report = forum.repo.save(&mut post).unwrap();
        assert_eq!(report.events_dispatched, 1);
        assert_eq!(report.handler_invocations, 0);
        assert_eq!(
            forum.repo.find_by_id(post.id()).unwrap().title().as_str(),
            "Cancellation safety"
        );
    }
}

mod handler_failures {
    use super::*;

    #[test]
    fn isolated_notifier_failure_still_saves_comment() {
        let forum = forum_with(FailurePolicy::Isolate);
        let author = UniqueEntityId::new();
        let post = publish(&forum, &author);
        forum.outbox.close();

        let outcome = comment(&forum, &post, &UniqueEntityId::new(), "still here", None);

        assert!(outcome.is_success());
        assert_eq!(forum.stats.comment_count(post.id()), 1);
        assert!(forum.outbox.sent().is_empty());
    }

    #[test]
    fn fail_fast_surfaces_as_unexpected_error() {
        let forum = forum_with(FailurePolicy::FailFast);
        let author = UniqueEntityId::new();
        let post = publish(&forum, &author);
        forum.outbox.close();

        let outcome = comment(&forum, &post, &UniqueEntityId::new(), "will it send?", None);

        assert_eq!(
            outcome.error().map(|e| e.message()),
            Some("An unexpected error occurred.")
        );
        assert_eq!(forum.repo.stored_comment_count(post.id()), 1);
        assert!(forum.repo.dispatcher().is_marked(post.id()));
    }

    #[test]
    fn save_reports_kernel_error() {
        let forum = forum_with(FailurePolicy::FailFast);
        let author = UniqueEntityId::new();
        let mut post = publish(&forum, &author);
        forum.outbox.close();

        let reply = Comment::create(post.id(), &UniqueEntityId::new(), "hi", None)
            .into_value()
            .unwrap();
        assert!(post.add_comment(reply).is_success());

        let err = forum.repo.save(&mut post).unwrap_err();
        assert!(matches!(
            err,
            ForumError::Kernel(KernelError::HandlerFailed { ref handler, .. })
                if handler == "reply-notifier"
        ));
        assert_eq!(post.aggregate().pending_event_count(), 1);
    }
}
