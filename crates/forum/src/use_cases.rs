//! Application use cases for posts and comments.

use common::{AppError, Changes, Either, Outcome, UniqueEntityId, UseCaseError, WithChanges};
use common::{left, right};

use crate::comment::Comment;
use crate::error::ForumError;
use crate::post::Post;
use crate::repository::InMemoryPostRepository;

/// Fields to change on a post. Absent fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct EditPostRequest {
    pub title: Option<String>,
    pub text: Option<String>,
}

/// Applies an edit to a post, recording the outcome of every field change.
#[derive(Debug, Default)]
pub struct EditPost {
    changes: Changes,
}

impl WithChanges for EditPost {
    fn changes(&self) -> &Changes {
        &self.changes
    }
}

impl EditPost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `request` to `post`.
    ///
    /// Valid field changes are applied even when another one fails; the first
    /// failure is returned on the left.
    pub fn execute(
        &mut self,
        post: &mut Post,
        request: EditPostRequest,
    ) -> Either<UseCaseError, ()> {
        if request.title.is_none() && request.text.is_none() {
            return left(UseCaseError::new("Nothing to edit."));
        }

        if let Some(title) = &request.title {
            self.changes.add_change(post.update_title(title));
        }
        if let Some(text) = &request.text {
            self.changes.add_change(post.update_text(text));
        }

        match self.changes.change_result() {
            Outcome::Failure(reason) => left(UseCaseError::new(reason)),
            Outcome::Success(_) => right(()),
        }
    }
}

/// Input for commenting on a post or replying to a comment.
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    pub post_id: UniqueEntityId,
    pub member_id: UniqueEntityId,
    pub text: String,
    pub parent_comment_id: Option<UniqueEntityId>,
}

/// Posts a comment and saves the post, returning the new comment's ID.
///
/// Expected failures (unknown post, invalid text, unknown parent) are
/// reported with their reason; anything else is an unexpected error.
pub fn reply_to_comment(
    repo: &InMemoryPostRepository,
    request: ReplyRequest,
) -> Outcome<UniqueEntityId, UseCaseError> {
    let mut post = match repo.find_by_id(&request.post_id) {
        Ok(post) => post,
        Err(ForumError::PostNotFound(id)) => {
            let reason = format!("Couldn't find a post by id {id}.");
            return Outcome::fail(UseCaseError::new(reason));
        }
        Err(err) => return AppError::unexpected(err).into_outcome(),
    };

    let comment = match Comment::create(
        post.id(),
        &request.member_id,
        &request.text,
        request.parent_comment_id,
    )
    .into_result()
    {
        Ok(Some(comment)) => comment,
        Ok(None) => {
            return AppError::unexpected("comment creation returned no value").into_outcome();
        }
        Err(reason) => return Outcome::fail(UseCaseError::new(reason)),
    };
    let comment_id = comment.id().clone();

    if let Outcome::Failure(reason) = post.add_comment(comment) {
        return Outcome::fail(UseCaseError::new(reason));
    }

    match repo.save(&mut post) {
        Ok(report) => {
            metrics::counter!("forum_comments_posted_total").increment(1);
            tracing::info!(
                post_id = %post.id(),
                %comment_id,
                handler_failures = report.failures.len(),
                "comment posted"
            );
            Outcome::ok(comment_id)
        }
        Err(err) => AppError::unexpected(err).into_outcome(),
    }
}

#[cfg(test)]
mod tests {
    use domain::DomainEvents;

    use super::*;
    use crate::post::PostDraft;

    fn seeded() -> (InMemoryPostRepository, Post) {
        let repo = InMemoryPostRepository::new(&DomainEvents::new());
        let draft = PostDraft {
            member_id: Some(UniqueEntityId::new()),
            title: Some("Iterators".to_string()),
            text: Some("Adapters, laziness and collect.".to_string()),
        };
        let mut post = Post::create(draft, repo.dispatcher()).into_value().unwrap();
        repo.save(&mut post).unwrap();
        (repo, post)
    }

    #[test]
    fn edit_applies_valid_changes() {
        let (_repo, mut post) = seeded();
        let mut edit = EditPost::new();
        let result = edit.execute(
            &mut post,
            EditPostRequest {
                title: Some("Iterator adapters".to_string()),
                text: None,
            },
        );

        assert!(result.is_right());
        assert_eq!(post.title().as_str(), "Iterator adapters");
        assert_eq!(edit.changes().len(), 1);
    }

    #[test]
    fn edit_reports_first_failure() {
        let (_repo, mut post) = seeded();
        let mut edit = EditPost::new();
        let result = edit.execute(
            &mut post,
            EditPostRequest {
                title: Some("Iterator adapters".to_string()),
                text: Some("tiny".to_string()),
            },
        );

        let err = result.left().unwrap();
        assert_eq!(err.message(), "Invalid text. Text is not at least 20 chars.");
        assert_eq!(post.title().as_str(), "Iterator adapters");
        assert!(edit.changes().change_result().is_failure());
    }

    #[test]
    fn empty_edit_is_rejected() {
        let (_repo, mut post) = seeded();
        let result = EditPost::new().execute(&mut post, EditPostRequest::default());
        assert_eq!(result.left().unwrap().message(), "Nothing to edit.");
    }

    #[test]
    fn reply_saves_comment() {
        let (repo, post) = seeded();
        let outcome = reply_to_comment(
            &repo,
            ReplyRequest {
                post_id: post.id().clone(),
                member_id: UniqueEntityId::new(),
                text: "Great overview".to_string(),
                parent_comment_id: None,
            },
        );

        let comment_id = outcome.into_value().unwrap();
        let loaded = repo.find_by_id(post.id()).unwrap();
        assert!(loaded.find_comment(&comment_id).is_some());
    }

    #[test]
    fn reply_to_unknown_post_fails() {
        let (repo, _post) = seeded();
        let missing = UniqueEntityId::from_value("missing");
        let outcome = reply_to_comment(
            &repo,
            ReplyRequest {
                post_id: missing,
                member_id: UniqueEntityId::new(),
                text: "hello?".to_string(),
                parent_comment_id: None,
            },
        );

        assert_eq!(
            outcome.error().map(UseCaseError::message),
            Some("Couldn't find a post by id missing.")
        );
    }
}
