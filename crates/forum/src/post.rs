//! The post aggregate.

use chrono::{DateTime, Utc};
use common::{Guard, GuardArgument, Outcome, UniqueEntityId};
use domain::{AggregateRoot, AggregateType, DomainEvents, TreeNode, WatchedList};

use crate::comment::{self, Comment, CommentList};
use crate::events::{CommentPostedData, EditedField, ForumEvent};
use crate::text::{PostText, PostTitle};

#[derive(Debug, Clone)]
pub struct PostProps {
    pub member_id: UniqueEntityId,
    pub title: PostTitle,
    pub text: PostText,
    pub comments: CommentList,
    pub total_num_comments: usize,
    pub created_at: DateTime<Utc>,
}

impl AggregateType for PostProps {
    fn aggregate_type() -> &'static str {
        "Post"
    }
}

/// Raw input for publishing a post, as received from a request.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub member_id: Option<UniqueEntityId>,
    pub title: Option<String>,
    pub text: Option<String>,
}

fn validated<T>(outcome: Outcome<T>) -> Result<T, String> {
    match outcome.into_result() {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err("Value is missing.".to_string()),
        Err(reason) => Err(reason),
    }
}

/// A forum post and its comments.
#[derive(Debug)]
pub struct Post {
    root: AggregateRoot<PostProps, ForumEvent>,
}

impl Post {
    /// Publishes a new post, raising `PostCreated`.
    pub fn create(draft: PostDraft, dispatcher: &DomainEvents<ForumEvent>) -> Outcome<Self> {
        let presence = Guard::against_null_or_undefined_bulk(&[
            GuardArgument::new(&draft.member_id, "memberId"),
            GuardArgument::new(&draft.title, "title"),
            GuardArgument::new(&draft.text, "text"),
        ]);
        if let Outcome::Failure(reason) = presence {
            return Outcome::fail(reason);
        }

        let (Some(member_id), Some(title), Some(text)) = (draft.member_id, draft.title, draft.text)
        else {
            return Outcome::fail("Post draft is incomplete.");
        };

        let title = match validated(PostTitle::create(title)) {
            Ok(title) => title,
            Err(reason) => return Outcome::fail(reason),
        };
        let text = match validated(PostText::create(text)) {
            Ok(text) => text,
            Err(reason) => return Outcome::fail(reason),
        };

        let props = PostProps {
            member_id,
            title,
            text,
            comments: WatchedList::default(),
            total_num_comments: 0,
            created_at: Utc::now(),
        };
        let mut post = Self {
            root: AggregateRoot::new(props, None, dispatcher),
        };

        let event = ForumEvent::post_created(post.id(), post.member_id(), post.title().as_str());
        post.root.add_domain_event(event);
        tracing::debug!(post_id = %post.id(), "post created");

        Outcome::ok(post)
    }

    /// Rebuilds a stored post. No events are raised.
    pub fn restore(
        id: UniqueEntityId,
        props: PostProps,
        dispatcher: &DomainEvents<ForumEvent>,
    ) -> Self {
        Self {
            root: AggregateRoot::new(props, Some(id), dispatcher),
        }
    }

    pub fn id(&self) -> &UniqueEntityId {
        self.root.id()
    }

    pub fn props(&self) -> &PostProps {
        self.root.props()
    }

    pub fn member_id(&self) -> &UniqueEntityId {
        &self.props().member_id
    }

    pub fn title(&self) -> &PostTitle {
        &self.props().title
    }

    pub fn text(&self) -> &PostText {
        &self.props().text
    }

    pub fn comments(&self) -> &CommentList {
        &self.props().comments
    }

    pub fn total_num_comments(&self) -> usize {
        self.props().total_num_comments
    }

    pub fn aggregate(&self) -> &AggregateRoot<PostProps, ForumEvent> {
        &self.root
    }

    pub fn find_comment(&self, comment_id: &UniqueEntityId) -> Option<&Comment> {
        self.comments().iter().find(|c| c.id() == comment_id)
    }

    /// Returns the comments arranged into reply threads.
    pub fn thread(&self) -> Vec<TreeNode<Comment>> {
        comment::thread(self.comments().items())
    }

    pub fn update_title(&mut self, title: &str) -> Outcome<()> {
        let title = match validated(PostTitle::create(title)) {
            Ok(title) => title,
            Err(reason) => return Outcome::fail(reason),
        };
        if title == self.props().title {
            return Outcome::ok_empty();
        }

        self.root.props_mut().title = title;
        let event = ForumEvent::post_edited(self.id(), EditedField::Title);
        self.root.add_domain_event(event);
        Outcome::ok_empty()
    }

    pub fn update_text(&mut self, text: &str) -> Outcome<()> {
        let text = match validated(PostText::create(text)) {
            Ok(text) => text,
            Err(reason) => return Outcome::fail(reason),
        };
        if text == self.props().text {
            return Outcome::ok_empty();
        }

        self.root.props_mut().text = text;
        let event = ForumEvent::post_edited(self.id(), EditedField::Text);
        self.root.add_domain_event(event);
        Outcome::ok_empty()
    }

    /// Adds a comment or reply, raising `CommentPosted`.
    pub fn add_comment(&mut self, comment: Comment) -> Outcome<()> {
        if comment.post_id() != self.id() {
            return Outcome::fail("Comment belongs to a different post.");
        }
        if self.comments().exists(&comment) {
            return Outcome::fail("Comment was already added to this post.");
        }

        let parent_author_id = match comment.parent_comment_id() {
            Some(parent_id) => match self.find_comment(parent_id) {
                Some(parent) => Some(parent.member_id().clone()),
                None => return Outcome::fail("Parent comment not found."),
            },
            None => None,
        };

        let event = ForumEvent::CommentPosted(CommentPostedData {
            post_id: self.id().clone(),
            comment_id: comment.id().clone(),
            member_id: comment.member_id().clone(),
            post_author_id: self.member_id().clone(),
            parent_comment_id: comment.parent_comment_id().cloned(),
            parent_author_id,
            occurred_at: Utc::now(),
        });

        let props = self.root.props_mut();
        props.comments.add(comment);
        props.total_num_comments += 1;
        self.root.add_domain_event(event);
        Outcome::ok_empty()
    }

    /// Removes a comment, raising `CommentRemoved`.
    pub fn remove_comment(&mut self, comment_id: &UniqueEntityId) -> Outcome<()> {
        let Some(comment) = self.find_comment(comment_id).cloned() else {
            return Outcome::fail("Comment not found.");
        };

        let props = self.root.props_mut();
        props.comments.remove(&comment);
        props.total_num_comments = props.total_num_comments.saturating_sub(1);
        let event = ForumEvent::comment_removed(self.id(), comment_id);
        self.root.add_domain_event(event);
        Outcome::ok_empty()
    }

    /// Accepts the current comments as stored.
    pub fn mark_comments_persisted(&mut self) {
        self.root.props_mut().comments.mark_persisted();
    }
}
