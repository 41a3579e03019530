//! Comments on posts.

use chrono::{DateTime, Utc};
use common::{Outcome, UniqueEntityId};
use domain::{Entity, Hierarchical, TreeNode, WatchedList, build_forest};
use serde::{Deserialize, Serialize};

use crate::text::CommentText;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentProps {
    pub post_id: UniqueEntityId,
    pub member_id: UniqueEntityId,
    pub text: CommentText,
    /// Set when the comment is a reply to another comment.
    pub parent_comment_id: Option<UniqueEntityId>,
    pub created_at: DateTime<Utc>,
}

/// A comment on a post. Comments compare by identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment(Entity<CommentProps>);

/// The comments of one post, tracked for persistence.
pub type CommentList = WatchedList<Comment>;

impl Comment {
    /// Creates a top-level comment or, with `parent_comment_id`, a reply.
    pub fn create(
        post_id: &UniqueEntityId,
        member_id: &UniqueEntityId,
        text: &str,
        parent_comment_id: Option<UniqueEntityId>,
    ) -> Outcome<Self> {
        CommentText::create(text).map(|text| {
            Self::restore(
                CommentProps {
                    post_id: post_id.clone(),
                    member_id: member_id.clone(),
                    text,
                    parent_comment_id,
                    created_at: Utc::now(),
                },
                None,
            )
        })
    }

    /// Rebuilds a comment from stored props.
    pub fn restore(props: CommentProps, id: Option<UniqueEntityId>) -> Self {
        Self(Entity::new(props, id))
    }

    pub fn id(&self) -> &UniqueEntityId {
        self.0.id()
    }

    pub fn props(&self) -> &CommentProps {
        self.0.props()
    }

    pub fn post_id(&self) -> &UniqueEntityId {
        &self.props().post_id
    }

    pub fn member_id(&self) -> &UniqueEntityId {
        &self.props().member_id
    }

    pub fn text(&self) -> &str {
        self.props().text.as_str()
    }

    pub fn parent_comment_id(&self) -> Option<&UniqueEntityId> {
        self.props().parent_comment_id.as_ref()
    }

    pub fn is_reply(&self) -> bool {
        self.props().parent_comment_id.is_some()
    }
}

impl Hierarchical for Comment {
    type Key = UniqueEntityId;

    fn key(&self) -> &UniqueEntityId {
        self.id()
    }

    fn parent_key(&self) -> Option<&UniqueEntityId> {
        self.parent_comment_id()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.props().created_at
    }
}

/// Threads comments into reply trees, newest replies first.
pub fn thread(comments: &[Comment]) -> Vec<TreeNode<Comment>> {
    build_forest(comments.to_vec())
}
