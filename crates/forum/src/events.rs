//! Forum domain events.

use chrono::{DateTime, Utc};
use common::UniqueEntityId;
use domain::DomainEvent;
use serde::{Deserialize, Serialize};

/// Events raised by the post aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ForumEvent {
    /// A new post was published.
    PostCreated(PostCreatedData),

    /// The title or text of a post changed.
    PostEdited(PostEditedData),

    /// A comment or reply was posted.
    CommentPosted(CommentPostedData),

    /// A comment was removed from its post.
    CommentRemoved(CommentRemovedData),
}

impl ForumEvent {
    pub const POST_CREATED: &'static str = "PostCreated";
    pub const POST_EDITED: &'static str = "PostEdited";
    pub const COMMENT_POSTED: &'static str = "CommentPosted";
    pub const COMMENT_REMOVED: &'static str = "CommentRemoved";

    pub fn post_created(post_id: &UniqueEntityId, member_id: &UniqueEntityId, title: &str) -> Self {
        ForumEvent::PostCreated(PostCreatedData {
            post_id: post_id.clone(),
            member_id: member_id.clone(),
            title: title.to_string(),
            occurred_at: Utc::now(),
        })
    }

    pub fn post_edited(post_id: &UniqueEntityId, field: EditedField) -> Self {
        ForumEvent::PostEdited(PostEditedData {
            post_id: post_id.clone(),
            field,
            occurred_at: Utc::now(),
        })
    }

    pub fn comment_removed(post_id: &UniqueEntityId, comment_id: &UniqueEntityId) -> Self {
        ForumEvent::CommentRemoved(CommentRemovedData {
            post_id: post_id.clone(),
            comment_id: comment_id.clone(),
            occurred_at: Utc::now(),
        })
    }
}

impl DomainEvent for ForumEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ForumEvent::PostCreated(_) => Self::POST_CREATED,
            ForumEvent::PostEdited(_) => Self::POST_EDITED,
            ForumEvent::CommentPosted(_) => Self::COMMENT_POSTED,
            ForumEvent::CommentRemoved(_) => Self::COMMENT_REMOVED,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ForumEvent::PostCreated(data) => data.occurred_at,
            ForumEvent::PostEdited(data) => data.occurred_at,
            ForumEvent::CommentPosted(data) => data.occurred_at,
            ForumEvent::CommentRemoved(data) => data.occurred_at,
        }
    }

    fn aggregate_id(&self) -> &UniqueEntityId {
        match self {
            ForumEvent::PostCreated(data) => &data.post_id,
            ForumEvent::PostEdited(data) => &data.post_id,
            ForumEvent::CommentPosted(data) => &data.post_id,
            ForumEvent::CommentRemoved(data) => &data.post_id,
        }
    }
}

/// Data for PostCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCreatedData {
    pub post_id: UniqueEntityId,
    /// The member who wrote the post.
    pub member_id: UniqueEntityId,
    pub title: String,
    pub occurred_at: DateTime<Utc>,
}

/// Which part of a post was edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditedField {
    Title,
    Text,
}

/// Data for PostEdited event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostEditedData {
    pub post_id: UniqueEntityId,
    pub field: EditedField,
    pub occurred_at: DateTime<Utc>,
}

/// Data for CommentPosted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentPostedData {
    pub post_id: UniqueEntityId,
    pub comment_id: UniqueEntityId,
    /// The member who wrote the comment.
    pub member_id: UniqueEntityId,
    /// The member who wrote the post.
    pub post_author_id: UniqueEntityId,
    /// The comment this one replies to, if any.
    pub parent_comment_id: Option<UniqueEntityId>,
    /// The member who wrote the parent comment, if any.
    pub parent_author_id: Option<UniqueEntityId>,
    pub occurred_at: DateTime<Utc>,
}

/// Data for CommentRemoved event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRemovedData {
    pub post_id: UniqueEntityId,
    pub comment_id: UniqueEntityId,
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_match_variants() {
        let post_id = UniqueEntityId::new();
        let member_id = UniqueEntityId::new();
        let created = ForumEvent::post_created(&post_id, &member_id, "Hello");
        let removed = ForumEvent::comment_removed(&post_id, &UniqueEntityId::new());

        assert_eq!(created.event_type(), ForumEvent::POST_CREATED);
        assert_eq!(removed.event_type(), ForumEvent::COMMENT_REMOVED);
        assert_eq!(created.aggregate_id(), &post_id);
    }

    #[test]
    fn serializes_with_type_tag() {
        let post_id = UniqueEntityId::from_value("post-1");
        let event = ForumEvent::post_edited(&post_id, EditedField::Title);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "PostEdited");
        assert_eq!(json["data"]["post_id"], "post-1");
        assert_eq!(json["data"]["field"], "title");

        let back: ForumEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
