//! Forum posts and comments built on the domain kernel.
//!
//! Models one aggregate, a post with its tracked comments, together with
//! its events, the handlers that react to them, and the use cases that
//! drive them through an in-memory repository.

pub mod comment;
pub mod error;
pub mod events;
pub mod handlers;
pub mod post;
pub mod repository;
pub mod text;
pub mod use_cases;

pub use comment::{Comment, CommentList, CommentProps, thread};
pub use error::ForumError;
pub use events::{EditedField, ForumEvent};
pub use handlers::{Notification, Outbox, PostStats, ReplyNotifier, register_handlers};
pub use post::{Post, PostDraft, PostProps};
pub use repository::InMemoryPostRepository;
pub use text::{CommentText, PostText, PostTitle};
pub use use_cases::{EditPost, EditPostRequest, ReplyRequest, reply_to_comment};
