//! Validated text value objects.

use common::{Guard, Outcome};
use domain::ValueObject;
use serde::{Deserialize, Serialize};

fn bounded(text: String, min: usize, max: usize, field: &str) -> Outcome<String> {
    let checks = [
        Guard::against_at_least(min, text.trim()),
        Guard::against_at_most(max, &text),
    ];
    match Guard::combine(&checks) {
        Outcome::Failure(reason) => Outcome::fail(format!("Invalid {field}. {reason}")),
        Outcome::Success(_) => Outcome::ok(text),
    }
}

/// Title of a post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostTitle(ValueObject<String>);

impl PostTitle {
    pub const MIN_LENGTH: usize = 2;
    pub const MAX_LENGTH: usize = 85;

    pub fn create(title: impl Into<String>) -> Outcome<Self> {
        bounded(title.into(), Self::MIN_LENGTH, Self::MAX_LENGTH, "title")
            .map(|title| Self(ValueObject::new(title)))
    }

    pub fn as_str(&self) -> &str {
        self.0.props()
    }
}

/// Body of a text post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostText(ValueObject<String>);

impl PostText {
    pub const MIN_LENGTH: usize = 20;
    pub const MAX_LENGTH: usize = 10_000;

    pub fn create(text: impl Into<String>) -> Outcome<Self> {
        bounded(text.into(), Self::MIN_LENGTH, Self::MAX_LENGTH, "text")
            .map(|text| Self(ValueObject::new(text)))
    }

    pub fn as_str(&self) -> &str {
        self.0.props()
    }
}

/// Body of a comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentText(ValueObject<String>);

impl CommentText {
    pub const MIN_LENGTH: usize = 1;
    pub const MAX_LENGTH: usize = 10_000;

    pub fn create(text: impl Into<String>) -> Outcome<Self> {
        bounded(text.into(), Self::MIN_LENGTH, Self::MAX_LENGTH, "comment")
            .map(|text| Self(ValueObject::new(text)))
    }

    pub fn as_str(&self) -> &str {
        self.0.props()
    }
}

impl std::fmt::Display for PostTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_within_bounds() {
        let title = PostTitle::create("Ownership explained");
        assert!(title.is_success());
        assert_eq!(title.value().unwrap().as_str(), "Ownership explained");
    }

    #[test]
    fn title_too_short_or_long() {
        let short = PostTitle::create(" a ");
        assert_eq!(
            short.error().map(String::as_str),
            Some("Invalid title. Text is not at least 2 chars.")
        );

        let long = PostTitle::create("x".repeat(PostTitle::MAX_LENGTH + 1));
        assert_eq!(
            long.error().map(String::as_str),
            Some("Invalid title. Text is greater than 85 chars.")
        );
    }

    #[test]
    fn text_needs_twenty_chars() {
        assert!(PostText::create("too short").is_failure());
        assert!(PostText::create("long enough to be a real post").is_success());
    }

    #[test]
    fn blank_comment_rejected() {
        assert!(CommentText::create("   ").is_failure());
        assert!(CommentText::create("+1").is_success());
    }

    #[test]
    fn equal_texts_are_equal_values() {
        let a = CommentText::create("same").into_value().unwrap();
        let b = CommentText::create("same").into_value().unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_value(&a).unwrap(), "same");
    }
}
