use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A wrapped raw identifier value.
///
/// Two identifiers are equal when they wrap equal values of the same type.
/// The wrapped value cannot be changed after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier<T>(T);

impl<T> Identifier<T> {
    /// Wraps a raw value.
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Returns the raw wrapped value.
    pub fn value(&self) -> &T {
        &self.0
    }

    /// Consumes the identifier, returning the raw value.
    pub fn into_value(self) -> T {
        self.0
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Identifier<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique identifier of an entity.
///
/// Generated as a random UUID string unless an explicit value is supplied
/// (for example when an entity is rehydrated from storage).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueEntityId(Identifier<String>);

impl UniqueEntityId {
    /// Creates a new random entity ID.
    pub fn new() -> Self {
        Self(Identifier::new(Uuid::new_v4().to_string()))
    }

    /// Creates an entity ID wrapping an existing value.
    ///
    /// An empty value is treated as absent and a fresh random ID is generated.
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            return Self::new();
        }
        Self(Identifier::new(value))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.value()
    }

    /// Returns the underlying identifier.
    pub fn identifier(&self) -> &Identifier<String> {
        &self.0
    }
}

impl Default for UniqueEntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UniqueEntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UniqueEntityId {
    fn from(value: String) -> Self {
        Self::from_value(value)
    }
}

impl From<&str> for UniqueEntityId {
    fn from(value: &str) -> Self {
        Self::from_value(value)
    }
}

impl From<Uuid> for UniqueEntityId {
    fn from(uuid: Uuid) -> Self {
        Self(Identifier::new(uuid.to_string()))
    }
}

impl AsRef<str> for UniqueEntityId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
