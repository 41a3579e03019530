//! Entity: identity + continuity across state changes.

use common::UniqueEntityId;
use serde::{Deserialize, Serialize};

/// A domain object defined by its identity rather than its attributes.
///
/// Two entities with the same ID are the same entity, whatever their props.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity<P> {
    id: UniqueEntityId,
    props: P,
}

impl<P> Entity<P> {
    /// Creates an entity, generating a fresh ID when none is given.
    pub fn new(props: P, id: Option<UniqueEntityId>) -> Self {
        Self {
            id: id.unwrap_or_default(),
            props,
        }
    }

    pub fn id(&self) -> &UniqueEntityId {
        &self.id
    }

    pub fn props(&self) -> &P {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut P {
        &mut self.props
    }

    pub fn into_props(self) -> P {
        self.props
    }

    /// Returns true if `other` is this entity or shares its identity.
    pub fn equals(&self, other: Option<&Self>) -> bool {
        match other {
            None => false,
            Some(other) if std::ptr::eq(self, other) => true,
            Some(other) => self.id == other.id,
        }
    }
}

impl<P> PartialEq for Entity<P> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(Some(other))
    }
}

impl<P> Eq for Entity<P> {}

impl<P> std::hash::Hash for Entity<P> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct MemberProps {
        username: String,
    }

    fn member(username: &str, id: Option<UniqueEntityId>) -> Entity<MemberProps> {
        Entity::new(
            MemberProps {
                username: username.to_string(),
            },
            id,
        )
    }

    #[test]
    fn new_generates_id_when_absent() {
        let a = member("ana", None);
        let b = member("ana", None);
        assert_ne!(a, b);
    }

    #[test]
    fn equality_ignores_props() {
        let id = UniqueEntityId::from_value("member-1");
        let a = member("ana", Some(id.clone()));
        let b = member("renamed", Some(id));
        assert_eq!(a, b);
        assert_eq!(b.props().username, "renamed");
    }

    #[test]
    fn equals_handles_missing_and_same_reference() {
        let a = member("ana", None);
        assert!(!a.equals(None));
        assert!(a.equals(Some(&a)));
    }

    #[test]
    fn props_can_change_without_changing_identity() {
        let mut a = member("ana", None);
        let id = a.id().clone();
        a.props_mut().username = "bea".to_string();
        assert_eq!(a.id(), &id);
        assert_eq!(a.into_props().username, "bea");
    }
}
