//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

/// A domain object with no identity, defined entirely by its props.
///
/// Equality compares the props field by field through their `PartialEq`
/// implementation, so the declaration order of fields never matters.
/// To "modify" a value object, build a new one.
///
/// ```
/// use domain::ValueObject;
///
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct SlugProps {
///     value: String,
/// }
///
/// let a = ValueObject::new(SlugProps { value: "hello-world".into() });
/// let b = ValueObject::new(SlugProps { value: "hello-world".into() });
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueObject<P> {
    props: P,
}

impl<P> ValueObject<P> {
    pub fn new(props: P) -> Self {
        Self { props }
    }

    pub fn props(&self) -> &P {
        &self.props
    }

    pub fn into_props(self) -> P {
        self.props
    }

    /// Returns true if `other` is present and structurally equal.
    pub fn equals(&self, other: Option<&Self>) -> bool
    where
        P: PartialEq,
    {
        other.is_some_and(|other| self.props == other.props)
    }
}

impl<P> From<P> for ValueObject<P> {
    fn from(props: P) -> Self {
        Self::new(props)
    }
}
