//! Aggregation of several independent change outcomes.

use crate::outcome::Outcome;

/// Collects the outcomes of a sequence of changes applied to one object.
///
/// The overall result is the first recorded failure, or success when every
/// change succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changes<E = String> {
    changes: Vec<Outcome<(), E>>,
}

impl<E> Default for Changes<E> {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
        }
    }
}

impl<E: Clone> Changes<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one change, discarding any success value.
    pub fn add_change<T>(&mut self, result: Outcome<T, E>) {
        self.changes.push(result.map(|_| ()));
    }

    /// Returns the number of recorded changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the combined result of all recorded changes.
    pub fn change_result(&self) -> Outcome<(), E> {
        Outcome::combine(&self.changes)
    }
}

/// Implemented by objects that track the outcome of updates applied to them.
pub trait WithChanges<E = String> {
    fn changes(&self) -> &Changes<E>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_changes_succeed() {
        let changes: Changes = Changes::new();
        assert!(changes.is_empty());
        assert!(changes.change_result().is_success());
    }

    #[test]
    fn reports_first_failed_change() {
        let mut changes: Changes = Changes::new();
        changes.add_change(Outcome::<u32>::ok(1));
        changes.add_change(Outcome::<&str>::fail("title too short"));
        changes.add_change(Outcome::<()>::fail("text too long"));

        assert_eq!(changes.len(), 3);
        assert_eq!(
            changes.change_result(),
            Outcome::Failure("title too short".to_string())
        );
    }
}
