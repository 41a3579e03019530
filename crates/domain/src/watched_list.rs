//! Change tracking for an aggregate's child collection.
//!
//! A [`WatchedList`] starts from the baseline loaded from storage and records,
//! as items are added and removed, exactly which items must be inserted and
//! which must be deleted to bring storage in line with the in-memory view.
//! Those instructions depend on the order of calls (re-adding a removed
//! baseline item cancels its deletion), so they cannot be recovered by
//! diffing the current view against the baseline.

/// Decides whether two items denote the same element.
///
/// Any `Fn(&T, &T) -> bool` closure qualifies; [`ByEq`] and [`ByKey`] cover the
/// common cases.
pub trait ItemEquivalence<T> {
    fn equivalent(&self, a: &T, b: &T) -> bool;
}

impl<T, F> ItemEquivalence<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn equivalent(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// Compares items with `PartialEq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByEq;

impl<T: PartialEq> ItemEquivalence<T> for ByEq {
    fn equivalent(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Compares items by a business key.
#[derive(Debug, Clone, Copy)]
pub struct ByKey<F>(pub F);

impl<T, K, F> ItemEquivalence<T> for ByKey<F>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    fn equivalent(&self, a: &T, b: &T) -> bool {
        (self.0)(a) == (self.0)(b)
    }
}

/// A collection that remembers how it changed since its baseline.
#[derive(Debug, Clone)]
pub struct WatchedList<T, C = ByEq> {
    initial: Vec<T>,
    current: Vec<T>,
    new: Vec<T>,
    removed: Vec<T>,
    compare: C,
}

impl<T: Clone + PartialEq> WatchedList<T, ByEq> {
    /// Starts tracking `initial`, comparing items with `PartialEq`.
    pub fn by_eq(initial: Vec<T>) -> Self {
        Self::new(initial, ByEq)
    }
}

impl<T: Clone + PartialEq> Default for WatchedList<T, ByEq> {
    fn default() -> Self {
        Self::by_eq(Vec::new())
    }
}

impl<T, K, F> WatchedList<T, ByKey<F>>
where
    T: Clone,
    K: PartialEq,
    F: Fn(&T) -> K,
{
    /// Starts tracking `initial`, comparing items by the key `key` extracts.
    pub fn by_key(initial: Vec<T>, key: F) -> Self {
        Self::new(initial, ByKey(key))
    }
}

impl<T, C> WatchedList<T, C>
where
    T: Clone,
    C: ItemEquivalence<T>,
{
    /// Starts tracking `initial` with a caller-supplied equivalence.
    pub fn new(initial: Vec<T>, compare: C) -> Self {
        Self {
            current: initial.clone(),
            initial,
            new: Vec::new(),
            removed: Vec::new(),
            compare,
        }
    }

    /// Returns the current view of the collection.
    pub fn items(&self) -> &[T] {
        &self.current
    }

    /// Returns the items added since the baseline that still need inserting.
    pub fn new_items(&self) -> &[T] {
        &self.new
    }

    /// Returns the baseline items removed since the baseline that need deleting.
    pub fn removed_items(&self) -> &[T] {
        &self.removed
    }

    /// Returns the baseline the list was created from.
    pub fn initial_items(&self) -> &[T] {
        &self.initial
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.current.iter()
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Returns true if there is anything to insert or delete.
    pub fn has_changes(&self) -> bool {
        !self.new.is_empty() || !self.removed.is_empty()
    }

    /// Returns true if `item` is in the current view.
    pub fn exists(&self, item: &T) -> bool {
        self.contains(&self.current, item)
    }

    /// Adds `item` to the collection.
    ///
    /// Re-adding a removed baseline item cancels its pending deletion; adding
    /// an item already present leaves the current view unchanged.
    pub fn add(&mut self, item: T) {
        if self.contains(&self.removed, &item) {
            Self::retain_others(&self.compare, &mut self.removed, &item);
        }

        if !self.contains(&self.new, &item) && !self.contains(&self.initial, &item) {
            self.new.push(item.clone());
        }

        if !self.contains(&self.current, &item) {
            self.current.push(item);
        }
    }

    /// Removes `item` from the collection.
    ///
    /// Removing an item that was added since the baseline simply forgets it;
    /// removing a baseline item records it for deletion once. The recorded
    /// item is the stored baseline element, not `item`, so a key-based
    /// equivalence still yields the record that storage holds.
    pub fn remove(&mut self, item: &T) {
        Self::retain_others(&self.compare, &mut self.current, item);

        if self.contains(&self.new, item) {
            Self::retain_others(&self.compare, &mut self.new, item);
            return;
        }

        if self.contains(&self.removed, item) {
            return;
        }
        if let Some(stored) = self
            .initial
            .iter()
            .find(|candidate| self.compare.equivalent(item, candidate))
            .cloned()
        {
            self.removed.push(stored);
        }
    }

    /// Accepts the current view as the new baseline once changes are persisted.
    pub fn mark_persisted(&mut self) {
        self.initial = self.current.clone();
        self.new.clear();
        self.removed.clear();
    }

    fn contains(&self, items: &[T], item: &T) -> bool {
        items.iter().any(|candidate| self.compare.equivalent(item, candidate))
    }

    fn retain_others(compare: &C, items: &mut Vec<T>, item: &T) {
        items.retain(|candidate| !compare.equivalent(item, candidate));
    }
}

impl<'a, T, C> IntoIterator for &'a WatchedList<T, C> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.current.iter()
    }
}
