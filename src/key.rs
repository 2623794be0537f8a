//! Defines the normalized key type and the conversions that produce it.
//!
//! A set is stored under its elements sorted by the trie's comparer. Inputs that
//! cannot promise uniqueness (vectors, slices, arrays) are checked for adjacent
//! elements that compare equal; set types skip that walk.
use std::collections::{BTreeSet, HashSet};
use std::hash::{BuildHasher, Hash};
use std::ops::Deref;

use tracing::debug;

use crate::comparer::ElementComparer;
use crate::{Error, Result, LOG_TARGET};

/// A sorted, duplicate-free sequence of elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key<E> {
    elements: Vec<E>,
}

impl<E> Key<E> {
    /// Sorts `elements` and rejects any two that compare equal.
    ///
    /// ```rust
    /// use set_trie::{Error, Key, OrdComparer};
    ///
    /// let key = Key::normalize(vec![3, 1, 2], &OrdComparer).unwrap();
    /// assert_eq!(key.as_slice(), &[1, 2, 3]);
    ///
    /// assert_eq!(Key::normalize(vec![1, 1], &OrdComparer), Err(Error::AmbiguousOrdering));
    /// ```
    pub fn normalize<I, C>(elements: I, comparer: &C) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        C: ElementComparer<E> + ?Sized,
    {
        let key = Self::normalize_unique(elements, comparer);
        let ambiguous = key
            .elements
            .windows(2)
            .any(|pair| comparer.compare(&pair[0], &pair[1]).is_eq());
        if ambiguous {
            debug!(target: LOG_TARGET, len = key.len(), "Rejecting key with indistinguishable elements");
            return Err(Error::AmbiguousOrdering);
        }
        Ok(key)
    }

    /// Sorts `elements` without checking for duplicates.
    ///
    /// Only sound when the caller already guarantees the elements are distinct
    /// under `comparer`; otherwise the trie ends up storing a different set.
    pub fn normalize_unique<I, C>(elements: I, comparer: &C) -> Self
    where
        I: IntoIterator<Item = E>,
        C: ElementComparer<E> + ?Sized,
    {
        let mut elements: Vec<E> = elements.into_iter().collect();
        elements.sort_by(|a, b| comparer.compare(a, b));
        Key { elements }
    }

    /// The empty key, which stores the empty set at the root.
    pub fn empty() -> Self {
        Key { elements: Vec::new() }
    }

    /// Returns the sorted elements
    pub fn as_slice(&self) -> &[E] {
        &self.elements
    }

    /// Consumes the key, returning the sorted elements
    pub fn into_vec(self) -> Vec<E> {
        self.elements
    }
}

impl<E> Deref for Key<E> {
    type Target = [E];

    fn deref(&self) -> &[E] {
        &self.elements
    }
}

impl<E> From<Key<E>> for Vec<E> {
    fn from(key: Key<E>) -> Self {
        key.elements
    }
}

/// A trait for inputs that can be normalized into a [`Key`].
pub trait IntoKey<E> {
    /// Converts `self` into a key sorted by `comparer`.
    fn into_key<C: ElementComparer<E> + ?Sized>(self, comparer: &C) -> Result<Key<E>>;
}

impl<E> IntoKey<E> for Key<E> {
    /// Re-sorts under `comparer` and re-checks, since the key may have been built
    /// with a different order.
    fn into_key<C: ElementComparer<E> + ?Sized>(self, comparer: &C) -> Result<Key<E>> {
        Key::normalize(self.elements, comparer)
    }
}

impl<E> IntoKey<E> for Vec<E> {
    fn into_key<C: ElementComparer<E> + ?Sized>(self, comparer: &C) -> Result<Key<E>> {
        Key::normalize(self, comparer)
    }
}

impl<E: Clone> IntoKey<E> for &[E] {
    fn into_key<C: ElementComparer<E> + ?Sized>(self, comparer: &C) -> Result<Key<E>> {
        Key::normalize(self.iter().cloned(), comparer)
    }
}

impl<E: Clone> IntoKey<E> for &Vec<E> {
    fn into_key<C: ElementComparer<E> + ?Sized>(self, comparer: &C) -> Result<Key<E>> {
        self.as_slice().into_key(comparer)
    }
}

impl<E, const N: usize> IntoKey<E> for [E; N] {
    fn into_key<C: ElementComparer<E> + ?Sized>(self, comparer: &C) -> Result<Key<E>> {
        Key::normalize(IntoIterator::into_iter(self), comparer)
    }
}

impl<E: Ord> IntoKey<E> for BTreeSet<E> {
    fn into_key<C: ElementComparer<E> + ?Sized>(self, comparer: &C) -> Result<Key<E>> {
        Ok(Key::normalize_unique(self, comparer))
    }
}

impl<E: Ord + Clone> IntoKey<E> for &BTreeSet<E> {
    fn into_key<C: ElementComparer<E> + ?Sized>(self, comparer: &C) -> Result<Key<E>> {
        Ok(Key::normalize_unique(self.iter().cloned(), comparer))
    }
}

impl<E: Hash + Eq, S: BuildHasher> IntoKey<E> for HashSet<E, S> {
    fn into_key<C: ElementComparer<E> + ?Sized>(self, comparer: &C) -> Result<Key<E>> {
        Ok(Key::normalize_unique(self, comparer))
    }
}

impl<E: Hash + Eq + Clone, S: BuildHasher> IntoKey<E> for &HashSet<E, S> {
    fn into_key<C: ElementComparer<E> + ?Sized>(self, comparer: &C) -> Result<Key<E>> {
        Ok(Key::normalize_unique(self.iter().cloned(), comparer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::{OrdComparer, ReverseComparer};

    #[test]
    fn test_normalize_sorts() {
        let key = Key::normalize(vec![5, 3, 9, 1], &OrdComparer).unwrap();
        assert_eq!(key.as_slice(), &[1, 3, 5, 9]);

        let key = Key::normalize(vec![5, 3, 9, 1], &ReverseComparer).unwrap();
        assert_eq!(key.as_slice(), &[9, 5, 3, 1]);
    }

    #[test]
    fn test_normalize_rejects_duplicates() {
        assert_eq!(
            Key::normalize(vec![2, 7, 2], &OrdComparer),
            Err(Error::AmbiguousOrdering)
        );
    }

    #[test]
    fn test_normalize_rejects_broken_comparer() {
        // Distinct elements, but the comparer only looks at the last digit
        let comparer = crate::FnComparer::new(|a: &u32, b: &u32| (a % 10).cmp(&(b % 10)));
        assert_eq!(
            Key::normalize(vec![11, 21], &comparer),
            Err(Error::AmbiguousOrdering)
        );
        // The unchecked path keeps both
        assert_eq!(Key::normalize_unique(vec![11, 21], &comparer).len(), 2);
    }

    #[test]
    fn test_empty_key() {
        let key: Key<u8> = Key::normalize(Vec::new(), &OrdComparer).unwrap();
        assert!(key.is_empty());
        assert_eq!(key, Key::empty());
    }

    #[test]
    fn test_set_conversions() {
        let btree: BTreeSet<u32> = [4, 2, 8].iter().copied().collect();
        let key = (&btree).into_key(&ReverseComparer).unwrap();
        assert_eq!(key.as_slice(), &[8, 4, 2]);

        let hash: HashSet<u32> = [4, 2, 8].iter().copied().collect();
        let key = hash.into_key(&OrdComparer).unwrap();
        assert_eq!(key.into_vec(), vec![2, 4, 8]);
    }

    #[test]
    fn test_sequence_conversions() {
        let slice: &[u32] = &[3, 1];
        assert_eq!(slice.into_key(&OrdComparer).unwrap().as_slice(), &[1, 3]);
        assert_eq!([3, 1, 2].into_key(&OrdComparer).unwrap().as_slice(), &[1, 2, 3]);
        assert_eq!([1, 1].into_key(&OrdComparer), Err(Error::AmbiguousOrdering));
    }
}
