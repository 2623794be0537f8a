//! The main set-trie implementation.
//!
//! This module contains the `SetTrieMap` type, which provides the synchronous API
//! for storing sets with associated values and querying them by containment.

use std::hash::Hash;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::comparer::{ElementComparer, OrdComparer};
use crate::key::{IntoKey, Key};
use crate::node::{MemoryNode, TrieNode};
use crate::search::{self, SubsetFrame, Visit};
use crate::{Result, LOG_TARGET};

/// A set-trie mapping sets of `E` to values of type `V`.
///
/// Each set is stored under its elements sorted by the comparer `C`; nodes are
/// stored in `N`, an in-memory [`MemoryNode`] unless a different storage is
/// supplied through [`with_parts`](SetTrieMap::with_parts). The root and the
/// comparer are fixed for the lifetime of the trie, since the shape of the tree
/// depends on the order.
#[derive(Debug, Clone)]
pub struct SetTrieMap<E, V, N = MemoryNode<E, V>, C = OrdComparer> {
    /// The root node, standing for the empty set
    root: N,

    /// The order every key is sorted by
    comparer: C,

    /// The number of sets stored in the trie
    size: usize,

    _types: PhantomData<fn() -> (E, V)>,
}

impl<E: Hash + Eq + Ord, V> SetTrieMap<E, V> {
    /// Creates a new, empty trie ordering elements by `Ord`.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_trie::SetTrieMap;
    ///
    /// let trie = SetTrieMap::<u32, &str>::new();
    /// assert!(trie.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_comparer(OrdComparer)
    }
}

impl<E: Hash + Eq, V, C: ElementComparer<E>> SetTrieMap<E, V, MemoryNode<E, V>, C> {
    /// Creates a new, empty in-memory trie ordering elements by `comparer`.
    pub fn with_comparer(comparer: C) -> Self {
        Self::with_parts(MemoryNode::new(), comparer)
    }
}

impl<E, V, N, C> Default for SetTrieMap<E, V, N, C>
where
    N: TrieNode<E, V> + Default,
    C: ElementComparer<E> + Default,
{
    fn default() -> Self {
        Self::with_parts(N::default(), C::default())
    }
}

impl<E, V, N, C> SetTrieMap<E, V, N, C>
where
    N: TrieNode<E, V>,
    C: ElementComparer<E>,
{
    /// Creates a trie over an existing root node.
    ///
    /// The root may already hold content, for instance when it is backed by a
    /// persistent store; it must have been built with the same order as `comparer`.
    pub fn with_parts(root: N, comparer: C) -> Self {
        let size = Supersets::<E, V, N, C>::new(&root, &comparer, Key::empty()).count();
        SetTrieMap {
            root,
            comparer,
            size,
            _types: PhantomData,
        }
    }

    /// Builds a trie from `(set, value)` pairs.
    ///
    /// Fails if any set is ambiguous or appears twice; no partially built trie
    /// is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_trie::{Error, OrdComparer, SetTrieMap};
    ///
    /// let trie: SetTrieMap<u8, char> =
    ///     SetTrieMap::from_content(vec![(vec![1], 'a'), (vec![1, 2], 'b')], OrdComparer).unwrap();
    /// assert_eq!(trie.len(), 2);
    ///
    /// let duplicate: Result<SetTrieMap<u8, char>, _> =
    ///     SetTrieMap::from_content(vec![(vec![1], 'a'), (vec![1], 'b')], OrdComparer);
    /// assert_eq!(duplicate.unwrap_err(), Error::DuplicateKey);
    /// ```
    pub fn from_content<I, K>(content: I, comparer: C) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: IntoKey<E>,
        N: Default,
    {
        let mut trie = Self::with_parts(N::default(), comparer);
        trie.insert_all(content)?;
        Ok(trie)
    }

    /// Inserts every `(set, value)` pair, stopping at the first failure.
    ///
    /// Pairs inserted before the failure stay in the trie.
    pub fn insert_all<I, K>(&mut self, content: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: IntoKey<E>,
    {
        for (key, value) in content {
            self.insert(key, value)?;
        }
        Ok(())
    }

    /// Returns the number of sets stored in the trie.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the trie stores no sets.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the root node
    pub fn root(&self) -> &N {
        &self.root
    }

    /// Returns the comparer keys are sorted by
    pub fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Consumes the trie, returning its root node
    pub fn into_root(self) -> N {
        self.root
    }

    /// Stores `value` for `set`.
    ///
    /// Fails with [`Error::DuplicateKey`](crate::Error::DuplicateKey) if the set is
    /// already present, leaving the stored value untouched; use
    /// [`replace`](SetTrieMap::replace) to overwrite.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_trie::{Error, SetTrieMap};
    ///
    /// let mut trie = SetTrieMap::<u32, i32>::new();
    /// trie.insert(vec![2, 1], 42).unwrap();
    ///
    /// assert_eq!(trie.get(vec![1, 2]).unwrap(), Some(&42));
    /// assert_eq!(trie.insert(vec![1, 2], 7), Err(Error::DuplicateKey));
    /// ```
    pub fn insert<K: IntoKey<E>>(&mut self, set: K, value: V) -> Result<()> {
        let key = set.into_key(&self.comparer)?;
        self.insert_key(key, value)
    }

    pub(crate) fn insert_key(&mut self, key: Key<E>, value: V) -> Result<()> {
        let len = key.len();
        let node = self.descend_creating(key);
        if let Err(err) = node.set_value(value) {
            debug!(target: LOG_TARGET, len, "Rejecting duplicate set");
            return Err(err);
        }
        self.size += 1;
        trace!(target: LOG_TARGET, len, size = self.size, "Inserted set");
        Ok(())
    }

    /// Stores `value` for `set`, returning the value it replaces, if any.
    pub fn replace<K: IntoKey<E>>(&mut self, set: K, value: V) -> Result<Option<V>> {
        let key = set.into_key(&self.comparer)?;
        let len = key.len();
        let node = self.descend_creating(key);
        let previous = node.clear_value();
        let had_value = previous.is_some();
        if let Err(err) = node.set_value(value) {
            // Put the old value back so a failed replace leaves the set stored
            let restored = match previous {
                Some(old) => node.set_value(old).is_ok(),
                None => false,
            };
            if had_value && !restored {
                self.size -= 1;
            }
            debug!(target: LOG_TARGET, len, restored, %err, "Failed to replace set");
            return Err(err);
        }
        if !had_value {
            self.size += 1;
        }
        trace!(target: LOG_TARGET, len, replaced = previous.is_some(), "Replaced set");
        Ok(previous)
    }

    // Walks down the path for `key`, creating missing nodes on the way
    fn descend_creating(&mut self, key: Key<E>) -> &mut N {
        let mut node = &mut self.root;
        for element in key.into_vec() {
            node = node.get_or_add_child(element);
        }
        node
    }

    /// Removes `set`, returning whether it was present.
    ///
    /// Nodes left without value and children are pruned on the way back up;
    /// the root is never removed.
    pub fn remove<K: IntoKey<E>>(&mut self, set: K) -> Result<bool> {
        Ok(self.take(set)?.is_some())
    }

    /// Removes `set`, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_trie::SetTrieMap;
    ///
    /// let mut trie = SetTrieMap::<u32, i32>::new();
    /// trie.insert(vec![1, 2], 42).unwrap();
    ///
    /// assert_eq!(trie.take(vec![1, 2]).unwrap(), Some(42));
    /// assert_eq!(trie.take(vec![1, 2]).unwrap(), None);
    /// assert!(trie.is_empty());
    /// ```
    pub fn take<K: IntoKey<E>>(&mut self, set: K) -> Result<Option<V>> {
        let key = set.into_key(&self.comparer)?;
        let removed = Self::take_recursive(&mut self.root, &key);
        if removed.is_some() {
            self.size -= 1;
            trace!(target: LOG_TARGET, len = key.len(), size = self.size, "Removed set");
        }
        Ok(removed)
    }

    // Recursive helper for take that prunes emptied children while unwinding
    fn take_recursive(node: &mut N, key: &[E]) -> Option<V> {
        let (first, rest) = match key.split_first() {
            Some(split) => split,
            None => return node.clear_value(),
        };

        let child = node.child_mut(first)?;
        let removed = Self::take_recursive(child, rest)?;

        if child.is_empty() {
            node.remove_child(first);
            trace!(target: LOG_TARGET, depth = rest.len(), "Pruned empty node");
        }

        Some(removed)
    }

    /// Retrieves the value stored for exactly `set`, if any.
    pub fn get<K: IntoKey<E>>(&self, set: K) -> Result<Option<&V>> {
        let key = set.into_key(&self.comparer)?;

        let mut node = &self.root;
        for element in key.iter() {
            node = match node.child(element) {
                Some(child) => child,
                None => return Ok(None),
            };
        }

        if node.has_value() {
            node.value().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Returns `true` if exactly `set` is stored.
    pub fn contains_key<K: IntoKey<E>>(&self, set: K) -> Result<bool> {
        Ok(self.get(set)?.is_some())
    }

    /// Lazily yields the value of every stored set that is a subset of `set`.
    ///
    /// The order of the results is unspecified.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_trie::SetTrieMap;
    ///
    /// let mut trie = SetTrieMap::<u32, &str>::new();
    /// trie.insert(vec![], "empty").unwrap();
    /// trie.insert(vec![1], "one").unwrap();
    /// trie.insert(vec![1, 2], "one-two").unwrap();
    ///
    /// let mut found: Vec<_> = trie.subsets(vec![1]).unwrap().copied().collect();
    /// found.sort();
    /// assert_eq!(found, vec!["empty", "one"]);
    /// ```
    pub fn subsets<K: IntoKey<E>>(&self, set: K) -> Result<Subsets<'_, E, V, N>> {
        let key = set.into_key(&self.comparer)?;
        Ok(Subsets::new(&self.root, key))
    }

    /// Lazily yields the value of every stored set that is a superset of `set`.
    ///
    /// The order of the results is unspecified.
    ///
    /// # Examples
    ///
    /// ```
    /// use set_trie::SetTrieMap;
    ///
    /// let mut trie = SetTrieMap::<u32, &str>::new();
    /// trie.insert(vec![], "empty").unwrap();
    /// trie.insert(vec![1], "one").unwrap();
    /// trie.insert(vec![1, 2], "one-two").unwrap();
    ///
    /// let mut found: Vec<_> = trie.supersets(vec![1]).unwrap().copied().collect();
    /// found.sort();
    /// assert_eq!(found, vec!["one", "one-two"]);
    /// ```
    pub fn supersets<K: IntoKey<E>>(&self, set: K) -> Result<Supersets<'_, E, V, N, C>> {
        let key = set.into_key(&self.comparer)?;
        Ok(Supersets::new(&self.root, &self.comparer, key))
    }

    /// Lazily yields every stored value, in unspecified order.
    pub fn values(&self) -> Values<'_, E, V, N, C> {
        Values {
            inner: Supersets::new(&self.root, &self.comparer, Key::empty()),
        }
    }
}

// Value attached to `node`; a node claiming a value it cannot produce is logged and skipped
fn stored_value<E, V, N: TrieNode<E, V>>(node: &N) -> Option<&V> {
    if !node.has_value() {
        return None;
    }
    match node.value() {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(target: LOG_TARGET, %err, "Skipping node whose value cannot be read");
            None
        }
    }
}

/// Iterator over the values of stored subsets of a query set.
///
/// Created by [`SetTrieMap::subsets`].
pub struct Subsets<'a, E, V, N> {
    key: Key<E>,
    stack: Vec<SubsetFrame<&'a N>>,
    _value: PhantomData<&'a V>,
}

impl<'a, E, V, N> Subsets<'a, E, V, N> {
    pub(crate) fn new(root: &'a N, key: Key<E>) -> Self {
        Subsets {
            key,
            stack: vec![search::subset_start(root)],
            _value: PhantomData,
        }
    }
}

impl<'a, E: 'a, V: 'a, N> Iterator for Subsets<'a, E, V, N>
where
    N: TrieNode<E, V>,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(SubsetFrame { node, pos }) = self.stack.pop() {
            // Probe in reverse so the shallowest skips are explored first
            for i in search::subset_probes(pos, self.key.len()).rev() {
                if let Some(child) = node.child(&self.key[i]) {
                    self.stack.push(SubsetFrame { node: child, pos: i + 1 });
                }
            }

            if let Some(value) = stored_value(node) {
                return Some(value);
            }
        }

        None
    }
}

/// Iterator over the values of stored supersets of a query set.
///
/// Created by [`SetTrieMap::supersets`].
pub struct Supersets<'a, E, V, N, C> {
    key: Key<E>,
    comparer: &'a C,
    stack: Vec<Visit<&'a N>>,
    _value: PhantomData<&'a V>,
}

impl<'a, E, V, N, C> Supersets<'a, E, V, N, C> {
    pub(crate) fn new(root: &'a N, comparer: &'a C, key: Key<E>) -> Self {
        let start = search::superset_start(root, key.len());
        Supersets {
            key,
            comparer,
            stack: vec![start],
            _value: PhantomData,
        }
    }
}

impl<'a, E: 'a, V: 'a, N, C> Iterator for Supersets<'a, E, V, N, C>
where
    N: TrieNode<E, V>,
    C: ElementComparer<E>,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(visit) = self.stack.pop() {
            match visit {
                Visit::Drain(node) => {
                    self.stack.extend(node.children().map(|(_, child)| Visit::Drain(child)));

                    if let Some(value) = stored_value(node) {
                        return Some(value);
                    }
                }
                Visit::Match { node, pos } => {
                    let len = self.key.len();
                    for (element, child) in node.children() {
                        if let Some(next) = search::superset_step(&self.key, pos, element, self.comparer) {
                            self.stack.push(search::superset_frame(child, next, len));
                        }
                    }
                }
            }
        }

        None
    }
}

/// Iterator over every stored value.
///
/// Created by [`SetTrieMap::values`].
pub struct Values<'a, E, V, N, C> {
    inner: Supersets<'a, E, V, N, C>,
}

impl<'a, E: 'a, V: 'a, N, C> Iterator for Values<'a, E, V, N, C>
where
    N: TrieNode<E, V>,
    C: ElementComparer<E>,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}
