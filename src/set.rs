//! Set-tries that store each set as its own value.
//!
//! Stored sets are handed back as their normalized element vectors, sorted by the
//! trie's comparer.

use std::hash::Hash;

use futures::stream::Stream;

use crate::async_node::SharedNode;
use crate::async_trie::AsyncSetTrieMap;
use crate::comparer::{ElementComparer, OrdComparer};
use crate::key::IntoKey;
use crate::node::MemoryNode;
use crate::trie::{SetTrieMap, Subsets, Supersets, Values};
use crate::Result;

type SetNode<E> = MemoryNode<E, Vec<E>>;

/// A collection of sets supporting subset and superset queries.
///
/// # Examples
///
/// ```
/// use set_trie::SetTrie;
///
/// let mut sets = SetTrie::<char>::new();
/// sets.insert(vec!['b', 'a']).unwrap();
/// sets.insert(vec!['c']).unwrap();
///
/// let found: Vec<_> = sets.subsets(vec!['a', 'b', 'd']).unwrap().collect();
/// assert_eq!(found, vec![&vec!['a', 'b']]);
/// ```
#[derive(Debug, Clone)]
pub struct SetTrie<E, C = OrdComparer> {
    map: SetTrieMap<E, Vec<E>, SetNode<E>, C>,
}

impl<E: Hash + Eq + Ord + Clone> SetTrie<E> {
    /// Creates a new, empty collection ordering elements by `Ord`
    pub fn new() -> Self {
        Self::with_comparer(OrdComparer)
    }
}

impl<E: Hash + Eq + Ord + Clone> Default for SetTrie<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, C> SetTrie<E, C>
where
    E: Hash + Eq + Clone,
    C: ElementComparer<E>,
{
    /// Creates a new, empty collection ordering elements by `comparer`
    pub fn with_comparer(comparer: C) -> Self {
        SetTrie {
            map: SetTrieMap::with_comparer(comparer),
        }
    }

    /// Builds a collection from `sets`, failing on any duplicate or ambiguous set
    pub fn from_sets<I, K>(sets: I, comparer: C) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: IntoKey<E>,
    {
        let mut trie = Self::with_comparer(comparer);
        for set in sets {
            trie.insert(set)?;
        }
        Ok(trie)
    }

    /// Adds `set`, failing with [`Error::DuplicateKey`](crate::Error::DuplicateKey)
    /// if it is already present
    pub fn insert<K: IntoKey<E>>(&mut self, set: K) -> Result<()> {
        let key = set.into_key(self.map.comparer())?;
        let stored = key.as_slice().to_vec();
        self.map.insert_key(key, stored)
    }

    /// Removes `set`, returning whether it was present
    pub fn remove<K: IntoKey<E>>(&mut self, set: K) -> Result<bool> {
        self.map.remove(set)
    }

    /// Returns `true` if exactly `set` is stored
    pub fn contains<K: IntoKey<E>>(&self, set: K) -> Result<bool> {
        self.map.contains_key(set)
    }

    /// Lazily yields every stored subset of `set`
    pub fn subsets<K: IntoKey<E>>(&self, set: K) -> Result<Subsets<'_, E, Vec<E>, SetNode<E>>> {
        self.map.subsets(set)
    }

    /// Lazily yields every stored superset of `set`
    pub fn supersets<K: IntoKey<E>>(&self, set: K) -> Result<Supersets<'_, E, Vec<E>, SetNode<E>, C>> {
        self.map.supersets(set)
    }

    /// Lazily yields every stored set
    pub fn iter(&self) -> Values<'_, E, Vec<E>, SetNode<E>, C> {
        self.map.values()
    }

    /// Returns the number of stored sets
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no sets are stored
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the underlying map
    pub fn as_map(&self) -> &SetTrieMap<E, Vec<E>, SetNode<E>, C> {
        &self.map
    }
}

/// Asynchronous counterpart of [`SetTrie`] over in-memory shared nodes.
#[derive(Clone)]
pub struct AsyncSetTrie<E, C = OrdComparer> {
    map: AsyncSetTrieMap<E, Vec<E>, SharedNode<E, Vec<E>>, C>,
}

impl<E: Hash + Eq, C: std::fmt::Debug> std::fmt::Debug for AsyncSetTrie<E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSetTrie").field("map", &self.map).finish()
    }
}

impl<E: Hash + Eq + Ord> AsyncSetTrie<E> {
    /// Creates a new, empty collection ordering elements by `Ord`
    pub fn new() -> Self {
        AsyncSetTrie {
            map: AsyncSetTrieMap::new(),
        }
    }
}

impl<E: Hash + Eq + Ord> Default for AsyncSetTrie<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, C> AsyncSetTrie<E, C>
where
    E: Hash + Eq + Clone + Send + Sync + 'static,
    C: ElementComparer<E> + Send + Sync,
{
    /// Creates a new, empty collection ordering elements by `comparer`
    pub fn with_comparer(comparer: C) -> Self {
        AsyncSetTrie {
            map: AsyncSetTrieMap::with_comparer(comparer),
        }
    }

    /// Adds `set`, failing with [`Error::DuplicateKey`](crate::Error::DuplicateKey)
    /// if it is already present
    pub async fn insert<K: IntoKey<E>>(&self, set: K) -> Result<()> {
        let key = set.into_key(self.map.comparer())?;
        let stored = key.as_slice().to_vec();
        self.map.insert_key(key, stored).await
    }

    /// Removes `set`, returning whether it was present
    pub async fn remove<K: IntoKey<E>>(&self, set: K) -> Result<bool> {
        self.map.remove(set).await
    }

    /// Returns `true` if exactly `set` is stored
    pub async fn contains<K: IntoKey<E>>(&self, set: K) -> Result<bool> {
        self.map.contains_key(set).await
    }

    /// Lazily streams every stored subset of `set`
    pub fn subsets<K: IntoKey<E>>(&self, set: K) -> Result<impl Stream<Item = Result<Vec<E>>> + Send> {
        self.map.subsets(set)
    }

    /// Lazily streams every stored superset of `set`
    pub fn supersets<K: IntoKey<E>>(&self, set: K) -> Result<impl Stream<Item = Result<Vec<E>>> + Send> {
        self.map.supersets(set)
    }

    /// Lazily streams every stored set
    pub fn iter(&self) -> impl Stream<Item = Result<Vec<E>>> + Send {
        self.map.values()
    }

    /// Returns the underlying map
    pub fn as_map(&self) -> &AsyncSetTrieMap<E, Vec<E>, SharedNode<E, Vec<E>>, C> {
        &self.map
    }
}
