//! The asynchronous set-trie engine.
//!
//! `AsyncSetTrieMap` runs the same traversal rules as
//! [`SetTrieMap`](crate::SetTrieMap) against [`AsyncTrieNode`] handles, awaiting
//! every node access. The engine does not coordinate concurrent operations: reads
//! running next to a mutation may observe it half applied.

use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::stream::{self, Stream};
use tracing::{debug, trace};

use crate::async_node::{AsyncTrieNode, SharedNode};
use crate::comparer::{ElementComparer, OrdComparer};
use crate::key::{IntoKey, Key};
use crate::search::{self, SubsetFrame, Visit};
use crate::{Result, LOG_TARGET};

/// A set-trie over asynchronous node storage.
///
/// # Examples
///
/// ```
/// use futures::{executor::block_on, TryStreamExt};
/// use set_trie::AsyncSetTrieMap;
///
/// block_on(async {
///     let trie = AsyncSetTrieMap::<u32, &str>::new();
///     trie.insert(vec![1], "one").await.unwrap();
///     trie.insert(vec![1, 2], "one-two").await.unwrap();
///
///     let mut found: Vec<_> = trie.supersets(vec![1]).unwrap().try_collect().await.unwrap();
///     found.sort();
///     assert_eq!(found, vec!["one", "one-two"]);
/// });
/// ```
pub struct AsyncSetTrieMap<E, V, N = SharedNode<E, V>, C = OrdComparer> {
    /// Handle to the root node, standing for the empty set
    root: N,

    /// The order every key is sorted by
    comparer: Arc<C>,

    _types: PhantomData<fn() -> (E, V)>,
}

impl<E: Hash + Eq + Ord, V> AsyncSetTrieMap<E, V> {
    /// Creates a new, empty in-memory trie ordering elements by `Ord`.
    pub fn new() -> Self {
        Self::with_comparer(OrdComparer)
    }
}

impl<E: Hash + Eq, V, C> AsyncSetTrieMap<E, V, SharedNode<E, V>, C> {
    /// Creates a new, empty in-memory trie ordering elements by `comparer`.
    pub fn with_comparer(comparer: C) -> Self {
        Self::with_parts(SharedNode::new(), comparer)
    }
}

impl<E, V, N, C> AsyncSetTrieMap<E, V, N, C> {
    /// Creates a trie over an existing root node handle.
    ///
    /// The root may already hold content; it must have been built with the same
    /// order as `comparer`.
    pub fn with_parts(root: N, comparer: C) -> Self {
        AsyncSetTrieMap {
            root,
            comparer: Arc::new(comparer),
            _types: PhantomData,
        }
    }

    /// Returns the root node handle
    pub fn root(&self) -> &N {
        &self.root
    }

    /// Returns the comparer keys are sorted by
    pub fn comparer(&self) -> &C {
        &self.comparer
    }
}

impl<E, V, N, C> Default for AsyncSetTrieMap<E, V, N, C>
where
    N: Default,
    C: Default,
{
    fn default() -> Self {
        Self::with_parts(N::default(), C::default())
    }
}

impl<E, V, N: Clone, C> Clone for AsyncSetTrieMap<E, V, N, C> {
    fn clone(&self) -> Self {
        AsyncSetTrieMap {
            root: self.root.clone(),
            comparer: Arc::clone(&self.comparer),
            _types: PhantomData,
        }
    }
}

impl<E, V, N: std::fmt::Debug, C: std::fmt::Debug> std::fmt::Debug for AsyncSetTrieMap<E, V, N, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSetTrieMap")
            .field("root", &self.root)
            .field("comparer", &self.comparer)
            .finish()
    }
}

impl<E, V, N, C> AsyncSetTrieMap<E, V, N, C>
where
    E: Send + Sync + 'static,
    V: Send + 'static,
    N: AsyncTrieNode<E, V>,
    C: ElementComparer<E> + Send + Sync,
{
    /// Builds a trie from `(set, value)` pairs.
    ///
    /// Fails if any set is ambiguous or appears twice; no partially built trie
    /// is returned.
    pub async fn from_content<I, K>(content: I, comparer: C) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: IntoKey<E>,
        N: Default,
    {
        let trie = Self::with_parts(N::default(), comparer);
        trie.insert_all(content).await?;
        Ok(trie)
    }

    /// Inserts every `(set, value)` pair, stopping at the first failure.
    pub async fn insert_all<I, K>(&self, content: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: IntoKey<E>,
    {
        for (key, value) in content {
            self.insert(key, value).await?;
        }
        Ok(())
    }

    /// Stores `value` for `set`.
    ///
    /// Fails with [`Error::DuplicateKey`](crate::Error::DuplicateKey) if the set is
    /// already present, leaving the stored value untouched.
    pub async fn insert<K: IntoKey<E>>(&self, set: K, value: V) -> Result<()> {
        let key = set.into_key(&*self.comparer)?;
        self.insert_key(key, value).await
    }

    pub(crate) async fn insert_key(&self, key: Key<E>, value: V) -> Result<()> {
        let len = key.len();
        let node = self.descend_creating(key).await?;
        if let Err(err) = node.set_value(value).await {
            debug!(target: LOG_TARGET, len, "Rejecting duplicate set");
            return Err(err);
        }
        trace!(target: LOG_TARGET, len, "Inserted set");
        Ok(())
    }

    /// Stores `value` for `set`, returning the value it replaces, if any.
    pub async fn replace<K: IntoKey<E>>(&self, set: K, value: V) -> Result<Option<V>> {
        let key = set.into_key(&*self.comparer)?;
        let len = key.len();
        let node = self.descend_creating(key).await?;
        let previous = node.clear_value().await?;
        if let Err(err) = node.set_value(value).await {
            // Put the old value back so a failed replace leaves the set stored
            let restored = match previous {
                Some(old) => node.set_value(old).await.is_ok(),
                None => false,
            };
            debug!(target: LOG_TARGET, len, restored, %err, "Failed to replace set");
            return Err(err);
        }
        trace!(target: LOG_TARGET, len, replaced = previous.is_some(), "Replaced set");
        Ok(previous)
    }

    async fn descend_creating(&self, key: Key<E>) -> Result<N> {
        let mut node = self.root.clone();
        for element in key.into_vec() {
            node = node.get_or_add_child(element).await?;
        }
        Ok(node)
    }

    /// Removes `set`, returning whether it was present.
    pub async fn remove<K: IntoKey<E>>(&self, set: K) -> Result<bool> {
        Ok(self.take(set).await?.is_some())
    }

    /// Removes `set`, returning its value if it was present.
    ///
    /// Nodes left without value and children are detached from their parents on
    /// the way back up; the root is never removed.
    pub async fn take<K: IntoKey<E>>(&self, set: K) -> Result<Option<V>> {
        let key = set.into_key(&*self.comparer)?;
        let len = key.len();

        // (parent, element leading to the next node on the path)
        let mut path = Vec::with_capacity(len);
        let mut node = self.root.clone();
        for element in key.into_vec() {
            let child = node.child(&element).await?;
            match child {
                Some(child) => {
                    path.push((node, element));
                    node = child;
                }
                None => return Ok(None),
            }
        }

        let removed = match node.clear_value().await? {
            Some(value) => value,
            None => return Ok(None),
        };

        let mut visited = node;
        while let Some((parent, element)) = path.pop() {
            if !visited.is_empty().await? {
                break;
            }
            parent.remove_child(&element).await?;
            trace!(target: LOG_TARGET, depth = path.len(), "Pruned empty node");
            visited = parent;
        }

        trace!(target: LOG_TARGET, len, "Removed set");
        Ok(Some(removed))
    }

    /// Retrieves the value stored for exactly `set`, if any.
    pub async fn get<K: IntoKey<E>>(&self, set: K) -> Result<Option<V>> {
        let key = set.into_key(&*self.comparer)?;

        let mut node = self.root.clone();
        for element in key.iter() {
            let child = node.child(element).await?;
            node = match child {
                Some(child) => child,
                None => return Ok(None),
            };
        }

        if node.has_value().await? {
            node.value().await.map(Some)
        } else {
            Ok(None)
        }
    }

    /// Returns `true` if exactly `set` is stored.
    pub async fn contains_key<K: IntoKey<E>>(&self, set: K) -> Result<bool> {
        Ok(self.get(set).await?.is_some())
    }

    /// Lazily streams the value of every stored set that is a subset of `set`.
    ///
    /// Normalization errors are returned immediately; storage errors are yielded
    /// by the stream when it reaches them, after which it ends.
    pub fn subsets<K: IntoKey<E>>(&self, set: K) -> Result<impl Stream<Item = Result<V>> + Send> {
        let key = set.into_key(&*self.comparer)?;
        let walk = SubsetWalk {
            stack: vec![search::subset_start(self.root.clone())],
            key,
        };
        Ok(stream::unfold(Some(walk), |walk| async move {
            let mut walk = walk?;
            match walk.next_value().await {
                Ok(Some(value)) => Some((Ok(value), Some(walk))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        }))
    }

    /// Lazily streams the value of every stored set that is a superset of `set`.
    ///
    /// Normalization errors are returned immediately; storage errors are yielded
    /// by the stream when it reaches them, after which it ends.
    pub fn supersets<K: IntoKey<E>>(&self, set: K) -> Result<impl Stream<Item = Result<V>> + Send> {
        let key = set.into_key(&*self.comparer)?;
        Ok(self.superset_stream(key))
    }

    /// Lazily streams every stored value.
    pub fn values(&self) -> impl Stream<Item = Result<V>> + Send {
        self.superset_stream(Key::empty())
    }

    fn superset_stream(&self, key: Key<E>) -> impl Stream<Item = Result<V>> + Send {
        let walk = SupersetWalk {
            stack: vec![search::superset_start(self.root.clone(), key.len())],
            key,
            comparer: Arc::clone(&self.comparer),
        };
        stream::unfold(Some(walk), |walk| async move {
            let mut walk = walk?;
            match walk.next_value().await {
                Ok(Some(value)) => Some((Ok(value), Some(walk))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
    }
}

/// Resume point of a subset stream.
struct SubsetWalk<E, N> {
    key: Key<E>,
    stack: Vec<SubsetFrame<N>>,
}

impl<E, N> SubsetWalk<E, N> {
    async fn next_value<V>(&mut self) -> Result<Option<V>>
    where
        E: Send + Sync + 'static,
        V: Send + 'static,
        N: AsyncTrieNode<E, V>,
    {
        while let Some(SubsetFrame { node, pos }) = self.stack.pop() {
            for i in search::subset_probes(pos, self.key.len()).rev() {
                if let Some(child) = node.child(&self.key[i]).await? {
                    self.stack.push(SubsetFrame { node: child, pos: i + 1 });
                }
            }

            if node.has_value().await? {
                return node.value().await.map(Some);
            }
        }

        Ok(None)
    }
}

/// Resume point of a superset stream.
struct SupersetWalk<E, N, C> {
    key: Key<E>,
    comparer: Arc<C>,
    stack: Vec<Visit<N>>,
}

impl<E, N, C> SupersetWalk<E, N, C> {
    async fn next_value<V>(&mut self) -> Result<Option<V>>
    where
        E: Send + Sync + 'static,
        V: Send + 'static,
        N: AsyncTrieNode<E, V>,
        C: ElementComparer<E>,
    {
        while let Some(visit) = self.stack.pop() {
            match visit {
                Visit::Drain(node) => {
                    for (_, child) in node.children().await? {
                        self.stack.push(Visit::Drain(child));
                    }

                    if node.has_value().await? {
                        return node.value().await.map(Some);
                    }
                }
                Visit::Match { node, pos } => {
                    let len = self.key.len();
                    for (element, child) in node.children().await? {
                        if let Some(next) = search::superset_step(&self.key, pos, &element, &*self.comparer) {
                            self.stack.push(search::superset_frame(child, next, len));
                        }
                    }
                }
            }
        }

        Ok(None)
    }
}
