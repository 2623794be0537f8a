//! Asynchronous node storage for the set-trie.
//!
//! [`AsyncTrieNode`] mirrors [`TrieNode`](crate::TrieNode) with every access a
//! suspension point, so that nodes can live in secondary storage. Nodes are cheap
//! handles: operations take `&self` and return owned children and cloned values.
//! [`SharedNode`] is the in-memory realization, safe to mutate from several tasks.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::{Error, Result};

/// Capabilities a node handle must offer to be used by
/// [`AsyncSetTrieMap`](crate::AsyncSetTrieMap).
///
/// Every operation may fail, typically with [`Error::Storage`], and those failures
/// propagate to the engine's caller unchanged.
#[async_trait]
pub trait AsyncTrieNode<E, V>: Clone + Send + Sync
where
    E: Send + Sync + 'static,
    V: Send + 'static,
{
    /// Returns whether a value is attached
    async fn has_value(&self) -> Result<bool>;

    /// Returns the attached value, or [`Error::MissingValue`] if there is none
    async fn value(&self) -> Result<V>;

    /// Lists `(element, child)` pairs in no particular order
    async fn children(&self) -> Result<Vec<(E, Self)>>;

    /// Looks up the child for `element`
    async fn child(&self, element: &E) -> Result<Option<Self>>;

    /// Returns the child for `element`, creating an empty one if absent
    async fn get_or_add_child(&self, element: E) -> Result<Self>;

    /// Detaches the child for `element`; a no-op if absent
    async fn remove_child(&self, element: &E) -> Result<()>;

    /// Attaches a value, failing with [`Error::DuplicateKey`] if one is present
    async fn set_value(&self, value: V) -> Result<()>;

    /// Detaches and returns the value; a no-op returning `None` if absent
    async fn clear_value(&self) -> Result<Option<V>>;

    /// Returns whether the node has at least one child
    async fn has_children(&self) -> Result<bool> {
        Ok(!self.children().await?.is_empty())
    }

    /// A node with neither value nor children is dead weight
    async fn is_empty(&self) -> Result<bool> {
        Ok(!self.has_value().await? && !self.has_children().await?)
    }
}

struct Inner<E, V> {
    value: RwLock<Option<V>>,
    children: DashMap<E, SharedNode<E, V>>,
}

/// In-memory node handle backed by a concurrent children map.
///
/// Clones share the same node. Individual operations are atomic; sequences of them
/// are not, so concurrent writers to one trie must coordinate externally.
pub struct SharedNode<E, V>(Arc<Inner<E, V>>);

impl<E: Hash + Eq, V> SharedNode<E, V> {
    /// Creates a new empty node
    pub fn new() -> Self {
        SharedNode(Arc::new(Inner {
            value: RwLock::new(None),
            children: DashMap::new(),
        }))
    }

    /// Creates a new childless node holding `value`
    pub fn with_value(value: V) -> Self {
        let node = Self::new();
        *node.0.value.write() = Some(value);
        node
    }

    /// Returns the number of values stored in this subtree
    pub fn subtree_size(&self) -> usize {
        let own = if self.0.value.read().is_some() { 1 } else { 0 };
        own + self
            .0
            .children
            .iter()
            .map(|entry| entry.value().subtree_size())
            .sum::<usize>()
    }

    /// Returns the number of nodes in this subtree, this node included
    pub fn node_count(&self) -> usize {
        1 + self
            .0
            .children
            .iter()
            .map(|entry| entry.value().node_count())
            .sum::<usize>()
    }

    /// Returns `true` if both handles refer to the same node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<E, V> Clone for SharedNode<E, V> {
    fn clone(&self) -> Self {
        SharedNode(Arc::clone(&self.0))
    }
}

impl<E: Hash + Eq, V> Default for SharedNode<E, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Hash + Eq, V> fmt::Debug for SharedNode<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedNode")
            .field("has_value", &self.0.value.read().is_some())
            .field("children", &self.0.children.len())
            .finish()
    }
}

#[async_trait]
impl<E, V> AsyncTrieNode<E, V> for SharedNode<E, V>
where
    E: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn has_value(&self) -> Result<bool> {
        Ok(self.0.value.read().is_some())
    }

    async fn value(&self) -> Result<V> {
        self.0.value.read().clone().ok_or(Error::MissingValue)
    }

    async fn children(&self) -> Result<Vec<(E, Self)>> {
        Ok(self
            .0
            .children
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    async fn child(&self, element: &E) -> Result<Option<Self>> {
        Ok(self.0.children.get(element).map(|child| child.value().clone()))
    }

    async fn get_or_add_child(&self, element: E) -> Result<Self> {
        let child = self.0.children.entry(element).or_default().value().clone();
        Ok(child)
    }

    async fn remove_child(&self, element: &E) -> Result<()> {
        self.0.children.remove(element);
        Ok(())
    }

    async fn set_value(&self, value: V) -> Result<()> {
        let mut slot = self.0.value.write();
        if slot.is_some() {
            return Err(Error::DuplicateKey);
        }
        *slot = Some(value);
        Ok(())
    }

    async fn clear_value(&self) -> Result<Option<V>> {
        Ok(self.0.value.write().take())
    }

    async fn has_children(&self) -> Result<bool> {
        Ok(!self.0.children.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_new_node() {
        block_on(async {
            let node: SharedNode<u32, u32> = SharedNode::new();

            assert!(!node.has_value().await.unwrap());
            assert!(node.is_empty().await.unwrap());
            assert_eq!(node.value().await, Err(Error::MissingValue));
        });
    }

    #[test]
    fn test_value_slot() {
        block_on(async {
            let node: SharedNode<u32, u32> = SharedNode::with_value(3);

            assert_eq!(node.set_value(4).await, Err(Error::DuplicateKey));
            assert_eq!(node.value().await, Ok(3));
            assert_eq!(node.clear_value().await, Ok(Some(3)));
            assert_eq!(node.clear_value().await, Ok(None));
        });
    }

    #[test]
    fn test_children_are_shared_handles() {
        block_on(async {
            let node: SharedNode<u32, u32> = SharedNode::new();
            let first = node.get_or_add_child(1).await.unwrap();
            let again = node.get_or_add_child(1).await.unwrap();
            assert!(first.ptr_eq(&again));

            first.set_value(10).await.unwrap();
            let looked_up = node.child(&1).await.unwrap().unwrap();
            assert_eq!(looked_up.value().await, Ok(10));
            assert!(node.child(&2).await.unwrap().is_none());

            assert_eq!(node.children().await.unwrap().len(), 1);
            assert_eq!(node.node_count(), 2);
            assert_eq!(node.subtree_size(), 1);

            node.remove_child(&1).await.unwrap();
            node.remove_child(&1).await.unwrap();
            assert!(!node.has_children().await.unwrap());
        });
    }

    #[test]
    fn test_concurrent_child_creation() {
        let node: SharedNode<u32, u32> = SharedNode::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let node = node.clone();
                scope.spawn(move || {
                    block_on(async {
                        for element in 0..50 {
                            node.get_or_add_child(element).await.unwrap();
                        }
                    })
                });
            }
        });
        assert_eq!(node.node_count(), 51);
    }
}
