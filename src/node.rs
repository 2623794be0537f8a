//! Synchronous node storage for the set-trie.
//!
//! The engine only ever touches nodes through the [`TrieNode`] capability trait, so
//! any storage can back a trie. [`MemoryNode`] is the plain in-memory realization:
//! a `HashMap` of children plus an optional value, with no internal locking.

use std::collections::HashMap;
use std::hash::Hash;

use crate::{Error, Result};

/// Capabilities a node must offer to be used by [`SetTrieMap`](crate::SetTrieMap).
///
/// A node represents one prefix of the sorted key space. It owns its children
/// exclusively; the children map has no ordering requirement, ordering is imposed
/// by the engine's comparer during traversal.
pub trait TrieNode<E, V>: Sized {
    /// Returns whether a value is attached
    fn has_value(&self) -> bool;

    /// Returns the attached value, or [`Error::MissingValue`] if there is none
    fn value(&self) -> Result<&V>;

    /// Iterates over `(element, child)` pairs in no particular order
    fn children<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a E, &'a Self)> + 'a>;

    /// Looks up the child for `element`
    fn child(&self, element: &E) -> Option<&Self>;

    /// Looks up the child for `element` for mutation
    fn child_mut(&mut self, element: &E) -> Option<&mut Self>;

    /// Returns the child for `element`, creating an empty one if absent
    fn get_or_add_child(&mut self, element: E) -> &mut Self;

    /// Detaches the child for `element`; a no-op if absent
    fn remove_child(&mut self, element: &E);

    /// Attaches a value, failing with [`Error::DuplicateKey`] if one is present
    fn set_value(&mut self, value: V) -> Result<()>;

    /// Detaches and returns the value; a no-op returning `None` if absent
    fn clear_value(&mut self) -> Option<V>;

    /// Returns whether the node has at least one child
    fn has_children(&self) -> bool {
        self.children().next().is_some()
    }

    /// A node with neither value nor children is dead weight
    fn is_empty(&self) -> bool {
        !self.has_value() && !self.has_children()
    }
}

/// In-memory node: a map of children and an optional value.
#[derive(Debug, Clone)]
pub struct MemoryNode<E, V> {
    value: Option<V>,
    children: HashMap<E, MemoryNode<E, V>>,
}

impl<E, V> MemoryNode<E, V> {
    /// Creates a new empty node
    pub fn new() -> Self {
        MemoryNode {
            value: None,
            children: HashMap::new(),
        }
    }

    /// Creates a new childless node holding `value`
    pub fn with_value(value: V) -> Self {
        MemoryNode {
            value: Some(value),
            children: HashMap::new(),
        }
    }

    /// Returns the number of values stored in this subtree
    pub fn subtree_size(&self) -> usize {
        let mut count = if self.value.is_some() { 1 } else { 0 };

        for child in self.children.values() {
            count += child.subtree_size();
        }

        count
    }

    /// Returns the number of nodes in this subtree, this node included
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .values()
            .map(MemoryNode::node_count)
            .sum::<usize>()
    }

    /// Returns whether this node is a leaf node (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl<E, V> Default for MemoryNode<E, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Hash + Eq, V> TrieNode<E, V> for MemoryNode<E, V> {
    fn has_value(&self) -> bool {
        self.value.is_some()
    }

    fn value(&self) -> Result<&V> {
        self.value.as_ref().ok_or(Error::MissingValue)
    }

    fn children<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a E, &'a Self)> + 'a> {
        Box::new(self.children.iter())
    }

    fn child(&self, element: &E) -> Option<&Self> {
        self.children.get(element)
    }

    fn child_mut(&mut self, element: &E) -> Option<&mut Self> {
        self.children.get_mut(element)
    }

    fn get_or_add_child(&mut self, element: E) -> &mut Self {
        self.children.entry(element).or_default()
    }

    fn remove_child(&mut self, element: &E) {
        self.children.remove(element);
    }

    fn set_value(&mut self, value: V) -> Result<()> {
        if self.value.is_some() {
            return Err(Error::DuplicateKey);
        }
        self.value = Some(value);
        Ok(())
    }

    fn clear_value(&mut self) -> Option<V> {
        self.value.take()
    }

    fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node() {
        let node: MemoryNode<u32, String> = MemoryNode::new();

        assert!(!node.has_value());
        assert!(node.is_leaf());
        assert!(TrieNode::is_empty(&node));
        assert_eq!(node.value(), Err(Error::MissingValue));
    }

    #[test]
    fn test_with_value() {
        let node: MemoryNode<u32, u32> = MemoryNode::with_value(42);

        assert_eq!(node.value(), Ok(&42));
        assert!(node.is_leaf());
        assert!(!TrieNode::is_empty(&node));
    }

    #[test]
    fn test_set_value_twice_fails() {
        let mut node: MemoryNode<u32, u32> = MemoryNode::new();
        node.set_value(1).unwrap();

        assert_eq!(node.set_value(2), Err(Error::DuplicateKey));
        assert_eq!(node.value(), Ok(&1));
    }

    #[test]
    fn test_clear_value_is_noop_when_absent() {
        let mut node: MemoryNode<u32, u32> = MemoryNode::with_value(7);

        assert_eq!(node.clear_value(), Some(7));
        assert_eq!(node.clear_value(), None);
        assert!(!node.has_value());
    }

    #[test]
    fn test_children() {
        let mut node: MemoryNode<u32, u32> = MemoryNode::new();
        node.get_or_add_child(1).set_value(10).unwrap();
        node.get_or_add_child(2);
        // Existing child is returned, not replaced
        assert!(node.get_or_add_child(1).has_value());

        assert_eq!(node.children().count(), 2);
        assert_eq!(node.child(&1).map(|c| c.value()), Some(Ok(&10)));
        assert!(node.child(&3).is_none());

        node.child_mut(&2).unwrap().set_value(20).unwrap();
        node.remove_child(&1);
        node.remove_child(&1);
        assert!(node.child(&1).is_none());
        assert!(node.has_children());
    }

    #[test]
    fn test_subtree_size_and_node_count() {
        let mut node: MemoryNode<u32, u32> = MemoryNode::with_value(42);
        assert_eq!(node.subtree_size(), 1);
        assert_eq!(node.node_count(), 1);

        // A valueless chain counts as nodes but not as values
        node.get_or_add_child(1).get_or_add_child(2).set_value(43).unwrap();

        assert_eq!(node.subtree_size(), 2);
        assert_eq!(node.node_count(), 3);
    }
}
