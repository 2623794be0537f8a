//! # Set Trie
//!
//! A set-trie: a prefix tree keyed on the *sorted* elements of a set, built to
//! answer "which stored sets are subsets of this set?" and "which stored sets
//! are supersets of this set?" without scanning every stored set.
//!
//! ## Features
//!
//! - **Subset and superset queries**: lazily streamed, pruned to the nodes reachable
//!   through an ordered embedding of (or into) the query set
//! - **Pluggable storage**: the engine talks to nodes through the [`TrieNode`] and
//!   [`AsyncTrieNode`] capability traits, so any backing store can stand in for the
//!   in-memory nodes
//! - **Pluggable ordering**: any total order can be supplied through [`ElementComparer`]
//! - **Sync and async engines**: [`SetTrieMap`] and [`AsyncSetTrieMap`] run the same
//!   traversal rules, the latter suspending on every node access
//!
//! ## Example
//!
//! ```rust
//! use set_trie::SetTrieMap;
//!
//! let mut trie = SetTrieMap::<u32, &str>::new();
//! trie.insert(vec![1], "one").unwrap();
//! trie.insert(vec![1, 2], "one-two").unwrap();
//! trie.insert(vec![3], "three").unwrap();
//!
//! let mut subsets: Vec<_> = trie.subsets(vec![2, 1]).unwrap().copied().collect();
//! subsets.sort();
//! assert_eq!(subsets, vec!["one", "one-two"]);
//!
//! let supersets: Vec<_> = trie.supersets(vec![2]).unwrap().copied().collect();
//! assert_eq!(supersets, vec!["one-two"]);
//! ```

pub mod async_node;
mod async_trie;
pub mod comparer;
mod key;
pub mod node;
mod search;
mod set;
mod trie;

// Re-export public types
pub use crate::async_node::{AsyncTrieNode, SharedNode};
pub use crate::async_trie::AsyncSetTrieMap;
pub use crate::comparer::{ElementComparer, FnComparer, HashComparer, OrdComparer, ReverseComparer};
pub use crate::key::{IntoKey, Key};
pub use crate::node::{MemoryNode, TrieNode};
pub use crate::set::{AsyncSetTrie, SetTrie};
pub use crate::trie::{SetTrieMap, Subsets, Supersets, Values};

/// Target used for every `tracing` event emitted by this crate.
pub(crate) const LOG_TARGET: &str = "set_trie";

/// Errors that can occur in set-trie operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two elements of one key compared equal: either a true duplicate
    /// or a comparer that is not antisymmetric.
    #[error("ambiguous ordering: key contains elements the comparer cannot distinguish")]
    AmbiguousOrdering,
    /// A value is already attached for this exact key
    #[error("duplicate key: a value is already stored for this set")]
    DuplicateKey,
    /// A node's value was read while none is attached
    #[error("no value attached to this node")]
    MissingValue,
    /// Failure reported by a node storage realization
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
