//! Element ordering strategies.
//!
//! Every trie operation sorts its input through an [`ElementComparer`]. The order
//! must be strict and total: [`Ordering::Equal`] may only be reported for elements
//! that are the same logical element, otherwise two distinct elements collapse into
//! one child slot and the trie silently stores the wrong sets.

use std::cmp::Ordering;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use dashmap::DashMap;
use tracing::debug;

use crate::LOG_TARGET;

/// A strict total order over elements of type `E`.
pub trait ElementComparer<E> {
    /// Compares two elements.
    fn compare(&self, a: &E, b: &E) -> Ordering;
}

impl<E, C: ElementComparer<E> + ?Sized> ElementComparer<E> for &C {
    fn compare(&self, a: &E, b: &E) -> Ordering {
        (**self).compare(a, b)
    }
}

/// Orders elements by their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrdComparer;

impl<E: Ord> ElementComparer<E> for OrdComparer {
    fn compare(&self, a: &E, b: &E) -> Ordering {
        a.cmp(b)
    }
}

/// Orders elements by the reverse of their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReverseComparer;

impl<E: Ord> ElementComparer<E> for ReverseComparer {
    fn compare(&self, a: &E, b: &E) -> Ordering {
        b.cmp(a)
    }
}

/// Wraps a closure as a comparer.
///
/// ```rust
/// use set_trie::{ElementComparer, FnComparer};
///
/// let by_len = FnComparer::new(|a: &&str, b: &&str| a.len().cmp(&b.len()).then(a.cmp(b)));
/// assert!(by_len.compare(&"zz", &"aaa").is_lt());
/// ```
#[derive(Clone)]
pub struct FnComparer<F>(F);

impl<F> FnComparer<F> {
    /// Creates a comparer from a comparison function
    pub fn new(f: F) -> Self {
        FnComparer(f)
    }
}

impl<E, F> ElementComparer<E> for FnComparer<F>
where
    F: Fn(&E, &E) -> Ordering,
{
    fn compare(&self, a: &E, b: &E) -> Ordering {
        (self.0)(a, b)
    }
}

impl<F> std::fmt::Debug for FnComparer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FnComparer").finish()
    }
}

/// Orders elements by hash, for element types that are hashable but not ordered.
///
/// Distinct elements whose hashes collide are told apart by a rank handed out the
/// first time each of them takes part in a collision. Ranks are remembered for the
/// lifetime of this instance, which makes the order total and stable for one
/// session only: neither the hasher seed nor the ranks survive a restart, so a
/// `HashComparer` must not be used to build tries whose nodes are persisted.
///
/// Rank assignment is an atomic get-or-insert, so one instance can be shared
/// between threads.
pub struct HashComparer<E, S = RandomState> {
    hasher: S,
    ranks: DashMap<E, u64>,
    next_rank: AtomicU64,
    _element: PhantomData<fn(&E)>,
}

impl<E: Hash + Eq> HashComparer<E, RandomState> {
    /// Creates a comparer with a freshly seeded hasher
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<E: Hash + Eq> Default for HashComparer<E, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Hash + Eq, S: BuildHasher> HashComparer<E, S> {
    /// Creates a comparer hashing with the given hasher builder
    pub fn with_hasher(hasher: S) -> Self {
        HashComparer {
            hasher,
            ranks: DashMap::new(),
            next_rank: AtomicU64::new(0),
            _element: PhantomData,
        }
    }

    /// Number of elements that have been ranked to break a hash collision.
    pub fn resolved_collisions(&self) -> usize {
        self.ranks.len()
    }

    fn hash_of(&self, element: &E) -> u64 {
        let mut state = self.hasher.build_hasher();
        element.hash(&mut state);
        state.finish()
    }

    fn rank_of(&self, element: &E) -> u64
    where
        E: Clone,
    {
        if let Some(rank) = self.ranks.get(element) {
            return *rank;
        }
        *self
            .ranks
            .entry(element.clone())
            .or_insert_with(|| {
                let rank = self.next_rank.fetch_add(1, AtomicOrdering::Relaxed);
                debug!(target: LOG_TARGET, rank, "Ranking element to break hash collision");
                rank
            })
            .value()
    }
}

impl<E, S> ElementComparer<E> for HashComparer<E, S>
where
    E: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn compare(&self, a: &E, b: &E) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        match self.hash_of(a).cmp(&self.hash_of(b)) {
            Ordering::Equal => self.rank_of(a).cmp(&self.rank_of(b)),
            unequal => unequal,
        }
    }
}

impl<E: Hash + Eq, S> std::fmt::Debug for HashComparer<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashComparer")
            .field("resolved_collisions", &self.ranks.len())
            .finish()
    }
}
