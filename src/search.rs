//! Traversal rules shared by the sync and async engines.
//!
//! Both subset and superset searches are depth-first walks over an explicit stack of
//! frames ([`SubsetFrame`] and [`Visit`] respectively). The drivers in `trie.rs` and
//! `async_trie.rs` differ only in how they reach node data; which frames get pushed
//! is decided here.

use std::cmp::Ordering;
use std::ops::Range;

use crate::comparer::ElementComparer;

/// A pending step of a subset search: `node` was reached having consumed the
/// sorted query up to `pos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SubsetFrame<N> {
    pub(crate) node: N,
    pub(crate) pos: usize,
}

/// A pending unit of superset traversal work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Visit<N> {
    /// `node` was reached having consumed the sorted query up to `pos`.
    Match { node: N, pos: usize },
    /// Every value in the subtree under `node` qualifies.
    Drain(N),
}

/// First frame of a subset search.
pub(crate) fn subset_start<N>(root: N) -> SubsetFrame<N> {
    SubsetFrame { node: root, pos: 0 }
}

/// Query positions whose element may label the next edge of a subset path.
///
/// A node reached at `pos` holds a set built only from query elements before `pos`.
/// Taking the child for `key[i]` consumes `key[i]` and skips `key[pos..i]`; every
/// stored subset is reached through exactly one such sequence of choices, so each
/// value is yielded once. A child labelled with an element missing from the query
/// can never lead to a subset and is never looked up.
pub(crate) fn subset_probes(pos: usize, len: usize) -> Range<usize> {
    pos..len
}

/// Frame for `node` reached at `pos` during a superset search.
///
/// Once every query element is consumed the whole subtree qualifies.
pub(crate) fn superset_frame<N>(node: N, pos: usize, len: usize) -> Visit<N> {
    if pos >= len {
        Visit::Drain(node)
    } else {
        Visit::Match { node, pos }
    }
}

/// First frame of a superset search.
pub(crate) fn superset_start<N>(root: N, len: usize) -> Visit<N> {
    superset_frame(root, 0, len)
}

/// Decides how a superset search continues through the child labelled `element`
/// of a node reached at `pos` (with `pos < key.len()`).
///
/// Returns the query position to continue with, or `None` to prune the child:
/// - equal to `key[pos]`: the query element is matched, advance;
/// - less than `key[pos]`: an extra element of the stored set, stay;
/// - greater than `key[pos]`: the stored set skipped a required element, prune.
///
/// Children that do not exceed the last consumed query element are out of order
/// and pruned as well.
pub(crate) fn superset_step<E, C>(key: &[E], pos: usize, element: &E, comparer: &C) -> Option<usize>
where
    C: ElementComparer<E> + ?Sized,
{
    if pos > 0 && comparer.compare(element, &key[pos - 1]) != Ordering::Greater {
        return None;
    }
    match comparer.compare(element, &key[pos]) {
        Ordering::Equal => Some(pos + 1),
        Ordering::Less => Some(pos),
        Ordering::Greater => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::OrdComparer;

    #[test]
    fn test_superset_step() {
        let key = [2, 5];

        // Extra element before the first required one
        assert_eq!(superset_step(&key, 0, &1, &OrdComparer), Some(0));
        // Required element matched
        assert_eq!(superset_step(&key, 0, &2, &OrdComparer), Some(1));
        // Skips the required 2
        assert_eq!(superset_step(&key, 0, &3, &OrdComparer), None);
        // Between the two required elements
        assert_eq!(superset_step(&key, 1, &3, &OrdComparer), Some(1));
        assert_eq!(superset_step(&key, 1, &5, &OrdComparer), Some(2));
        assert_eq!(superset_step(&key, 1, &6, &OrdComparer), None);
        // Not after the consumed 2
        assert_eq!(superset_step(&key, 1, &2, &OrdComparer), None);
        assert_eq!(superset_step(&key, 1, &1, &OrdComparer), None);
    }

    #[test]
    fn test_superset_frame() {
        assert_eq!(superset_frame("n", 2, 2), Visit::Drain("n"));
        assert_eq!(superset_frame("n", 1, 2), Visit::Match { node: "n", pos: 1 });
        assert_eq!(superset_start("root", 0), Visit::Drain("root"));
    }

    #[test]
    fn test_subset_probes() {
        assert_eq!(subset_probes(1, 4), 1..4);
        assert!(subset_probes(3, 3).is_empty());
        assert_eq!(subset_start("root"), SubsetFrame { node: "root", pos: 0 });
    }
}
