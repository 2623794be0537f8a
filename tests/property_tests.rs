//! Randomized checks of the set-trie against a brute-force model.
use std::collections::{BTreeMap, BTreeSet};

use futures::executor::block_on;
use futures::TryStreamExt;
use quickcheck::{quickcheck, Arbitrary, Gen};
use set_trie::{AsyncSetTrieMap, MemoryNode, OrdComparer, ReverseComparer, SetTrieMap};

type Set = BTreeSet<u8>;

/// A small universe keeps subset and superset relations frequent.
#[derive(Debug, Clone)]
struct SmallSet(Set);

impl Arbitrary for SmallSet {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 6;
        SmallSet((0..len).map(|_| u8::arbitrary(g) % 8).collect())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let set = self.0.clone();
        Box::new(set.clone().into_iter().map(move |e| {
            let mut smaller = set.clone();
            smaller.remove(&e);
            SmallSet(smaller)
        }))
    }
}

/// Distinct stored sets, each mapped to its index.
fn model(sets: Vec<SmallSet>) -> BTreeMap<Set, usize> {
    let mut model = BTreeMap::new();
    for SmallSet(set) in sets {
        let next = model.len();
        model.entry(set).or_insert(next);
    }
    model
}

fn build(model: &BTreeMap<Set, usize>) -> SetTrieMap<u8, usize> {
    SetTrieMap::from_content(model.iter().map(|(set, id)| (set.clone(), *id)), OrdComparer).unwrap()
}

fn expected<F: Fn(&Set) -> bool>(model: &BTreeMap<Set, usize>, keep: F) -> BTreeSet<usize> {
    model.iter().filter(|(set, _)| keep(set)).map(|(_, id)| *id).collect()
}

quickcheck! {
    fn subsets_match_model(sets: Vec<SmallSet>, query: SmallSet) -> bool {
        let model = model(sets);
        let trie = build(&model);
        let found: Vec<usize> = trie.subsets(&query.0).unwrap().copied().collect();
        let unique: BTreeSet<usize> = found.iter().copied().collect();
        found.len() == unique.len() && unique == expected(&model, |set| set.is_subset(&query.0))
    }

    fn supersets_match_model(sets: Vec<SmallSet>, query: SmallSet) -> bool {
        let model = model(sets);
        let trie = build(&model);
        let found: Vec<usize> = trie.supersets(&query.0).unwrap().copied().collect();
        let unique: BTreeSet<usize> = found.iter().copied().collect();
        found.len() == unique.len() && unique == expected(&model, |set| set.is_superset(&query.0))
    }

    fn reverse_order_gives_same_relations(sets: Vec<SmallSet>, query: SmallSet) -> bool {
        let model = model(sets);
        let trie = SetTrieMap::<u8, usize, MemoryNode<u8, usize>, ReverseComparer>::from_content(
            model.iter().map(|(set, id)| (set.clone(), *id)),
            ReverseComparer,
        )
        .unwrap();
        let subsets: BTreeSet<usize> = trie.subsets(&query.0).unwrap().copied().collect();
        let supersets: BTreeSet<usize> = trie.supersets(&query.0).unwrap().copied().collect();
        subsets == expected(&model, |set| set.is_subset(&query.0))
            && supersets == expected(&model, |set| set.is_superset(&query.0))
    }

    fn remove_restores_footprint(sets: Vec<SmallSet>, extra: SmallSet) -> bool {
        let model = model(sets);
        if model.contains_key(&extra.0) {
            return true;
        }
        let mut trie = build(&model);
        let nodes = trie.root().node_count();
        trie.insert(&extra.0, usize::MAX).unwrap();
        let removed = trie.remove(&extra.0).unwrap();
        removed
            && trie.root().node_count() == nodes
            && trie.len() == model.len()
            && !trie.contains_key(&extra.0).unwrap()
    }

    fn async_engine_agrees(sets: Vec<SmallSet>, query: SmallSet) -> bool {
        let model = model(sets);
        block_on(async {
            let trie = AsyncSetTrieMap::<u8, usize>::from_content(
                model.iter().map(|(set, id)| (set.clone(), *id)),
                OrdComparer,
            )
            .await
            .unwrap();
            let subsets: BTreeSet<usize> = trie.subsets(&query.0).unwrap().try_collect().await.unwrap();
            let supersets: BTreeSet<usize> = trie.supersets(&query.0).unwrap().try_collect().await.unwrap();
            subsets == expected(&model, |set| set.is_subset(&query.0))
                && supersets == expected(&model, |set| set.is_superset(&query.0))
        })
    }
}
