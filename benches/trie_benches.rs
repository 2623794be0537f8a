use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use set_trie::SetTrieMap;
use std::collections::BTreeSet;

const UNIVERSE: u32 = 64;

fn random_sets(rng: &mut StdRng, count: usize, max_len: usize) -> Vec<BTreeSet<u32>> {
    (0..count)
        .map(|_| {
            let len = rng.gen_range(1..=max_len);
            (0..len).map(|_| rng.gen_range(0..UNIVERSE)).collect()
        })
        .collect()
}

fn build(sets: &[BTreeSet<u32>]) -> SetTrieMap<u32, usize> {
    let mut trie = SetTrieMap::new();
    for (i, set) in sets.iter().enumerate() {
        // Random draws repeat; keep the first
        let _ = trie.insert(set, i);
    }
    trie
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    let mut rng = StdRng::seed_from_u64(7);

    for &count in &[1_000usize, 10_000] {
        let sets = random_sets(&mut rng, count, 8);
        group.bench_with_input(BenchmarkId::new("set_trie", count), &sets, |b, sets| {
            b.iter(|| black_box(build(sets)));
        });
    }

    group.finish();
}

fn bench_subsets(c: &mut Criterion) {
    let mut group = c.benchmark_group("subsets");
    let mut rng = StdRng::seed_from_u64(11);
    let sets = random_sets(&mut rng, 10_000, 6);
    let trie = build(&sets);
    let queries = random_sets(&mut rng, 100, 16);

    group.bench_function("set_trie", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(trie.subsets(query).map(|found| found.count()).unwrap_or(0));
            }
        });
    });

    group.bench_function("linear_scan", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(sets.iter().filter(|set| set.is_subset(query)).count());
            }
        });
    });

    group.finish();
}

fn bench_supersets(c: &mut Criterion) {
    let mut group = c.benchmark_group("supersets");
    let mut rng = StdRng::seed_from_u64(13);
    let sets = random_sets(&mut rng, 10_000, 10);
    let trie = build(&sets);
    let queries = random_sets(&mut rng, 100, 2);

    group.bench_function("set_trie", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(trie.supersets(query).map(|found| found.count()).unwrap_or(0));
            }
        });
    });

    group.bench_function("linear_scan", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(sets.iter().filter(|set| set.is_superset(query)).count());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_subsets, bench_supersets);
criterion_main!(benches);
