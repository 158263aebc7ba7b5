use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hash_bst::HashBstMap;
use std::collections::BTreeMap;

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

// ─── Map Benchmarks ─────────────────────────────────────────────────────────

fn bench_map_insert_ordered(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let mut group = c.benchmark_group("map_insert_ordered");

    group.bench_function(BenchmarkId::new("HashBstMap", N), |b| {
        b.iter(|| {
            let mut map = HashBstMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_insert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("map_insert_random");

    group.bench_function(BenchmarkId::new("HashBstMap", N), |b| {
        b.iter(|| {
            let mut map = HashBstMap::with_capacity(N);
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_get_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let hb_map: HashBstMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_get_random");

    group.bench_function(BenchmarkId::new("HashBstMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = hb_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = bt_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

fn bench_map_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let hb_map: HashBstMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_remove_random");

    group.bench_function(BenchmarkId::new("HashBstMap", N), |b| {
        b.iter_batched(
            || hb_map.clone(),
            |mut map| {
                for &k in &keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || bt_map.clone(),
            |mut map| {
                for &k in &keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn bench_map_iterate(c: &mut Criterion) {
    let keys = random_keys(N);
    let hb_map: HashBstMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_iterate");

    group.bench_function(BenchmarkId::new("HashBstMap", N), |b| {
        b.iter(|| hb_map.values().fold(0i64, |sum, &v| sum.wrapping_add(v)));
    });

    group.bench_function(BenchmarkId::new("HashBstMap::snapshot", N), |b| {
        b.iter(|| {
            let mut snapshot = hb_map.snapshot();
            let mut sum = 0i64;
            while snapshot.advance() {
                if let Some((_, &v)) = snapshot.current() {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| bt_map.values().fold(0i64, |sum, &v| sum.wrapping_add(v)));
    });

    group.finish();
}

fn bench_map_persist(c: &mut Criterion) {
    let keys = random_keys(N);
    let map: HashBstMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let data = hash_bst::persist::serialize(&map).unwrap();

    let mut group = c.benchmark_group("map_persist");

    group.bench_function(BenchmarkId::new("serialize", N), |b| {
        b.iter(|| hash_bst::persist::serialize(&map).unwrap());
    });

    group.bench_function(BenchmarkId::new("deserialize", N), |b| {
        b.iter(|| hash_bst::persist::deserialize::<i64, i64, rustc_hash::FxBuildHasher>(&data).unwrap());
    });

    group.finish();
}

criterion_group!(
    map_benches,
    bench_map_insert_ordered,
    bench_map_insert_random,
    bench_map_get_random,
    bench_map_remove_random,
    bench_map_iterate,
    bench_map_persist,
);

criterion_main!(map_benches);
