use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use strata::{Dict, Method, Natural};

const SIZES: &[usize] = &[1_000, 10_000, 100_000];

fn keys(n: usize) -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(0xD1C7);
    (0..n).map(|_| rng.gen()).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in SIZES {
        let keys = keys(n);
        group.throughput(Throughput::Elements(n as u64));
        for method in [Method::Set, Method::OrderedSet] {
            group.bench_with_input(
                BenchmarkId::new(method.name(), n),
                &keys,
                |b, keys| {
                    b.iter(|| {
                        let mut dict = Dict::open(Natural, method);
                        for &k in keys {
                            let _ = dict.insert(black_box(k));
                        }
                        black_box(dict.len())
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    for &n in SIZES {
        let keys = keys(n);
        group.throughput(Throughput::Elements(n as u64));
        for method in [Method::Set, Method::OrderedSet] {
            let mut dict = Dict::open(Natural, method);
            for &k in &keys {
                let _ = dict.insert(k);
            }
            group.bench_with_input(
                BenchmarkId::new(method.name(), n),
                &keys,
                |b, keys| {
                    b.iter(|| {
                        let mut hits = 0usize;
                        for k in keys {
                            if dict.find(black_box(k)).is_some() {
                                hits += 1;
                            }
                        }
                        black_box(hits)
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");
    let n = 100_000;
    let keys = keys(n);
    group.throughput(Throughput::Elements(n as u64));
    for method in [Method::Set, Method::OrderedSet, Method::List] {
        let mut dict = Dict::open(Natural, method);
        for &k in &keys {
            let _ = dict.insert(k);
        }
        group.bench_function(method.name(), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for v in dict.iter() {
                    sum = sum.wrapping_add(*v);
                }
                black_box(sum)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_find, bench_iterate);
criterion_main!(benches);
