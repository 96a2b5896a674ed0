//! Catalog merge benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use quire_core::catalog::{merge_catalog, CatalogRecord};

fn records(count: usize, prefix: &str) -> Vec<CatalogRecord> {
    (0..count)
        .map(|i| CatalogRecord {
            id: (i % 3 != 0).then(|| format!("book-{}", i)),
            title: Some(format!("{} {:05}", prefix, (i * 7919) % count)),
            author: Some("Bench Author".to_string()),
            ..CatalogRecord::default()
        })
        .collect()
}

fn merge_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_catalog");
    for size in [100, 1_000, 10_000] {
        let remote = records(size, "Remote");
        let local = records(size / 10, "Local");
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| merge_catalog(remote.clone(), local.clone()))
        });
    }
    group.finish();
}

criterion_group!(benches, merge_benchmark);
criterion_main!(benches);
