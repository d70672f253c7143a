//! R*-tree benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rstar_disk::{HyperRectangle, RStarTree, SpatialPoint, TreeConfig};
use std::hint::black_box;
use tempfile::tempdir;

fn grid_point(i: usize) -> SpatialPoint {
    SpatialPoint::from([(i % 100) as f64, (i / 100) as f64])
}

fn bench_config(path: &std::path::Path) -> TreeConfig {
    TreeConfig::new(path, 2)
        .with_capacity(32)
        .with_sync_writes(false)
}

fn bench_rstar_tree_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("RStarTree Insert");
    group.sample_size(10);

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_with_setup(
                || {
                    let dir = tempdir().unwrap();
                    (RStarTree::create(bench_config(dir.path())).unwrap(), dir)
                },
                |(mut tree, _dir)| {
                    for i in 0..size {
                        tree.insert(grid_point(i)).unwrap();
                    }
                    black_box(tree.len())
                },
            );
        });
    }

    group.finish();
}

fn bench_rstar_tree_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("RStarTree Search");

    let dir = tempdir().unwrap();
    let mut tree = RStarTree::create(bench_config(dir.path())).unwrap();

    // Populate tree
    for i in 0..10000 {
        tree.insert(grid_point(i)).unwrap();
    }

    let query = HyperRectangle::from_bounds(vec![25.0, 25.0], vec![75.0, 75.0]).unwrap();
    group.bench_function("search_10k", |b| {
        b.iter(|| black_box(tree.search(&query).unwrap().count()));
    });

    let center = SpatialPoint::from([50.5, 50.5]);
    group.bench_function("nearest_10_of_10k", |b| {
        b.iter(|| black_box(tree.nearest(&center, 10).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_rstar_tree_insert, bench_rstar_tree_search);
criterion_main!(benches);
