//! Criterion micro-benchmarks for torus topology operations.

use criterion::{criterion_group, criterion_main, Criterion};
use pphpc_space::{Space, Torus2D};
use std::hint::black_box;

/// Benchmark: neighbourhood() on all 10K cells of a 100x100 torus.
fn bench_neighbourhood_torus_10k(c: &mut Criterion) {
    let space = Torus2D::new(100, 100).unwrap();

    c.bench_function("neighbourhood_torus_10k", |b| {
        b.iter(|| {
            for idx in 0..space.cell_count() {
                black_box(space.neighbourhood(idx));
            }
        });
    });
}

/// Benchmark: coordinate round trip on the wrapping edges of a 400x400 torus.
fn bench_coords_edges_160k(c: &mut Criterion) {
    let space = Torus2D::new(400, 400).unwrap();
    let edges: Vec<usize> = (0..400)
        .flat_map(|i| [i, 399 * 400 + i, i * 400, i * 400 + 399])
        .collect();

    c.bench_function("coords_edges_160k", |b| {
        b.iter(|| {
            for &idx in &edges {
                let (x, y) = space.coords(idx);
                black_box(space.index(x, y));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_neighbourhood_torus_10k,
    bench_coords_edges_160k
);
criterion_main!(benches);
