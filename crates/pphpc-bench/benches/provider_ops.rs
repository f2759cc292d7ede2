//! Criterion micro-benchmarks for work-provider dispensing.
//!
//! Each benchmark sweeps a 1M-token domain with one thread per worker and
//! measures how fast the provider hands out indices.

use std::thread;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pphpc_core::WorkerId;
use pphpc_engine::{EqualWorkProvider, OnDemandWorkProvider, WorkProvider};
use std::hint::black_box;

const DOMAIN: usize = 1_000_000;

fn sweep(provider: &dyn WorkProvider, workers: usize) -> usize {
    thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|w| {
                s.spawn(move || {
                    let mut token = provider.new_work(WorkerId(w as u32));
                    let mut sum = 0usize;
                    while let Some(i) = provider.next_token(&mut token).unwrap() {
                        sum = sum.wrapping_add(i);
                    }
                    sum
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .fold(0, usize::wrapping_add)
    })
}

fn bench_equal(c: &mut Criterion) {
    let mut group = c.benchmark_group("equal_1m");
    for workers in [1usize, 2, 4, 8] {
        let provider = EqualWorkProvider::new(DOMAIN, workers);
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &w| {
            b.iter(|| black_box(sweep(&provider, w)));
        });
    }
    group.finish();
}

fn bench_on_demand(c: &mut Criterion) {
    let mut group = c.benchmark_group("on_demand_1m");
    for block_size in [1usize, 100, 10_000] {
        let provider = OnDemandWorkProvider::new(DOMAIN, block_size);
        group.bench_with_input(
            BenchmarkId::new("block", block_size),
            &block_size,
            |b, _| {
                b.iter(|| black_box(sweep(&provider, 4)));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_equal, bench_on_demand);
criterion_main!(benches);
