//! Criterion benchmarks for the bucket-sort pipeline.
//!
//! Compares the distributed pipeline against single-threaded and
//! rayon-parallel full sorts of the same data. Values are drawn from the
//! crate's working domain `[0, 100)`, so duplicates are plentiful.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::thread;

use scatter_sort::config::RunConfig;
use scatter_sort::{comm, coordinator, local_sort, pipeline};

const RANGE_MAX: u32 = 100;

/// Generate bounded random test data of the given size.
fn generate_random_data(size: usize) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(size as u64);
    (0..size).map(|_| rng.gen_range(0..RANGE_MAX)).collect()
}

/// Partition, sort each bucket, reassemble. No threads: measures the
/// algorithm itself rather than channel traffic.
fn bucket_pipeline(data: &[u32], workers: usize) -> Vec<u32> {
    let mut buckets = coordinator::partition(data, workers, RANGE_MAX);
    for bucket in &mut buckets {
        local_sort::sort(bucket);
    }
    coordinator::reassemble(buckets)
}

/// Benchmark full sorts of the whole dataset on one core and on all cores.
fn bench_full_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("Full Sort");

    for size_exp in [12, 14, 16, 18] {
        let size = 1usize << size_exp;
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("stable", size), &size, |b, &size| {
            b.iter_batched(
                || generate_random_data(size),
                |mut data| {
                    data.sort();
                    data
                },
                criterion::BatchSize::LargeInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("unstable", size), &size, |b, &size| {
            b.iter_batched(
                || generate_random_data(size),
                |mut data| {
                    data.sort_unstable();
                    data
                },
                criterion::BatchSize::LargeInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("rayon", size), &size, |b, &size| {
            b.iter_batched(
                || generate_random_data(size),
                |mut data| {
                    data.par_sort_unstable();
                    data
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

/// Benchmark the partition/sort/reassemble pipeline at varying bucket counts.
fn bench_bucket_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bucket Pipeline");
    let size = 1usize << 16;
    group.throughput(Throughput::Elements(size as u64));

    for workers in [2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(workers),
            &workers,
            |b, &workers| {
                b.iter_batched(
                    || generate_random_data(size),
                    |data| bucket_pipeline(black_box(&data), workers),
                    criterion::BatchSize::LargeInput,
                )
            },
        );
    }

    group.finish();
}

/// Benchmark the end-to-end protocol including thread spawn and the two
/// collectives.
fn bench_full_protocol(c: &mut Criterion) {
    let mut group = c.benchmark_group("Full Protocol");
    let workers = 4;

    for size_exp in [12, 16] {
        let size = 1usize << size_exp;
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let config = RunConfig {
                dataset_size: size,
                range_max: RANGE_MAX,
                seed: Some(size as u64),
            };
            b.iter(|| {
                let config = &config;
                let endpoints = comm::connect(workers);
                thread::scope(|s| {
                    let handles: Vec<_> = endpoints
                        .into_iter()
                        .map(|mut endpoint| {
                            s.spawn(move || {
                                pipeline::run_participant(&mut endpoint, config).unwrap()
                            })
                        })
                        .collect();
                    handles
                        .into_iter()
                        .map(|h| h.join().unwrap())
                        .find_map(|p| p.merged)
                })
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_full_sort,
    bench_bucket_pipeline,
    bench_full_protocol
);
criterion_main!(benches);
