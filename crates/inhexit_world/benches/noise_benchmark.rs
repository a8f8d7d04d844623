//! Benchmark for value noise sampling.
//!
//! Run with: cargo bench --package inhexit_world --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use inhexit_world::noise::{ValueNoise, WorldSeed};
use inhexit_world::terrain::TerrainGenerator;

fn benchmark_single_sample(c: &mut Criterion) {
    let noise = ValueNoise::new(WorldSeed::new(42.0));

    c.bench_function("single_noise_sample", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.sample(black_box(x), black_box(x * 0.7)))
        });
    });
}

fn benchmark_million_samples(c: &mut Criterion) {
    let noise = ValueNoise::new(WorldSeed::new(42.0));

    let mut group = c.benchmark_group("million_samples");
    group.throughput(Throughput::Elements(1_000_000));
    group.sample_size(10);

    group.bench_function("1M_noise_samples", |b| {
        b.iter(|| {
            for i in 0..1_000_000 {
                let x = f64::from(i % 1000) * 0.1;
                let y = f64::from(i / 1000) * 0.1;
                black_box(noise.sample(x, y));
            }
        });
    });

    group.finish();
}

fn benchmark_ground_level(c: &mut Criterion) {
    let generator = TerrainGenerator::new(WorldSeed::new(42.0));

    c.bench_function("ground_level_per_column", |b| {
        let mut q = 0i32;
        b.iter(|| {
            q = q.wrapping_add(1);
            black_box(generator.base_level(black_box(q)))
        });
    });
}

criterion_group!(
    benches,
    benchmark_single_sample,
    benchmark_million_samples,
    benchmark_ground_level
);
criterion_main!(benches);
