//! Benchmark for chunk generation, encoding and world files.
//!
//! Run with: cargo bench --package inhexit_world --bench chunk_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use inhexit_world::{Chunk, ChunkPosition, TerrainGenerator, World, WorldSeed};

fn benchmark_single_chunk(c: &mut Criterion) {
    let generator = TerrainGenerator::new(WorldSeed::new(42.0));

    c.bench_function("single_chunk_generation", |b| {
        let mut coord = 0i32;
        b.iter(|| {
            coord = coord.wrapping_add(1);
            black_box(generator.generate_chunk(ChunkPosition::new(coord, coord % 3)))
        });
    });
}

fn benchmark_chunk_grid(c: &mut Criterion) {
    let generator = TerrainGenerator::new(WorldSeed::new(42.0));

    let mut group = c.benchmark_group("chunk_grid");
    group.throughput(Throughput::Elements(16 * 4));
    group.bench_function("16x4_chunks", |b| {
        b.iter(|| {
            for cy in -1..3 {
                for cx in 0..16 {
                    black_box(generator.generate_chunk(ChunkPosition::new(cx, cy)));
                }
            }
        });
    });

    group.finish();
}

fn benchmark_chunk_codec(c: &mut Criterion) {
    let generator = TerrainGenerator::new(WorldSeed::new(42.0));
    let chunk = generator.generate_chunk(ChunkPosition::new(0, 0));
    let bytes = chunk.serialize();

    c.bench_function("chunk_serialize", |b| {
        b.iter(|| black_box(chunk.serialize()));
    });
    c.bench_function("chunk_deserialize", |b| {
        b.iter(|| black_box(Chunk::from_bytes(black_box(&bytes))));
    });
}

fn benchmark_active_window_walk(c: &mut Criterion) {
    c.bench_function("active_window_walk_east", |b| {
        b.iter(|| {
            let mut world = World::with_seed(42.0);
            let mut x = 0.0f32;
            for _ in 0..64 {
                x += 24.0 * 1.5 * 8.0;
                world.update_active_window((x, 0.0));
            }
            black_box(world.loaded_chunk_count())
        });
    });
}

fn benchmark_world_save(c: &mut Criterion) {
    let mut world = World::with_seed(42.0);
    world.generate_spawn_area();
    let temp_path = std::env::temp_dir().join("inhexit_bench_world.bin");

    c.bench_function("world_save_25_chunks", |b| {
        b.iter(|| {
            world.save_world(black_box(&temp_path)).unwrap();
        });
    });

    std::fs::remove_file(&temp_path).ok();
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = benchmark_single_chunk,
              benchmark_chunk_grid,
              benchmark_chunk_codec,
              benchmark_active_window_walk,
              benchmark_world_save
}

criterion_main!(benches);
