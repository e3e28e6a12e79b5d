//! Benchmark for the per-frame tile engine.
//!
//! TARGET: 25 chunks (10,000 tiles) advanced and batched well inside a
//! 60 FPS frame.
//!
//! Run with: cargo bench --package flippyflop_rendering --bench chunk_benchmark

use alloy_primitives::Address;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use flippyflop_rendering::{AnimationConfig, ChunkConfig, ChunkManager, HeadlessBackend, TeamPalette};
use flippyflop_shared::{EntityMap, Team, Tile, Vec3, WorldDims};

fn seeded_map(dims: &WorldDims) -> EntityMap {
    let size = dims.world_size();
    (0..size * size)
        .filter(|i| i % 3 == 0)
        .map(|i| Tile::unowned(i % size, i / size).flipped_to(Address::repeat_byte(1), Team((i % 6) as u8)))
        .collect()
}

fn manager() -> ChunkManager {
    ChunkManager::new(
        WorldDims::default(),
        ChunkConfig::default(),
        AnimationConfig::default(),
        TeamPalette::default(),
    )
}

fn benchmark_recompute(c: &mut Criterion) {
    let dims = WorldDims::default();
    let map = seeded_map(&dims);
    let extent = dims.chunk_extent();

    c.bench_function("recompute_25_chunks_from_scratch", |b| {
        b.iter(|| {
            let mut chunks = manager();
            black_box(chunks.recompute_visible_chunks(Vec3::ZERO, 2, &map))
        });
    });

    c.bench_function("recompute_one_row_shift", |b| {
        let mut chunks = manager();
        let mut step = 0i32;
        b.iter(|| {
            step = step.wrapping_add(1);
            let camera = Vec3::new(step as f32 * extent, 0.0, 0.0);
            black_box(chunks.recompute_visible_chunks(camera, 2, &map))
        });
    });
}

fn benchmark_frame(c: &mut Criterion) {
    let dims = WorldDims::default();
    let mut map = seeded_map(&dims);
    let mut chunks = manager();
    chunks.recompute_visible_chunks(Vec3::ZERO, 2, &map);
    let mut backend = HeadlessBackend::new();

    let mut group = c.benchmark_group("frame");
    group.throughput(Throughput::Elements(25 * dims.tiles_per_chunk() as u64));

    group.bench_function("advance_and_upload", |b| {
        let mut elapsed = 0.0f64;
        b.iter(|| {
            elapsed += 1.0 / 60.0;
            chunks.advance(1.0 / 60.0, elapsed);
            black_box(chunks.upload(&mut backend))
        });
    });

    group.bench_function("reconcile_full_flip", |b| {
        let mut now = 0.0f64;
        let mut owned = false;
        b.iter(|| {
            now += 0.1;
            owned = !owned;
            let tile = if owned {
                Tile::unowned(5, 5).flipped_to(Address::repeat_byte(9), Team(2))
            } else {
                Tile::unowned(5, 5)
            };
            map.insert(tile);
            black_box(chunks.on_entity_map_changed(&map, now))
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_recompute, benchmark_frame);
criterion_main!(benches);
