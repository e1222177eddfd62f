/// Benchmarks for the render-info cache: full renders, incremental block
/// edits and raycast picking
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use voxelite::config::{TerrainConfig, WorldConfig};
use voxelite::model::world::{ids, MaterialTable, World};
use voxelite::utils::WorldCoord;

fn terrain_world(size: i32) -> World {
    let config = WorldConfig { world_size: size, map_height: 32, chunk_size: 16, seed: 1, ..Default::default() };
    World::generate(&config, &TerrainConfig::default(), MaterialTable::default())
        .unwrap_or_else(|err| panic!("world generation failed: {err}"))
}

/// Highest active block of column (x, z)
fn surface(world: &World, x: i32, z: i32) -> WorldCoord {
    (0..world.depth())
        .rev()
        .map(|y| WorldCoord(x, y, z))
        .find(|coord| world.get_block(*coord).is_some_and(|b| b.is_active()))
        .unwrap_or(WorldCoord(x, 0, z))
}

fn bench_full_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_render");
    group.sample_size(20);

    for size in [32, 64, 128] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut world = terrain_world(size);
            b.iter(|| {
                black_box(world.render(WorldCoord(0, 0, 0), 8).len());
            });
        });
    }
    group.finish();
}

fn bench_set_block(c: &mut Criterion) {
    c.bench_function("set_block_dig_and_fill", |b| {
        let mut world = terrain_world(64);
        world.render(WorldCoord(0, 0, 0), 8);
        let top = surface(&world, 3, -5);
        let original = world.block_id(top).unwrap_or(ids::STONE);

        b.iter(|| {
            world.set_block(black_box(top), ids::AIR);
            world.set_block(black_box(top), original);
        });
    });
}

fn bench_update_noop(c: &mut Criterion) {
    c.bench_function("update_render_at_unchanged", |b| {
        let mut world = terrain_world(64);
        world.render(WorldCoord(0, 0, 0), 8);
        let top = surface(&world, 0, 0);

        b.iter(|| black_box(world.update_render_at(black_box(top))));
    });
}

fn bench_pick_block(c: &mut Criterion) {
    c.bench_function("pick_block", |b| {
        let world = terrain_world(64);
        let origin = Vec3::new(0.3, 31.5, 0.2);
        let direction = Vec3::new(0.4, -1.0, 0.3).normalize();

        b.iter(|| black_box(world.pick_block(black_box(origin), direction, 100, 40.0, true)));
    });
}

criterion_group!(benches, bench_full_render, bench_set_block, bench_update_noop, bench_pick_block);
criterion_main!(benches);
