//! # Torus Walk Integration Test
//!
//! Walks the camera across the world seam and checks that visible chunks
//! always show the right tiles and that picking agrees with placement.

use alloy_primitives::Address;
use flippyflop_rendering::{
    AnimationConfig, AnimationState, ChunkConfig, ChunkManager, HeadlessBackend, TeamPalette,
};
use flippyflop_shared::{EntityMap, Team, Tile, TileKey, Vec3, WorldChunkCoord, WorldDims};

fn manager() -> ChunkManager {
    ChunkManager::new(
        WorldDims::default(),
        ChunkConfig::default(),
        AnimationConfig::default(),
        TeamPalette::default(),
    )
}

/// Walk two full laps east; the visible square never shrinks and every
/// slot matches the map.
#[test]
fn test_walk_across_seam() {
    let mut chunks = manager();
    let dims = *chunks.dims();
    let mut map = EntityMap::default();
    for i in 0..dims.world_size() {
        map.insert(Tile::unowned(i, i).flipped_to(Address::repeat_byte(7), Team((i % 6) as u8)));
    }

    let lap = dims.world_size() as f32 * dims.tile_spacing();
    let mut x = 0.0f32;
    let mut backend = HeadlessBackend::new();
    while x < lap * 2.0 {
        chunks.update_camera(Vec3::new(x, 20.0, 0.0), &map);
        assert_eq!(chunks.active_count(), 25, "square shrank at x={x}");
        chunks.upload(&mut backend).unwrap();
        x += 3.0;
    }

    for chunk in chunks.active_chunks() {
        for (idx, tile) in chunk.tiles().iter().enumerate() {
            assert_eq!(tile.key(), chunk.key_of(&dims, idx));
            assert_eq!(*tile, map.tile_or_default(tile.key()));
        }
    }
    assert_eq!(backend.chunk_count(), 25);
    assert!(chunks.stats().chunks_unloaded > 0);
}

/// Every slot center in every active chunk picks back to itself.
#[test]
fn test_picking_matches_placement() {
    let mut chunks = manager();
    let map = EntityMap::default();
    chunks.recompute_visible_chunks(Vec3::new(-5.0, 0.0, 230.0), 2, &map);

    let coords = chunks.active_coords();
    for world in coords {
        let chunk = chunks.chunk(world).unwrap();
        let states: Vec<_> = chunk.states().iter().map(|s| s.position()).collect();
        for (idx, position) in states.into_iter().enumerate() {
            assert_eq!(chunks.pick(position.x, position.z), Some((world, idx)));
        }
    }
}

/// A flushed flip plays once and settles in the new owner's color.
#[test]
fn test_one_flush_one_flip() {
    let mut chunks = manager();
    let mut map = EntityMap::default();
    chunks.recompute_visible_chunks(Vec3::ZERO, 2, &map);

    let key = TileKey::new(5, 5);
    map.insert(Tile::unowned(5, 5).flipped_to(Address::repeat_byte(0xAB), Team(3)));
    assert_eq!(chunks.on_entity_map_changed(&map, 0.0), 1);

    let state = chunks.state_at(key).unwrap();
    assert_eq!(state.queued(), vec![AnimationState::Jumping]);

    let config = AnimationConfig::default();
    let dt = 1.0 / 60.0;
    let ticks = (config.animation_duration * 2.5 / dt).ceil() as usize + 2;
    for i in 0..ticks {
        chunks.advance(dt, i as f64 * f64::from(dt));
    }
    let state = chunks.state_at(key).unwrap();
    assert_eq!(state.state(), AnimationState::Idle);
    assert_eq!(state.team(), Some(Team(3)));
    assert_eq!(state.color(), TeamPalette::default().color(Some(Team(3))));
    assert_eq!(chunks.chunk(WorldChunkCoord::new(0, 0)).unwrap().batch().instances()[105].color, state.color());
}
