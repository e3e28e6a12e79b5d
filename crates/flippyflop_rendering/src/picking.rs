//! Ground-plane picking.
//!
//! One floor-based mapping between render space and chunk slots, used for
//! hover, click and tile placement alike, so a pointer over a tile's
//! center always resolves to that tile.

use flippyflop_shared::WorldDims;

/// Slot under ground point `(x, z)` in the chunk whose min corner is
/// `origin`, or `None` when the point lies outside that chunk.
#[must_use]
pub fn resolve_local_index(dims: &WorldDims, origin: (f32, f32), x: f32, z: f32) -> Option<usize> {
    let spacing = dims.tile_spacing();
    let lx = ((x - origin.0) / spacing).floor();
    let ly = ((z - origin.1) / spacing).floor();
    let size = dims.chunk_size() as f32;
    if !(0.0..size).contains(&lx) || !(0.0..size).contains(&ly) {
        return None;
    }
    Some(lx as usize + ly as usize * dims.chunk_size() as usize)
}

/// Ground-plane center of slot `idx` in the chunk at `origin`.
#[must_use]
pub fn slot_center(dims: &WorldDims, origin: (f32, f32), idx: usize) -> (f32, f32) {
    let size = dims.chunk_size() as usize;
    let spacing = dims.tile_spacing();
    let lx = (idx % size) as f32;
    let ly = (idx / size) as f32;
    (origin.0 + (lx + 0.5) * spacing, origin.1 + (ly + 0.5) * spacing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flippyflop_shared::WorldChunkCoord;

    #[test]
    fn test_center_resolves_to_own_slot() {
        let dims = WorldDims::default();
        for world in [WorldChunkCoord::new(0, 0), WorldChunkCoord::new(-3, 7), WorldChunkCoord::new(12, -1)] {
            let origin = dims.chunk_origin(world);
            for idx in 0..dims.tiles_per_chunk() {
                let (x, z) = slot_center(&dims, origin, idx);
                assert_eq!(resolve_local_index(&dims, origin, x, z), Some(idx));
            }
        }
    }

    #[test]
    fn test_outside_chunk_is_none() {
        let dims = WorldDims::default();
        let origin = dims.chunk_origin(WorldChunkCoord::new(0, 0));
        assert_eq!(resolve_local_index(&dims, origin, -0.01, 0.5), None);
        assert_eq!(resolve_local_index(&dims, origin, 0.5, dims.chunk_extent() + 0.01), None);
        assert_eq!(resolve_local_index(&dims, origin, 0.0, 0.0), Some(0));
    }
}
