//! # Tile Chunks
//!
//! A chunk is a fixed `chunk_size²` window of the world placed at one
//! unwrapped [`WorldChunkCoord`]. Tiles, animation states and instance
//! slots are dense arrays sharing one row-major index, allocated once at
//! materialization and never resized.

pub mod manager;

use flippyflop_shared::{ChunkCoord, EntityMap, Tile, TileKey, WorldChunkCoord, WorldDims};

use crate::animation::{AnimationConfig, TileState, Transition};
use crate::instancing::{InstanceBatch, InstanceData};
use crate::palette::TeamPalette;
use crate::picking::slot_center;

pub use manager::{ChunkConfig, ChunkManager, ChunkStats, RecomputeSummary, ScoreIndicator};

/// One visible block of tiles.
#[derive(Debug, Clone)]
pub struct Chunk {
    world: WorldChunkCoord,
    coord: ChunkCoord,
    origin: (f32, f32),
    tiles: Vec<Tile>,
    states: Vec<TileState>,
    batch: InstanceBatch,
}

impl Chunk {
    /// Builds the chunk at `world` from the current map.
    #[must_use]
    pub fn materialize(dims: &WorldDims, world: WorldChunkCoord, map: &EntityMap, palette: &TeamPalette) -> Self {
        let count = dims.tiles_per_chunk();
        let origin = dims.chunk_origin(world);
        let mut tiles = Vec::with_capacity(count);
        let mut states = Vec::with_capacity(count);

        for idx in 0..count {
            let tile = map.tile_or_default(dims.global_from_slot(world, idx));
            let (x, z) = slot_center(dims, origin, idx);
            states.push(TileState::new(&tile, x, z, palette));
            tiles.push(tile);
        }

        let mut batch = InstanceBatch::new(count);
        batch.write_all(states.iter().map(InstanceData::from_state));

        Self {
            world,
            coord: dims.wrap_chunk(world),
            origin,
            tiles,
            states,
            batch,
        }
    }

    /// Unwrapped placement.
    #[inline]
    #[must_use]
    pub const fn world(&self) -> WorldChunkCoord {
        self.world
    }

    /// Modular coordinate on the torus.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Render-space min corner.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> (f32, f32) {
        self.origin
    }

    /// Authoritative tiles, by slot.
    #[inline]
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Animation states, by slot.
    #[inline]
    #[must_use]
    pub fn states(&self) -> &[TileState] {
        &self.states
    }

    /// Tile in slot `idx`.
    #[inline]
    #[must_use]
    pub fn tile(&self, idx: usize) -> Option<&Tile> {
        self.tiles.get(idx)
    }

    /// State in slot `idx`.
    #[inline]
    #[must_use]
    pub fn state(&self, idx: usize) -> Option<&TileState> {
        self.states.get(idx)
    }

    /// Instance batch.
    #[inline]
    #[must_use]
    pub fn batch(&self) -> &InstanceBatch {
        &self.batch
    }

    /// Instance batch, for upload.
    #[inline]
    pub fn batch_mut(&mut self) -> &mut InstanceBatch {
        &mut self.batch
    }

    /// Global key of slot `idx`.
    #[inline]
    #[must_use]
    pub fn key_of(&self, dims: &WorldDims, idx: usize) -> TileKey {
        dims.global_from_slot(self.world, idx)
    }

    /// Diffs every slot against `map` and feeds changes to the state
    /// machines. `on_change` sees the slot, the new tile and what fired.
    ///
    /// Returns the number of slots whose tile changed.
    pub fn reconcile<F>(&mut self, dims: &WorldDims, map: &EntityMap, now: f64, cooldown: f64, mut on_change: F) -> usize
    where
        F: FnMut(usize, &Tile, &mut TileState, Transition),
    {
        let mut changed = 0;
        for (idx, (tile, state)) in self.tiles.iter_mut().zip(self.states.iter_mut()).enumerate() {
            let next = map.tile_or_default(dims.global_from_slot(self.world, idx));
            if *tile == next {
                continue;
            }
            let transition = state.on_tile_changed(tile, &next, now, cooldown);
            *tile = next;
            changed += 1;
            on_change(idx, tile, state, transition);
        }
        changed
    }

    /// Advances every state and rewrites the batch.
    pub fn advance(
        &mut self,
        dt: f32,
        elapsed: f64,
        hovered: Option<usize>,
        config: &AnimationConfig,
        palette: &TeamPalette,
    ) {
        for (idx, state) in self.states.iter_mut().enumerate() {
            state.advance(dt, elapsed, hovered == Some(idx), config, palette);
        }
        self.batch.write_all(self.states.iter().map(InstanceData::from_state));
    }
}
