//! # Chunk Manager
//!
//! Keeps the square of chunks around the camera alive and drives them.
//!
//! ```text
//! camera ──▶ update_camera ──(moved > threshold)──▶ recompute_visible_chunks
//!                                                     │ load / unload
//! flush  ──▶ on_entity_map_changed ──▶ TileState queues
//! frame  ──▶ advance ──▶ InstanceBatch per chunk ──▶ upload ──▶ RenderBackend
//! ```
//!
//! Single-threaded: the frame loop owns the manager and everything in it.

use std::collections::{HashMap, HashSet};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use flippyflop_shared::constants::CAMERA_RECOMPUTE_THRESHOLD_SQ;
use flippyflop_shared::{EntityMap, Tile, TileKey, Vec3, WorldChunkCoord, WorldDims, RENDER_DISTANCE};

use super::Chunk;
use crate::animation::{AnimationConfig, TileState, Transition};
use crate::error::{RenderError, RenderResult};
use crate::instancing::RenderBackend;
use crate::palette::TeamPalette;
use crate::picking::resolve_local_index;

/// Chunk visibility tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Chunks kept on each side of the camera's chunk.
    pub render_distance: i32,
    /// Squared ground distance the camera must travel before visibility
    /// is recomputed.
    pub recompute_threshold_sq: f32,
}

impl ChunkConfig {
    /// Checks ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] for a negative render
    /// distance or threshold.
    pub fn validate(&self) -> RenderResult<()> {
        if self.render_distance < 0 {
            return Err(RenderError::InvalidConfig(format!(
                "render_distance must be non-negative, got {}",
                self.render_distance
            )));
        }
        if self.recompute_threshold_sq.is_nan() || self.recompute_threshold_sq < 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "recompute_threshold_sq must be non-negative, got {}",
                self.recompute_threshold_sq
            )));
        }
        Ok(())
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            render_distance: RENDER_DISTANCE,
            recompute_threshold_sq: CAMERA_RECOMPUTE_THRESHOLD_SQ,
        }
    }
}

/// Outcome of a visibility recompute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeSummary {
    /// Chunks materialized.
    pub loaded: usize,
    /// Chunks dropped.
    pub unloaded: usize,
    /// Chunks active afterwards.
    pub active: usize,
}

/// Floating "+1" for a flip or stamp on one of the local player's tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreIndicator {
    /// Tile that scored.
    pub key: TileKey,
    /// Where to spawn the indicator.
    pub position: Vec3,
    /// Points shown.
    pub points: u32,
}

/// Manager counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkStats {
    /// Chunks currently active.
    pub active_chunks: usize,
    /// Chunks materialized since creation.
    pub chunks_loaded: u64,
    /// Chunks dropped since creation.
    pub chunks_unloaded: u64,
    /// Visibility recomputes run.
    pub recomputes: u64,
    /// Flips queued.
    pub flips: u64,
    /// Powerup stamps queued.
    pub powerups: u64,
    /// "+1" indicators emitted for the local player.
    pub plus_ones: u64,
    /// Frames advanced.
    pub frames: u64,
}

/// Owns the active chunks and their animation.
pub struct ChunkManager {
    dims: WorldDims,
    config: ChunkConfig,
    animation: AnimationConfig,
    palette: TeamPalette,
    local_player: Option<Address>,

    chunks: HashMap<WorldChunkCoord, Chunk>,
    /// Dropped chunks the backend has not been told about yet.
    retired: Vec<WorldChunkCoord>,
    last_camera: Option<Vec3>,
    hovered: Option<(WorldChunkCoord, usize)>,
    indicators: Vec<ScoreIndicator>,
    stats: ChunkStats,
}

impl ChunkManager {
    /// Creates a manager with no active chunks.
    #[must_use]
    pub fn new(dims: WorldDims, config: ChunkConfig, animation: AnimationConfig, palette: TeamPalette) -> Self {
        let side = (2 * config.render_distance.max(0) + 1) as usize;
        Self {
            dims,
            config,
            animation,
            palette,
            local_player: None,
            chunks: HashMap::with_capacity(side * side),
            retired: Vec::with_capacity(side * 2),
            last_camera: None,
            hovered: None,
            indicators: Vec::new(),
            stats: ChunkStats::default(),
        }
    }

    /// Sets whose tiles earn "+1" indicators.
    pub fn set_local_player(&mut self, player: Option<Address>) {
        self.local_player = player;
    }

    /// World geometry.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> &WorldDims {
        &self.dims
    }

    /// Counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> ChunkStats {
        self.stats
    }

    /// Number of active chunks.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.chunks.len()
    }

    /// Active chunks, in no particular order.
    pub fn active_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Active world coordinates, sorted row-major.
    #[must_use]
    pub fn active_coords(&self) -> Vec<WorldChunkCoord> {
        let mut coords: Vec<_> = self.chunks.keys().copied().collect();
        coords.sort_unstable_by_key(|c| (c.y, c.x));
        coords
    }

    /// Chunk placed at `world`, if active.
    #[must_use]
    pub fn chunk(&self, world: WorldChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&world)
    }

    /// Recomputes visibility if the camera moved far enough since the
    /// last recompute, or if none has run yet.
    pub fn update_camera(&mut self, camera: Vec3, map: &EntityMap) -> Option<RecomputeSummary> {
        let moved = match self.last_camera {
            None => true,
            Some(last) => camera.ground_distance_squared(last) > self.config.recompute_threshold_sq,
        };
        if !moved {
            return None;
        }
        let render_distance = self.config.render_distance;
        Some(self.recompute_visible_chunks(camera, render_distance, map))
    }

    /// Loads every chunk within `render_distance` of the camera's chunk and
    /// drops the rest. Chunks already active keep their state.
    pub fn recompute_visible_chunks(&mut self, camera: Vec3, render_distance: i32, map: &EntityMap) -> RecomputeSummary {
        let center = self.dims.chunk_at(camera.x, camera.z);
        let r = render_distance.max(0);
        let desired: HashSet<WorldChunkCoord> = (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| center.offset(dx, dy)))
            .collect();

        let dropped: Vec<WorldChunkCoord> = self
            .chunks
            .keys()
            .filter(|world| !desired.contains(world))
            .copied()
            .collect();
        for world in &dropped {
            self.chunks.remove(world);
        }
        let unloaded = dropped.len();
        self.retired.extend(dropped);

        let mut loaded = 0;
        for world in desired {
            if !self.chunks.contains_key(&world) {
                let chunk = Chunk::materialize(&self.dims, world, map, &self.palette);
                self.chunks.insert(world, chunk);
                loaded += 1;
            }
        }

        if let Some((world, _)) = self.hovered {
            if !self.chunks.contains_key(&world) {
                self.hovered = None;
            }
        }

        self.last_camera = Some(camera);
        self.stats.recomputes += 1;
        self.stats.chunks_loaded += loaded as u64;
        self.stats.chunks_unloaded += unloaded as u64;
        self.stats.active_chunks = self.chunks.len();

        if loaded > 0 || unloaded > 0 {
            tracing::debug!(
                "chunks around ({}, {}): +{} -{} = {}",
                center.x,
                center.y,
                loaded,
                unloaded,
                self.chunks.len()
            );
        }

        RecomputeSummary { loaded, unloaded, active: self.chunks.len() }
    }

    /// Applies a flushed entity map to every active chunk.
    ///
    /// Returns the number of transitions queued.
    pub fn on_entity_map_changed(&mut self, map: &EntityMap, now: f64) -> usize {
        let cooldown = self.animation.powerup_cooldown;
        let local = self.local_player;
        let mut fired = 0;

        for chunk in self.chunks.values_mut() {
            let world = chunk.world();
            chunk.reconcile(&self.dims, map, now, cooldown, |_, tile, state, transition| {
                if !transition.fired() {
                    return;
                }
                if transition == Transition::Flip {
                    self.stats.flips += 1;
                } else {
                    self.stats.powerups += 1;
                }
                fired += 1;
                if local.is_some_and(|player| player == tile.address) {
                    state.award_plus_one();
                    self.stats.plus_ones += 1;
                    self.indicators.push(indicator(tile, state));
                }
                tracing::trace!("tile {} in chunk ({}, {}) queued {:?}", tile.key(), world.x, world.y, transition);
            });
        }
        fired
    }

    /// Moves the hover target to the tile under `point`, or clears it.
    pub fn set_pointer(&mut self, point: Option<(f32, f32)>) {
        self.hovered = point.and_then(|(x, z)| self.pick(x, z));
    }

    /// Hovered chunk and slot.
    #[inline]
    #[must_use]
    pub const fn hovered(&self) -> Option<(WorldChunkCoord, usize)> {
        self.hovered
    }

    /// Chunk and slot under ground point `(x, z)`.
    #[must_use]
    pub fn pick(&self, x: f32, z: f32) -> Option<(WorldChunkCoord, usize)> {
        self.chunks
            .values()
            .find_map(|chunk| resolve_local_index(&self.dims, chunk.origin(), x, z).map(|idx| (chunk.world(), idx)))
    }

    /// Tile a click at `(x, z)` would flip. Owned tiles cannot be clicked.
    #[must_use]
    pub fn click(&self, x: f32, z: f32) -> Option<Tile> {
        let (world, idx) = self.pick(x, z)?;
        let tile = self.chunks.get(&world)?.tile(idx)?;
        (!tile.is_owned()).then_some(*tile)
    }

    /// Authoritative tile at `key`, if it is inside an active chunk.
    #[must_use]
    pub fn tile_at(&self, key: TileKey) -> Option<&Tile> {
        let (world, idx) = self.locate(key)?;
        self.chunks.get(&world)?.tile(idx)
    }

    /// Animation state of the tile at `key`, if visible.
    ///
    /// When the view spans the seam and the tile shows more than once, the
    /// copy in the lowest row-major world chunk is returned.
    #[must_use]
    pub fn state_at(&self, key: TileKey) -> Option<&TileState> {
        let (world, idx) = self.locate(key)?;
        self.chunks.get(&world)?.state(idx)
    }

    fn locate(&self, key: TileKey) -> Option<(WorldChunkCoord, usize)> {
        let (coord, local) = self.dims.partition(key);
        let world = self
            .chunks
            .values()
            .filter(|chunk| chunk.coord() == coord)
            .map(Chunk::world)
            .min_by_key(|w| (w.y, w.x))?;
        Some((world, self.dims.slot_index(local)))
    }

    /// Advances every tile one frame and rewrites the batches.
    pub fn advance(&mut self, dt: f32, elapsed: f64) {
        for chunk in self.chunks.values_mut() {
            let hovered = self
                .hovered
                .and_then(|(world, idx)| (world == chunk.world()).then_some(idx));
            chunk.advance(dt, elapsed, hovered, &self.animation, &self.palette);
        }
        self.stats.frames += 1;
    }

    /// Sends retirements and dirty batches to `backend`.
    ///
    /// Returns the number of batches uploaded.
    ///
    /// # Errors
    ///
    /// Stops at the first failed upload; the failed batch stays dirty.
    pub fn upload<B: RenderBackend>(&mut self, backend: &mut B) -> RenderResult<usize> {
        for world in self.retired.drain(..) {
            backend.retire(world);
        }

        let mut uploaded = 0;
        for chunk in self.chunks.values_mut() {
            let world = chunk.world();
            let batch = chunk.batch_mut();
            if !batch.is_dirty() {
                continue;
            }
            backend.upload(world, batch.instances())?;
            batch.mark_clean();
            uploaded += 1;
        }
        Ok(uploaded)
    }

    /// Drains pending "+1" indicators.
    pub fn take_score_indicators(&mut self) -> Vec<ScoreIndicator> {
        std::mem::take(&mut self.indicators)
    }
}

fn indicator(tile: &Tile, state: &TileState) -> ScoreIndicator {
    let mut position = state.position();
    position.y += 1.0;
    ScoreIndicator { key: tile.key(), position, points: 1 }
}
