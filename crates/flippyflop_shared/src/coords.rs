//! Chunk partition math for the toroidal world.
//!
//! Three coordinate spaces:
//!
//! - **global tile** ([`TileKey`]): `0..world_size` on each axis
//! - **modular chunk** ([`ChunkCoord`]): `0..chunks_per_dimension`
//! - **world chunk** ([`WorldChunkCoord`]): unwrapped, follows the camera
//!   across the seam so the same modular chunk can appear at several offsets
//!
//! Ground plane is X/Z in render space; tile Y maps to render Z.

use thiserror::Error;

use crate::constants::{CHUNK_SIZE, TILE_SPACING, WORLD_SIZE};
use crate::tile::TileKey;

/// Invalid world geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Chunk size is zero or does not divide the world.
    #[error("chunk size {chunk_size} must be non-zero and divide world size {world_size}")]
    ChunkSizeMismatch {
        /// Configured world size.
        world_size: u32,
        /// Configured chunk size.
        chunk_size: u32,
    },
    /// Tile spacing must be a positive finite number.
    #[error("tile spacing must be positive and finite, got {0}")]
    InvalidSpacing(f32),
}

/// Modular chunk coordinate, wrapped into `0..chunks_per_dimension`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// Chunk column.
    pub x: u32,
    /// Chunk row.
    pub y: u32,
}

/// Unwrapped chunk coordinate used for camera-relative placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldChunkCoord {
    /// Chunk column, may be negative or past the seam.
    pub x: i32,
    /// Chunk row, may be negative or past the seam.
    pub y: i32,
}

impl WorldChunkCoord {
    /// Creates a world chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offsets this coordinate by `(dx, dy)` chunks.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Tile position inside a chunk, `0..chunk_size` on each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocalCoord {
    /// Column inside the chunk.
    pub x: u32,
    /// Row inside the chunk.
    pub y: u32,
}

/// World geometry: sizes plus the render-space spacing between tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldDims {
    world_size: u32,
    chunk_size: u32,
    tile_spacing: f32,
}

impl WorldDims {
    /// Creates validated world geometry.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError`] if `chunk_size` does not divide `world_size`
    /// or the spacing is not a positive finite number.
    pub fn new(world_size: u32, chunk_size: u32, tile_spacing: f32) -> Result<Self, CoordError> {
        if chunk_size == 0 || world_size == 0 || world_size % chunk_size != 0 {
            return Err(CoordError::ChunkSizeMismatch { world_size, chunk_size });
        }
        if !(tile_spacing.is_finite() && tile_spacing > 0.0) {
            return Err(CoordError::InvalidSpacing(tile_spacing));
        }
        Ok(Self { world_size, chunk_size, tile_spacing })
    }

    /// Tiles per world axis.
    #[inline]
    #[must_use]
    pub const fn world_size(&self) -> u32 {
        self.world_size
    }

    /// Tiles per chunk axis.
    #[inline]
    #[must_use]
    pub const fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Tiles per chunk.
    #[inline]
    #[must_use]
    pub const fn tiles_per_chunk(&self) -> usize {
        (self.chunk_size * self.chunk_size) as usize
    }

    /// Render-space distance between tile origins.
    #[inline]
    #[must_use]
    pub const fn tile_spacing(&self) -> f32 {
        self.tile_spacing
    }

    /// Chunks per world axis.
    #[inline]
    #[must_use]
    pub const fn chunks_per_dimension(&self) -> u32 {
        self.world_size / self.chunk_size
    }

    /// Render-space width of one chunk.
    #[inline]
    #[must_use]
    pub fn chunk_extent(&self) -> f32 {
        self.chunk_size as f32 * self.tile_spacing
    }

    /// Wraps a world chunk coordinate onto the torus.
    #[must_use]
    pub fn wrap_chunk(&self, world: WorldChunkCoord) -> ChunkCoord {
        let n = self.chunks_per_dimension() as i32;
        ChunkCoord {
            x: world.x.rem_euclid(n) as u32,
            y: world.y.rem_euclid(n) as u32,
        }
    }

    /// Global tile for slot `idx` of the chunk placed at `world`.
    ///
    /// `idx` is row-major: `idx % chunk_size` is the column.
    #[must_use]
    pub fn global_from_slot(&self, world: WorldChunkCoord, idx: usize) -> TileKey {
        let size = i64::from(self.chunk_size);
        let world_size = i64::from(self.world_size);
        let idx = idx as i64;
        let gx = i64::from(world.x) * size + idx % size;
        let gy = i64::from(world.y) * size + idx / size;
        TileKey::new(gx.rem_euclid(world_size) as u32, gy.rem_euclid(world_size) as u32)
    }

    /// Splits a global tile into its modular chunk and local offset.
    #[must_use]
    pub fn partition(&self, key: TileKey) -> (ChunkCoord, LocalCoord) {
        let x = key.x % self.world_size;
        let y = key.y % self.world_size;
        (
            ChunkCoord { x: x / self.chunk_size, y: y / self.chunk_size },
            LocalCoord { x: x % self.chunk_size, y: y % self.chunk_size },
        )
    }

    /// Inverse of [`WorldDims::partition`].
    #[must_use]
    pub const fn reconstruct(&self, chunk: ChunkCoord, local: LocalCoord) -> TileKey {
        TileKey::new(
            chunk.x * self.chunk_size + local.x,
            chunk.y * self.chunk_size + local.y,
        )
    }

    /// Row-major slot index of a local coordinate.
    #[inline]
    #[must_use]
    pub const fn slot_index(&self, local: LocalCoord) -> usize {
        (local.x + local.y * self.chunk_size) as usize
    }

    /// World chunk containing a render-space ground point.
    #[must_use]
    pub fn chunk_at(&self, ground_x: f32, ground_z: f32) -> WorldChunkCoord {
        let extent = self.chunk_extent();
        WorldChunkCoord::new((ground_x / extent).floor() as i32, (ground_z / extent).floor() as i32)
    }

    /// Render-space origin (min corner) of a world chunk.
    #[must_use]
    pub fn chunk_origin(&self, world: WorldChunkCoord) -> (f32, f32) {
        let extent = self.chunk_extent();
        (world.x as f32 * extent, world.y as f32 * extent)
    }
}

impl Default for WorldDims {
    fn default() -> Self {
        Self {
            world_size: WORLD_SIZE,
            chunk_size: CHUNK_SIZE,
            tile_spacing: TILE_SPACING,
        }
    }
}
