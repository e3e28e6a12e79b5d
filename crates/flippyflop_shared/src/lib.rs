//! # FlippyFlop Shared
//!
//! Types used by both the chain bridge and the renderer.
//!
//! - [`Tile`]: authoritative tile record (owner, team, powerup)
//! - [`TileKey`]: global coordinate key, printed as `"x,y"`
//! - [`WorldDims`]: chunk partition math for the toroidal world
//! - [`EntityMap`]: sparse `TileKey -> Tile` cache fed by the entity source
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on a GPU crate or perform chain I/O.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod coords;
pub mod entity_map;
pub mod math;
pub mod tile;

pub use constants::{CHUNK_SIZE, RENDER_DISTANCE, TEAM_COUNT, TILE_SPACING, WORLD_SIZE};
pub use coords::{ChunkCoord, CoordError, LocalCoord, WorldChunkCoord, WorldDims};
pub use entity_map::EntityMap;
pub use math::{lerp, Vec3};
pub use tile::{mask_address, Powerup, Team, Tile, TileKey, TileKeyParseError, UNOWNED};
