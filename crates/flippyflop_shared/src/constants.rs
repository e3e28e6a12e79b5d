//! # World & Timing Constants
//!
//! Defaults for the FlippyFlop world. Every value here can be overridden
//! through the client's `GameConfig`; these are what a config file with an
//! empty section resolves to.

// =============================================================================
// WORLD GEOMETRY
// =============================================================================

/// Tiles per world axis. The world wraps at this size on both axes.
pub const WORLD_SIZE: u32 = 200;

/// Tiles per chunk axis. Must divide [`WORLD_SIZE`].
pub const CHUNK_SIZE: u32 = 20;

/// Distance between neighbouring tile origins, in world units.
pub const TILE_SPACING: f32 = 1.1;

/// Chunks loaded in each direction from the camera's chunk.
pub const RENDER_DISTANCE: i32 = 2;

/// Minimum squared camera travel before visible chunks are recomputed.
pub const CAMERA_RECOMPUTE_THRESHOLD_SQ: f32 = 4.0;

/// Number of playable teams.
pub const TEAM_COUNT: u8 = 6;

// =============================================================================
// ANIMATION TIMING (seconds)
// =============================================================================

/// Rate base for the jump / flip / fall phases.
pub const ANIMATION_DURATION: f32 = 0.4;

/// Length of the powerup "stamp" animation.
pub const POWERUP_ANIMATION_DURATION: f32 = 0.6;

/// Time for hover progress to go from 0 to 1.
pub const HOVER_ANIMATION_DURATION: f32 = 0.15;

/// A powerup pulse never starts within this window after a flip.
pub const POWERUP_COOLDOWN: f64 = 1.0;

// =============================================================================
// RECONCILIATION
// =============================================================================

/// Delay between the first buffered update and the batched flush.
pub const DEBOUNCE_WINDOW: f64 = 0.1;
