//! # FlippyFlop Rendering
//!
//! Chunked tile engine between the entity map and the 3D backend:
//! - Keeps a `(2r+1)²` square of chunks around the camera on a toroidal world
//! - Runs one animation state machine per visible tile
//! - Writes one instance batch per chunk per frame
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         FRAME LOOP                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  EntityMap ─▶ ChunkManager ─▶ TileState (per slot)           │
//! │                    │                 │                       │
//! │                 picking        InstanceBatch ─▶ RenderBackend │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - Authoritative changes only enqueue animations, never jump state
//! - Hover, click and placement share one floor-based mapping
//! - No allocations per frame once chunks are materialized

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod animation;
pub mod chunk;
pub mod error;
pub mod instancing;
pub mod palette;
pub mod picking;

pub use animation::{AnimationConfig, AnimationState, Easing, TileState, Transition};
pub use chunk::{Chunk, ChunkConfig, ChunkManager, ChunkStats, RecomputeSummary, ScoreIndicator};
pub use error::{RenderError, RenderResult};
pub use instancing::{HeadlessBackend, InstanceBatch, InstanceData, RenderBackend};
pub use palette::{parse_hex_color, Color, TeamPalette};
pub use picking::{resolve_local_index, slot_center};
