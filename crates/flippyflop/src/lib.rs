//! # FlippyFlop
//!
//! The game client, integrating the chain bridge and the tile engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           FLIPCLIENT                             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  ┌────────────────┐  feed   ┌────────────────┐  flush            │
//! │  │  EntitySource  │───────▶ │ TileReconciler │─────────┐         │
//! │  └────────────────┘ channel └────────────────┘         ▼         │
//! │          ▲                                    ┌────────────────┐ │
//! │          │ flip                               │  ChunkManager  │ │
//! │  ┌───────┴────────┐          click            │  + TileStates  │ │
//! │  │   FlipAction   │◀──────────────────────────┤                │ │
//! │  └────────────────┘                           └───────┬────────┘ │
//! │                                                       ▼          │
//! │                                               ┌────────────────┐ │
//! │                                               │ RenderBackend  │ │
//! │                                               └────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration
//! - `client`: bootstrap, frame loop, input, teardown
//! - `action`: flip submission
//! - `telemetry`: log output for binaries

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod action;
pub mod client;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export the units
pub use flippyflop_chain as chain;
pub use flippyflop_rendering as rendering;
pub use flippyflop_shared as shared;

pub use action::{FlipAction, SimulatedFlipper};
pub use client::{ClientStats, FlipClient, FrameReport, Notification};
pub use config::{GameConfig, ReconcilerConfig, TeamsConfig, WorldConfig};
pub use error::{ClientError, ClientResult};
pub use telemetry::init_telemetry;
