//! Tile animation: easing curves, tuning and the per-tile state machine.

pub mod config;
pub mod easing;
pub mod state;

pub use config::AnimationConfig;
pub use easing::Easing;
pub use state::{AnimationState, TileState, Transition};
