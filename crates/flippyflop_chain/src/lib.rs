//! # FlippyFlop Chain Bridge
//!
//! Everything between the game contract's entity indexer and the tile
//! engine's sparse map.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐  records   ┌─────────────────┐
//! │  EntitySource   │ ─────────▶ │  RecordParser   │  (validate at boundary)
//! │  (indexer)      │            └────────┬────────┘
//! └─────────────────┘                     │ Tile / User
//!                                         ▼
//!                                ┌─────────────────┐
//!                                │ TileReconciler  │  (debounced batch)
//!                                └────────┬────────┘
//!                                         ▼
//!                                ┌─────────────────┐
//!                                │ChainSyncedState │  (EntityMap + users)
//!                                └─────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod reconciler;
pub mod records;
pub mod source;
pub mod state;

pub use error::{ChainError, ChainResult};
pub use reconciler::{FlushReport, ReconcilerStats, TileReconciler};
pub use records::{EntityRecord, ModelKind, ParsedEntity, RecordParser, User};
pub use source::{
    EntitySource, FeedEvent, KeyPattern, PatternMode, SimulatedSource, Subscription, UpdateCallback,
};
pub use state::ChainSyncedState;
