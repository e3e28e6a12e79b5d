//! # Chain Bridge Error Types

use thiserror::Error;

/// Errors raised at the entity-source boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// A record's shape does not match its model.
    #[error("invalid {model} record: {reason}")]
    InvalidRecord {
        /// Model the record claimed to be.
        model: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Tile coordinates fall outside the world.
    #[error("tile ({x}, {y}) outside world of size {world_size}")]
    OutOfBounds {
        /// Reported X.
        x: u64,
        /// Reported Y.
        y: u64,
        /// Configured world size.
        world_size: u32,
    },

    /// Model tag not known to this client.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// The bulk fetch failed.
    #[error("entity fetch failed: {0}")]
    Fetch(String),

    /// The subscription channel dropped.
    #[error("subscription disconnected: {0}")]
    Disconnected(String),

    /// Operation on a subscription that was already cancelled.
    #[error("subscription closed")]
    SubscriptionClosed,
}

/// Result type for chain bridge operations.
pub type ChainResult<T> = Result<T, ChainError>;
