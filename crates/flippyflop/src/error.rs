//! # Client Error Types

use std::path::PathBuf;

use thiserror::Error;

use flippyflop_chain::ChainError;
use flippyflop_rendering::RenderError;
use flippyflop_shared::CoordError;

/// Errors surfaced by the game client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for [`crate::GameConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but is inconsistent.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// World geometry rejected.
    #[error(transparent)]
    Geometry(#[from] CoordError),

    /// Entity source failure.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// Rendering or backend failure.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The flip action refused a tile.
    #[error("flip action failed: {0}")]
    Action(String),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
