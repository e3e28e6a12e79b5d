//! # Rendering Error Types

use thiserror::Error;

/// Errors raised by the tile engine and its backend boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A palette entry could not be parsed.
    #[error("invalid color {0:?}: expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    /// Animation or chunk tuning is out of range.
    #[error("invalid render config: {0}")]
    InvalidConfig(String),

    /// The external backend refused an upload.
    #[error("backend upload failed: {0}")]
    Backend(String),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
