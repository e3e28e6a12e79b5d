//! # Game Configuration
//!
//! One TOML file, five sections, every key optional:
//!
//! ```toml
//! [world]       # world_size, chunk_size, tile_spacing
//! [render]      # render_distance, recompute_threshold_sq
//! [animation]   # durations, heights, damping
//! [reconciler]  # debounce_window
//! [teams]       # count, unowned_color, colors
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use flippyflop_rendering::{AnimationConfig, ChunkConfig, TeamPalette};
use flippyflop_shared::constants::DEBOUNCE_WINDOW;
use flippyflop_shared::{WorldDims, CHUNK_SIZE, TEAM_COUNT, TILE_SPACING, WORLD_SIZE};

use crate::error::{ClientError, ClientResult};

/// World geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Tiles per world edge.
    pub world_size: u32,
    /// Tiles per chunk edge; must divide `world_size`.
    pub chunk_size: u32,
    /// Center-to-center tile distance in render units.
    pub tile_spacing: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_size: WORLD_SIZE,
            chunk_size: CHUNK_SIZE,
            tile_spacing: TILE_SPACING,
        }
    }
}

/// Update batching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Seconds between the first buffered update and the flush.
    pub debounce_window: f64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self { debounce_window: DEBOUNCE_WINDOW }
    }
}

/// Teams and their colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamsConfig {
    /// Number of teams.
    pub count: u8,
    /// Hex color of unowned tiles.
    pub unowned_color: String,
    /// Hex color per team, indexed by team id.
    pub colors: Vec<String>,
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            count: TEAM_COUNT,
            unowned_color: "#6B7280".to_string(),
            colors: ["#EF4444", "#3B82F6", "#22C55E", "#EAB308", "#A855F7", "#F97316"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// `[world]`
    pub world: WorldConfig,
    /// `[render]`
    pub render: ChunkConfig,
    /// `[animation]`
    pub animation: AnimationConfig,
    /// `[reconciler]`
    pub reconciler: ReconcilerConfig,
    /// `[teams]`
    pub teams: TeamsConfig,
}

impl GameConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// [`ClientError::Parse`] on bad TOML, otherwise whatever
    /// [`GameConfig::validate`] reports.
    pub fn from_toml_str(text: &str) -> ClientResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// [`ClientError::Io`] if the file cannot be read, then as
    /// [`GameConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> ClientResult<()> {
        self.dims()?;
        self.render.validate()?;
        self.animation.validate()?;

        let debounce = self.reconciler.debounce_window;
        if debounce.is_nan() || debounce < 0.0 {
            return Err(ClientError::InvalidConfig(format!(
                "debounce_window must be non-negative, got {debounce}"
            )));
        }

        if self.teams.count == 0 {
            return Err(ClientError::InvalidConfig("teams.count must be at least 1".to_string()));
        }
        if self.teams.colors.len() < usize::from(self.teams.count) {
            return Err(ClientError::InvalidConfig(format!(
                "{} teams but only {} colors",
                self.teams.count,
                self.teams.colors.len()
            )));
        }
        self.palette()?;
        Ok(())
    }

    /// World geometry.
    ///
    /// # Errors
    ///
    /// [`ClientError::Geometry`] if the chunk size does not divide the world
    /// or the spacing is not positive.
    pub fn dims(&self) -> ClientResult<WorldDims> {
        Ok(WorldDims::new(self.world.world_size, self.world.chunk_size, self.world.tile_spacing)?)
    }

    /// Team palette.
    ///
    /// # Errors
    ///
    /// [`ClientError::Render`] on a malformed color.
    pub fn palette(&self) -> ClientResult<TeamPalette> {
        Ok(TeamPalette::from_hex(&self.teams.unowned_color, &self.teams.colors)?)
    }
}
