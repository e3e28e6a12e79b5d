//! Flip actions: what a click on an unowned tile does.

use alloy_primitives::Address;

use flippyflop_chain::SimulatedSource;
use flippyflop_shared::{Team, Tile};

use crate::error::ClientResult;

/// Submits a flip for a tile. The client only calls this for unowned tiles.
pub trait FlipAction {
    /// Requests that `tile` become the player's.
    ///
    /// # Errors
    ///
    /// Implementation-specific submission failure.
    fn flip(&mut self, tile: Tile) -> ClientResult<()>;
}

/// Flips by publishing straight into a [`SimulatedSource`], the way the
/// game contract would emit the tile change.
#[derive(Clone)]
pub struct SimulatedFlipper {
    source: SimulatedSource,
    player: Address,
    team: Team,
    submitted: u64,
}

impl SimulatedFlipper {
    /// Creates a flipper acting as `player` on `team`.
    #[must_use]
    pub fn new(source: SimulatedSource, player: Address, team: Team) -> Self {
        Self { source, player, team, submitted: 0 }
    }

    /// Flips submitted so far.
    #[must_use]
    pub const fn submitted(&self) -> u64 {
        self.submitted
    }
}

impl FlipAction for SimulatedFlipper {
    fn flip(&mut self, tile: Tile) -> ClientResult<()> {
        let notified = self.source.publish_tile(tile.flipped_to(self.player, self.team));
        self.submitted += 1;
        tracing::debug!("flip of {} published to {} subscribers", tile.key(), notified);
        Ok(())
    }
}
