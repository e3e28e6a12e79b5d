//! # Chain-Synced State
//!
//! Client-side mirror of the game contract: the sparse tile map plus
//! the user registry. Tiles only change here through the reconciler's
//! batched flush; users are small and applied as they arrive.

use std::collections::HashMap;

use alloy_primitives::Address;
use flippyflop_shared::{EntityMap, Team};

use crate::records::{EntityRecord, ParsedEntity, RecordParser, User};

/// Tiles and users as last reported by the source.
pub struct ChainSyncedState {
    /// Tile cache, superset of everything ever observed.
    tiles: EntityMap,
    /// Users indexed by masked address.
    users: HashMap<Address, User>,
    /// Records applied since creation.
    updates_processed: u64,
}

impl ChainSyncedState {
    /// Creates state with pre-allocated capacity.
    ///
    /// # Arguments
    ///
    /// * `tile_capacity` - Expected number of observed tiles
    /// * `user_capacity` - Expected number of players
    #[must_use]
    pub fn new(tile_capacity: usize, user_capacity: usize) -> Self {
        Self {
            tiles: EntityMap::with_capacity(tile_capacity),
            users: HashMap::with_capacity(user_capacity),
            updates_processed: 0,
        }
    }

    /// The tile map.
    #[inline]
    #[must_use]
    pub fn tiles(&self) -> &EntityMap {
        &self.tiles
    }

    /// Mutable tile map, for the reconciler's flush.
    #[inline]
    pub fn tiles_mut(&mut self) -> &mut EntityMap {
        &mut self.tiles
    }

    /// Looks up a user.
    #[inline]
    #[must_use]
    pub fn user(&self, address: &Address) -> Option<&User> {
        self.users.get(address)
    }

    /// Team of the given player, if registered.
    #[must_use]
    pub fn team_of(&self, address: &Address) -> Option<Team> {
        self.users.get(address).map(|u| u.team)
    }

    /// Number of registered users.
    #[inline]
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Records applied so far.
    #[inline]
    #[must_use]
    pub const fn updates_processed(&self) -> u64 {
        self.updates_processed
    }

    /// Inserts or replaces a user.
    pub fn apply_user(&mut self, user: User) {
        self.users.insert(user.address, user);
        self.updates_processed += 1;
    }

    /// Seeds state from a bulk fetch.
    ///
    /// Invalid records are skipped with a warning; returns how many were kept.
    pub fn seed(&mut self, parser: &RecordParser, records: &[EntityRecord]) -> usize {
        let mut applied = 0;
        for record in records {
            match parser.parse(record) {
                Ok(ParsedEntity::Tile(tile)) => {
                    self.tiles.insert(tile);
                }
                Ok(ParsedEntity::User(user)) => {
                    self.users.insert(user.address, user);
                }
                Err(err) => {
                    tracing::warn!("skipping record during seed: {}", err);
                    continue;
                }
            }
            applied += 1;
        }
        self.updates_processed += applied as u64;
        applied
    }
}

impl Default for ChainSyncedState {
    fn default() -> Self {
        // Full default world is 40k tiles
        Self::new(40_000, 1_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::u64_word;
    use flippyflop_shared::{Tile, TileKey, TEAM_COUNT, WORLD_SIZE};

    fn parser() -> RecordParser {
        RecordParser::new(WORLD_SIZE, TEAM_COUNT)
    }

    #[test]
    fn test_state_creation() {
        let state = ChainSyncedState::new(16, 4);
        assert!(state.tiles().is_empty());
        assert_eq!(state.user_count(), 0);
        assert_eq!(state.updates_processed(), 0);
    }

    #[test]
    fn test_seed_skips_invalid_records() {
        let owner = Address::repeat_byte(4);
        let mut bad = EntityRecord::from_tile(&Tile::unowned(3, 3));
        bad.values[1] = u64_word(77);
        let records = vec![
            EntityRecord::from_tile(&Tile::unowned(1, 1).flipped_to(owner, Team(2))),
            bad,
            EntityRecord::from_user(&User { address: owner, team: Team(2), name: "ada".into() }),
        ];

        let mut state = ChainSyncedState::default();
        assert_eq!(state.seed(&parser(), &records), 2);
        assert_eq!(state.tiles().len(), 1);
        assert!(state.tiles().tile_or_default(TileKey::new(1, 1)).is_owned());
        assert_eq!(state.team_of(&owner), Some(Team(2)));
    }
}
