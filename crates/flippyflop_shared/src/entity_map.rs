//! # Sparse Entity Map
//!
//! Authoritative `TileKey -> Tile` cache fed by the entity source.
//! Holds every tile ever observed, not just the visible ones. Coordinates
//! never reported read back as the unowned default.

use std::collections::HashMap;

use crate::tile::{Tile, TileKey};

/// Sparse tile cache keyed by global coordinate.
#[derive(Clone, Debug, Default)]
pub struct EntityMap {
    tiles: HashMap<TileKey, Tile>,
}

impl EntityMap {
    /// Creates an empty map with room for `capacity` tiles.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { tiles: HashMap::with_capacity(capacity) }
    }

    /// Returns the stored tile, if the source ever reported one.
    #[inline]
    #[must_use]
    pub fn get(&self, key: TileKey) -> Option<&Tile> {
        self.tiles.get(&key)
    }

    /// Returns the stored tile or the unowned default for `key`.
    #[inline]
    #[must_use]
    pub fn tile_or_default(&self, key: TileKey) -> Tile {
        self.tiles
            .get(&key)
            .copied()
            .unwrap_or_else(|| Tile::unowned(key.x, key.y))
    }

    /// Inserts or replaces a tile, returning the previous value.
    pub fn insert(&mut self, tile: Tile) -> Option<Tile> {
        self.tiles.insert(tile.key(), tile)
    }

    /// Number of tiles observed so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True if nothing has been observed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterates over every observed tile in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Count of tiles currently owned by a player.
    #[must_use]
    pub fn owned_count(&self) -> usize {
        self.tiles.values().filter(|t| t.is_owned()).count()
    }
}

impl Extend<Tile> for EntityMap {
    fn extend<I: IntoIterator<Item = Tile>>(&mut self, iter: I) {
        for tile in iter {
            self.insert(tile);
        }
    }
}

impl FromIterator<Tile> for EntityMap {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}
