//! Authoritative tile data.
//!
//! A [`Tile`] is what the game contract says about one cell of the grid.
//! It is distinct from the renderer's per-slot animation record.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Owner sentinel for tiles nobody (or only the robot) has claimed.
pub const UNOWNED: Address = Address::ZERO;

/// Masks a packed 32-byte account word down to its 20-byte identifier.
///
/// The contract packs flags into the high 12 bytes of the address word;
/// only the low 20 bytes identify the account.
#[inline]
#[must_use]
pub fn mask_address(word: B256) -> Address {
    Address::from_slice(&word[12..32])
}

/// Team index, `0..TEAM_COUNT`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Team(pub u8);

impl Team {
    /// Index into a team palette.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Cosmetic/score modifier attached to a tile.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Powerup {
    /// No powerup.
    #[default]
    None = 0,
    /// Score multiplier; magnitude lives in `Tile::powerup_value`.
    Multiplier = 1,
}

impl Powerup {
    /// Decodes the on-chain discriminant.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Multiplier),
            _ => None,
        }
    }

    /// Returns true for anything other than [`Powerup::None`].
    #[inline]
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Global tile coordinate key.
///
/// Formats as `"x,y"`, the key shape the entity source uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    /// Global X, `0..WORLD_SIZE`.
    pub x: u32,
    /// Global Y, `0..WORLD_SIZE`.
    pub y: u32,
}

impl TileKey {
    /// Creates a key.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Failure to parse a `"x,y"` key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed tile key: {0:?}")]
pub struct TileKeyParseError(pub String);

impl FromStr for TileKey {
    type Err = TileKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TileKeyParseError(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(err)?;
        let x = x.trim().parse().map_err(|_| err())?;
        let y = y.trim().parse().map_err(|_| err())?;
        Ok(Self { x, y })
    }
}

/// One cell of the world, as reported by the game contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Global X.
    pub x: u32,
    /// Global Y.
    pub y: u32,
    /// Masked owner identifier, or [`UNOWNED`].
    pub address: Address,
    /// Owning team. Meaningless while unowned.
    pub team: Team,
    /// Attached powerup.
    pub powerup: Powerup,
    /// Powerup magnitude (multiplier factor).
    pub powerup_value: u32,
}

impl Tile {
    /// The default tile for a coordinate nobody has reported yet.
    #[inline]
    #[must_use]
    pub const fn unowned(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            address: UNOWNED,
            team: Team(0),
            powerup: Powerup::None,
            powerup_value: 0,
        }
    }

    /// Coordinate key.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> TileKey {
        TileKey::new(self.x, self.y)
    }

    /// True when a player holds the tile.
    #[inline]
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.address != UNOWNED
    }

    /// Returns a copy owned by `address` on `team`.
    #[must_use]
    pub fn flipped_to(mut self, address: Address, team: Team) -> Self {
        self.address = address;
        self.team = team;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_and_parse() {
        let key = TileKey::new(12, 199);
        assert_eq!(key.to_string(), "12,199");
        assert_eq!("12,199".parse::<TileKey>().unwrap(), key);
        assert_eq!(" 3 , 4 ".parse::<TileKey>().unwrap(), TileKey::new(3, 4));
    }

    #[test]
    fn test_key_parse_rejects_garbage() {
        assert!("12".parse::<TileKey>().is_err());
        assert!("a,b".parse::<TileKey>().is_err());
        assert!("-1,2".parse::<TileKey>().is_err());
    }

    #[test]
    fn test_unowned_default() {
        let tile = Tile::unowned(5, 6);
        assert!(!tile.is_owned());
        assert_eq!(tile.powerup, Powerup::None);
        assert_eq!(tile.key(), TileKey::new(5, 6));
    }

    #[test]
    fn test_mask_address_drops_packed_bits() {
        let mut word = [0u8; 32];
        word[0] = 0xFF; // packed flag bits
        word[31] = 0xBC;
        word[30] = 0x0A;
        let address = mask_address(B256::from(word));
        assert_eq!(address, Address::left_padding_from(&[0x0A, 0xBC]));
    }

    #[test]
    fn test_powerup_decode() {
        assert_eq!(Powerup::from_u8(1), Some(Powerup::Multiplier));
        assert_eq!(Powerup::from_u8(9), None);
        assert!(!Powerup::None.is_active());
    }
}
