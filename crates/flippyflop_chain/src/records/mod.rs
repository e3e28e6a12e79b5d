//! # Entity Records
//!
//! Wire records delivered by the game contract's entity indexer, and the
//! parser that validates them into typed [`Tile`]s and [`User`]s.
//!
//! ## Wire Layout
//!
//! Every record is a model tag plus two lists of 32-byte words:
//!
//! ```text
//! Tile:  keys   = [x, y]
//!        values = [address, powerup, powerup_value, team]
//! User:  keys   = [address]
//!        values = [team, name (short string)]
//! ```
//!
//! Integers are big-endian in the low bytes of their word. The address
//! word may carry packed flags in its high 12 bytes; they are masked off.
//! Nothing past this module ever sees an untyped record.

use alloy_primitives::{keccak256, Address, B256};
use flippyflop_shared::{mask_address, Powerup, Team, Tile};

use crate::error::{ChainError, ChainResult};

/// Model tag carried by every record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// A grid tile.
    Tile,
    /// A player account.
    User,
}

impl ModelKind {
    /// Tag string used by the indexer.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Tile => "flippyflop-Tile",
            Self::User => "flippyflop-User",
        }
    }

    /// Resolves an indexer tag.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::UnknownModel`] for tags this client does not track.
    pub fn from_tag(tag: &str) -> ChainResult<Self> {
        match tag {
            "flippyflop-Tile" => Ok(Self::Tile),
            "flippyflop-User" => Ok(Self::User),
            other => Err(ChainError::UnknownModel(other.to_string())),
        }
    }
}

/// A raw entity record, exactly as the source delivers it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityRecord {
    /// Model this record belongs to.
    pub model: ModelKind,
    /// Key words (identify the entity).
    pub keys: Vec<B256>,
    /// Value words (entity state).
    pub values: Vec<B256>,
}

impl EntityRecord {
    /// Hash identifying the entity: `keccak256(tag || keys)`.
    #[must_use]
    pub fn hashed_key(&self) -> B256 {
        let tag = self.model.tag().as_bytes();
        let mut buf = Vec::with_capacity(tag.len() + self.keys.len() * 32);
        buf.extend_from_slice(tag);
        for key in &self.keys {
            buf.extend_from_slice(key.as_slice());
        }
        keccak256(&buf)
    }

    /// Encodes a tile the way the indexer does.
    #[must_use]
    pub fn from_tile(tile: &Tile) -> Self {
        Self {
            model: ModelKind::Tile,
            keys: vec![u64_word(u64::from(tile.x)), u64_word(u64::from(tile.y))],
            values: vec![
                tile.address.into_word(),
                u64_word(tile.powerup as u64),
                u64_word(u64::from(tile.powerup_value)),
                u64_word(u64::from(tile.team.0)),
            ],
        }
    }

    /// Encodes a user the way the indexer does.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            model: ModelKind::User,
            keys: vec![user.address.into_word()],
            values: vec![u64_word(u64::from(user.team.0)), short_string_word(&user.name)],
        }
    }
}

/// A player account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// Masked account identifier.
    pub address: Address,
    /// Team the player joined.
    pub team: Team,
    /// Display name.
    pub name: String,
}

/// A validated record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedEntity {
    /// Tile update.
    Tile(Tile),
    /// User update.
    User(User),
}

/// Validates raw records against the world's geometry.
#[derive(Clone, Copy, Debug)]
pub struct RecordParser {
    world_size: u32,
    team_count: u8,
}

impl RecordParser {
    /// Creates a parser for a world of `world_size` tiles with `team_count` teams.
    #[must_use]
    pub const fn new(world_size: u32, team_count: u8) -> Self {
        Self { world_size, team_count }
    }

    /// Parses any record.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] describing the first validation failure.
    pub fn parse(&self, record: &EntityRecord) -> ChainResult<ParsedEntity> {
        match record.model {
            ModelKind::Tile => self.parse_tile(record).map(ParsedEntity::Tile),
            ModelKind::User => self.parse_user(record).map(ParsedEntity::User),
        }
    }

    /// Parses a tile record.
    ///
    /// # Errors
    ///
    /// Fails on wrong word counts, oversized integers, unknown powerups,
    /// out-of-range teams or coordinates outside the world.
    pub fn parse_tile(&self, record: &EntityRecord) -> ChainResult<Tile> {
        const MODEL: &str = "tile";
        expect_model(record, ModelKind::Tile, MODEL)?;
        expect_len(MODEL, "keys", &record.keys, 2)?;
        expect_len(MODEL, "values", &record.values, 4)?;

        let x = word_to_u64(MODEL, "x", &record.keys[0])?;
        let y = word_to_u64(MODEL, "y", &record.keys[1])?;
        let limit = u64::from(self.world_size);
        if x >= limit || y >= limit {
            return Err(ChainError::OutOfBounds { x, y, world_size: self.world_size });
        }

        let address = mask_address(record.values[0]);
        let powerup_raw = word_to_u64(MODEL, "powerup", &record.values[1])?;
        let powerup = u8::try_from(powerup_raw)
            .ok()
            .and_then(Powerup::from_u8)
            .ok_or_else(|| invalid(MODEL, format!("unknown powerup {powerup_raw}")))?;
        let powerup_value = u32::try_from(word_to_u64(MODEL, "powerup_value", &record.values[2])?)
            .map_err(|_| invalid(MODEL, "powerup_value exceeds u32".to_string()))?;
        let team = self.parse_team(MODEL, &record.values[3])?;

        Ok(Tile {
            x: x as u32,
            y: y as u32,
            address,
            team,
            powerup,
            powerup_value,
        })
    }

    /// Parses a user record.
    ///
    /// # Errors
    ///
    /// Fails on wrong word counts or out-of-range teams.
    pub fn parse_user(&self, record: &EntityRecord) -> ChainResult<User> {
        const MODEL: &str = "user";
        expect_model(record, ModelKind::User, MODEL)?;
        expect_len(MODEL, "keys", &record.keys, 1)?;
        expect_len(MODEL, "values", &record.values, 2)?;

        Ok(User {
            address: mask_address(record.keys[0]),
            team: self.parse_team(MODEL, &record.values[0])?,
            name: decode_short_string(&record.values[1]),
        })
    }

    fn parse_team(&self, model: &'static str, word: &B256) -> ChainResult<Team> {
        let raw = word_to_u64(model, "team", word)?;
        if raw >= u64::from(self.team_count) {
            return Err(invalid(model, format!("team {raw} >= {}", self.team_count)));
        }
        Ok(Team(raw as u8))
    }
}

/// Encodes an integer into the low 8 bytes of a word.
#[must_use]
pub fn u64_word(value: u64) -> B256 {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    B256::from(word)
}

/// Packs up to 31 ASCII bytes right-aligned into a word; longer names are cut.
#[must_use]
pub fn short_string_word(s: &str) -> B256 {
    let bytes = s.as_bytes();
    let len = bytes.len().min(31);
    let mut word = [0u8; 32];
    word[32 - len..].copy_from_slice(&bytes[..len]);
    B256::from(word)
}

fn decode_short_string(word: &B256) -> String {
    let start = word.iter().position(|b| *b != 0).unwrap_or(32);
    String::from_utf8_lossy(&word[start..]).into_owned()
}

fn word_to_u64(model: &'static str, field: &str, word: &B256) -> ChainResult<u64> {
    if word[..24].iter().any(|b| *b != 0) {
        return Err(invalid(model, format!("{field} does not fit in 64 bits")));
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(bytes))
}

fn expect_model(record: &EntityRecord, kind: ModelKind, model: &'static str) -> ChainResult<()> {
    if record.model == kind {
        Ok(())
    } else {
        Err(invalid(model, format!("got {} record", record.model.tag())))
    }
}

fn expect_len(model: &'static str, what: &str, words: &[B256], expected: usize) -> ChainResult<()> {
    if words.len() == expected {
        Ok(())
    } else {
        Err(invalid(model, format!("expected {expected} {what}, got {}", words.len())))
    }
}

fn invalid(model: &'static str, reason: String) -> ChainError {
    ChainError::InvalidRecord { model, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flippyflop_shared::{TEAM_COUNT, WORLD_SIZE};

    fn parser() -> RecordParser {
        RecordParser::new(WORLD_SIZE, TEAM_COUNT)
    }

    #[test]
    fn test_parse_owned_tile() {
        let owner = Address::left_padding_from(&[0x0A, 0xBC]);
        let tile = Tile {
            x: 5,
            y: 7,
            address: owner,
            team: Team(3),
            powerup: Powerup::Multiplier,
            powerup_value: 4,
        };
        let parsed = parser().parse(&EntityRecord::from_tile(&tile)).unwrap();
        assert_eq!(parsed, ParsedEntity::Tile(tile));
    }

    #[test]
    fn test_packed_address_bits_are_masked() {
        let mut record = EntityRecord::from_tile(&Tile::unowned(1, 1));
        let mut word = [0u8; 32];
        word[0] = 0x80; // flag bits only
        record.values[0] = B256::from(word);

        let tile = parser().parse_tile(&record).unwrap();
        assert!(!tile.is_owned());
    }

    #[test]
    fn test_rejects_out_of_world_tile() {
        let record = EntityRecord::from_tile(&Tile::unowned(WORLD_SIZE, 0));
        assert_eq!(
            parser().parse_tile(&record),
            Err(ChainError::OutOfBounds { x: u64::from(WORLD_SIZE), y: 0, world_size: WORLD_SIZE })
        );
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let mut record = EntityRecord::from_tile(&Tile::unowned(1, 1));
        record.values.pop();
        assert!(matches!(parser().parse_tile(&record), Err(ChainError::InvalidRecord { .. })));

        let mut record = EntityRecord::from_tile(&Tile::unowned(1, 1));
        record.values[1] = u64_word(42);
        assert!(matches!(parser().parse_tile(&record), Err(ChainError::InvalidRecord { .. })));

        let mut record = EntityRecord::from_tile(&Tile::unowned(1, 1));
        record.values[3] = u64_word(u64::from(TEAM_COUNT));
        assert!(matches!(parser().parse_tile(&record), Err(ChainError::InvalidRecord { .. })));
    }

    #[test]
    fn test_parse_user_name() {
        let user = User {
            address: Address::repeat_byte(0x11),
            team: Team(1),
            name: "flipper".to_string(),
        };
        let parsed = parser().parse(&EntityRecord::from_user(&user)).unwrap();
        assert_eq!(parsed, ParsedEntity::User(user));
    }

    #[test]
    fn test_hashed_key_depends_on_model_and_keys() {
        let a = EntityRecord::from_tile(&Tile::unowned(1, 2));
        let b = EntityRecord::from_tile(&Tile::unowned(2, 1));
        let mut owned = Tile::unowned(1, 2);
        owned.address = Address::repeat_byte(1);
        let c = EntityRecord::from_tile(&owned);
        assert_ne!(a.hashed_key(), b.hashed_key());
        assert_eq!(a.hashed_key(), c.hashed_key());
    }

    #[test]
    fn test_unknown_tag() {
        assert!(ModelKind::from_tag("flippyflop-Game").is_err());
        assert_eq!(ModelKind::from_tag("flippyflop-Tile").unwrap(), ModelKind::Tile);
    }
}
