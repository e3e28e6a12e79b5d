//! # Entity Source
//!
//! Interface to the indexer that serves the game contract's entities.
//! The engine needs exactly two things from it:
//!
//! - a one-shot bulk fetch at startup
//! - a filtered subscription that pushes every matching change
//!
//! ```text
//! ┌──────────────┐  fetch_all   ┌──────────────┐
//! │   Indexer    │ ───────────▶ │  FlipClient  │  (once, awaited)
//! │   (Source)   │  callback    │              │
//! │              │ ───────────▶ │  channel ──▶ frame loop
//! └──────────────┘              └──────────────┘
//! ```

mod simulated;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy_primitives::B256;

use crate::error::ChainResult;
use crate::records::{EntityRecord, ModelKind};

pub use simulated::SimulatedSource;

/// How a [`KeyPattern`]'s key list is compared to a record's keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PatternMode {
    /// Key count must match exactly.
    #[default]
    FixedLen,
    /// Pattern keys only constrain a prefix of the record's keys.
    VariableLen,
}

/// Subscription filter.
///
/// `None` in a key slot is a wildcard. An empty model list matches any model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyPattern {
    /// Models to accept.
    pub models: Vec<ModelKind>,
    /// Per-slot key constraints.
    pub keys: Vec<Option<B256>>,
    /// Slot comparison mode.
    pub mode: PatternMode,
}

impl KeyPattern {
    /// Matches every record of the given models, whatever its keys.
    #[must_use]
    pub fn models(models: &[ModelKind]) -> Self {
        Self {
            models: models.to_vec(),
            keys: Vec::new(),
            mode: PatternMode::VariableLen,
        }
    }

    /// Returns true if `record` passes this filter.
    #[must_use]
    pub fn matches(&self, record: &EntityRecord) -> bool {
        if !self.models.is_empty() && !self.models.contains(&record.model) {
            return false;
        }
        let length_ok = match self.mode {
            PatternMode::FixedLen => record.keys.len() == self.keys.len(),
            PatternMode::VariableLen => record.keys.len() >= self.keys.len(),
        };
        length_ok
            && self
                .keys
                .iter()
                .zip(&record.keys)
                .all(|(want, have)| want.map_or(true, |w| w == *have))
    }
}

/// What a subscription delivers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedEvent {
    /// A matching entity changed.
    Update {
        /// Entity hash, see [`EntityRecord::hashed_key`].
        hashed_key: B256,
        /// New state of the entity.
        record: EntityRecord,
    },
    /// The feed dropped; no more updates until resubscribed.
    Disconnected(String),
}

/// Callback invoked by the source for every [`FeedEvent`].
///
/// Sources may call it from their own thread, hence `Send`.
pub type UpdateCallback = Box<dyn FnMut(FeedEvent) + Send>;

/// Handle to a live subscription. Cancels on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// Creates a handle sharing `active` with the source's registry.
    #[must_use]
    pub fn new(id: u64, active: Arc<AtomicBool>) -> Self {
        Self { id, active }
    }

    /// Source-assigned id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// True until cancelled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stops delivery. The source prunes the callback on its next publish.
    pub fn cancel(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The entity indexer the client reads from.
pub trait EntitySource {
    /// Fetches every entity the indexer knows.
    fn fetch_all(&self) -> impl Future<Output = ChainResult<Vec<EntityRecord>>> + Send;

    /// Registers `callback` for every change matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot accept subscriptions.
    fn subscribe(&self, pattern: KeyPattern, callback: UpdateCallback) -> ChainResult<Subscription>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::u64_word;
    use flippyflop_shared::Tile;

    #[test]
    fn test_model_filter() {
        let tile = EntityRecord::from_tile(&Tile::unowned(1, 2));
        assert!(KeyPattern::models(&[ModelKind::Tile]).matches(&tile));
        assert!(!KeyPattern::models(&[ModelKind::User]).matches(&tile));
        assert!(KeyPattern::default().matches(&EntityRecord { keys: vec![], ..tile.clone() }));
    }

    #[test]
    fn test_fixed_len_slots() {
        let tile = EntityRecord::from_tile(&Tile::unowned(1, 2));
        let row_one = KeyPattern {
            models: vec![ModelKind::Tile],
            keys: vec![None, Some(u64_word(2))],
            mode: PatternMode::FixedLen,
        };
        assert!(row_one.matches(&tile));
        assert!(!row_one.matches(&EntityRecord::from_tile(&Tile::unowned(1, 3))));

        let too_short = KeyPattern { keys: vec![Some(u64_word(1))], ..row_one };
        assert!(!too_short.matches(&tile));
    }

    #[test]
    fn test_variable_len_prefix() {
        let column = KeyPattern {
            models: vec![],
            keys: vec![Some(u64_word(1))],
            mode: PatternMode::VariableLen,
        };
        assert!(column.matches(&EntityRecord::from_tile(&Tile::unowned(1, 9))));
        assert!(!column.matches(&EntityRecord::from_tile(&Tile::unowned(2, 9))));
    }

    #[test]
    fn test_subscription_cancel_on_drop() {
        let flag = Arc::new(AtomicBool::new(true));
        {
            let sub = Subscription::new(1, Arc::clone(&flag));
            assert!(sub.is_active());
        }
        assert!(!flag.load(Ordering::Acquire));
    }
}
