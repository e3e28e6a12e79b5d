//! In-memory entity source for tests, benches and the headless demo.
//!
//! Behaves like the indexer: keeps the latest record per entity, answers
//! bulk fetches from that store, and pushes matching changes to every live
//! subscriber.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy_primitives::B256;
use flippyflop_shared::Tile;
use parking_lot::Mutex;

use super::{EntitySource, FeedEvent, KeyPattern, Subscription, UpdateCallback};
use crate::error::{ChainError, ChainResult};
use crate::records::{EntityRecord, User};

struct Subscriber {
    pattern: KeyPattern,
    callback: UpdateCallback,
    active: Arc<AtomicBool>,
}

#[derive(Default)]
struct SourceState {
    records: HashMap<B256, EntityRecord>,
    subscribers: Vec<Subscriber>,
    next_id: u64,
    offline: bool,
}

/// Simulated indexer. Cheap to clone; clones share one store.
#[derive(Clone, Default)]
pub struct SimulatedSource {
    state: Arc<Mutex<SourceState>>,
}

impl SimulatedSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source pre-populated with `tiles`.
    #[must_use]
    pub fn with_tiles(tiles: impl IntoIterator<Item = Tile>) -> Self {
        let source = Self::new();
        {
            let mut state = source.state.lock();
            for tile in tiles {
                let record = EntityRecord::from_tile(&tile);
                state.records.insert(record.hashed_key(), record);
            }
        }
        source
    }

    /// Stores `record` and notifies matching subscribers.
    ///
    /// Returns the number of subscribers notified.
    pub fn publish(&self, record: EntityRecord) -> usize {
        let hashed_key = record.hashed_key();
        let mut state = self.state.lock();
        state.records.insert(hashed_key, record.clone());
        state.subscribers.retain(|s| s.active.load(Ordering::Acquire));

        let mut notified = 0;
        for subscriber in &mut state.subscribers {
            if subscriber.pattern.matches(&record) {
                (subscriber.callback)(FeedEvent::Update { hashed_key, record: record.clone() });
                notified += 1;
            }
        }
        notified
    }

    /// Publishes a tile update.
    pub fn publish_tile(&self, tile: Tile) -> usize {
        self.publish(EntityRecord::from_tile(&tile))
    }

    /// Publishes a user update.
    pub fn publish_user(&self, user: &User) -> usize {
        self.publish(EntityRecord::from_user(user))
    }

    /// Drops every subscription with a disconnect notice and refuses
    /// further fetches until [`SimulatedSource::reconnect`].
    pub fn disconnect(&self, reason: &str) {
        let mut state = self.state.lock();
        state.offline = true;
        for mut subscriber in state.subscribers.drain(..) {
            if subscriber.active.load(Ordering::Acquire) {
                (subscriber.callback)(FeedEvent::Disconnected(reason.to_string()));
            }
            subscriber.active.store(false, Ordering::Release);
        }
    }

    /// Brings the source back online.
    pub fn reconnect(&self) {
        self.state.lock().offline = false;
    }

    /// Live subscriber count.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state
            .lock()
            .subscribers
            .iter()
            .filter(|s| s.active.load(Ordering::Acquire))
            .count()
    }
}

impl EntitySource for SimulatedSource {
    fn fetch_all(&self) -> impl Future<Output = ChainResult<Vec<EntityRecord>>> + Send {
        let result = {
            let state = self.state.lock();
            if state.offline {
                Err(ChainError::Fetch("source offline".to_string()))
            } else {
                Ok(state.records.values().cloned().collect())
            }
        };
        async move { result }
    }

    fn subscribe(&self, pattern: KeyPattern, callback: UpdateCallback) -> ChainResult<Subscription> {
        let mut state = self.state.lock();
        if state.offline {
            return Err(ChainError::Disconnected("source offline".to_string()));
        }
        state.next_id += 1;
        let id = state.next_id;
        let active = Arc::new(AtomicBool::new(true));
        state.subscribers.push(Subscriber {
            pattern,
            callback,
            active: Arc::clone(&active),
        });
        tracing::debug!("subscription {} registered", id);
        Ok(Subscription::new(id, active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ModelKind;
    use alloy_primitives::Address;
    use crossbeam_channel::unbounded;
    use flippyflop_shared::Team;

    fn channel_callback() -> (UpdateCallback, crossbeam_channel::Receiver<FeedEvent>) {
        let (tx, rx) = unbounded();
        let callback: UpdateCallback = Box::new(move |event| {
            let _ = tx.send(event);
        });
        (callback, rx)
    }

    #[tokio::test]
    async fn test_fetch_returns_latest_per_entity() {
        let source = SimulatedSource::with_tiles([Tile::unowned(1, 1), Tile::unowned(2, 2)]);
        source.publish_tile(Tile::unowned(1, 1).flipped_to(Address::repeat_byte(3), Team(1)));

        let records = source.fetch_all().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_publish_respects_pattern() {
        let source = SimulatedSource::new();
        let (callback, rx) = channel_callback();
        let _sub = source
            .subscribe(KeyPattern::models(&[ModelKind::User]), callback)
            .unwrap();

        assert_eq!(source.publish_tile(Tile::unowned(0, 0)), 0);
        let user = User { address: Address::repeat_byte(9), team: Team(0), name: "x".into() };
        assert_eq!(source.publish_user(&user), 1);
        assert!(matches!(rx.try_recv(), Ok(FeedEvent::Update { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_cancelled_subscription_is_pruned() {
        let source = SimulatedSource::new();
        let (callback, rx) = channel_callback();
        let sub = source.subscribe(KeyPattern::default(), callback).unwrap();
        sub.cancel();

        assert_eq!(source.publish_tile(Tile::unowned(0, 0)), 0);
        assert_eq!(source.subscriber_count(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_notifies_and_goes_offline() {
        let source = SimulatedSource::new();
        let (callback, rx) = channel_callback();
        let sub = source.subscribe(KeyPattern::default(), callback).unwrap();

        source.disconnect("node restarted");
        assert_eq!(rx.try_recv().unwrap(), FeedEvent::Disconnected("node restarted".into()));
        assert!(!sub.is_active());
        assert!(source.fetch_all().await.is_err());

        source.reconnect();
        assert!(source.fetch_all().await.is_ok());
    }
}
