//! # FlipClient
//!
//! The per-frame orchestration:
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. ADVANCE CLOCK                                                    │
//! │ 2. DRAIN FEED                                                       │
//! │    ├─ tile records  → TileReconciler (debounced)                    │
//! │    ├─ user records  → ChainSyncedState                              │
//! │    └─ disconnect    → Notification                                  │
//! │ 3. POLL RECONCILER                                                  │
//! │    └─ on flush: EntityMap → ChunkManager::on_entity_map_changed     │
//! │ 4. ADVANCE ANIMATIONS + WRITE BATCHES                               │
//! │ 5. UPLOAD DIRTY BATCHES → RenderBackend                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The source's callback may fire on any thread; it only forwards into a
//! channel. Everything else runs on the caller's loop.

use std::convert::Infallible;

use alloy_primitives::Address;
use crossbeam_channel::{unbounded, Receiver};

use flippyflop_chain::{
    ChainSyncedState, EntitySource, FeedEvent, KeyPattern, ModelKind, ParsedEntity, RecordParser, Subscription,
    TileReconciler, UpdateCallback,
};
use flippyflop_rendering::{ChunkManager, RecomputeSummary, RenderBackend, ScoreIndicator};
use flippyflop_shared::{Tile, Vec3};

use crate::action::FlipAction;
use crate::config::GameConfig;
use crate::error::ClientResult;

/// Something the UI should tell the player about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The subscription dropped. The board is frozen at its last state.
    Disconnected(String),
}

/// What one frame did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Clock after the frame.
    pub clock: f64,
    /// Tiles applied by a flush this frame, if one ran.
    pub flushed: Option<usize>,
    /// Chunk batches uploaded.
    pub uploaded: usize,
}

/// Client counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Frames run.
    pub frames: u64,
    /// Feed events received.
    pub events_received: u64,
    /// Feed records dropped as malformed.
    pub records_rejected: u64,
    /// Clicks forwarded to the flip action.
    pub flips_requested: u64,
    /// Clicks ignored because the tile was owned or off-board.
    pub clicks_ignored: u64,
}

/// The game client: synced state, reconciler, chunks and backend.
pub struct FlipClient<B: RenderBackend> {
    parser: RecordParser,
    state: ChainSyncedState,
    reconciler: TileReconciler,
    chunks: ChunkManager,
    backend: B,
    feed: Receiver<FeedEvent>,
    subscription: Option<Subscription>,
    clock: f64,
    local_player: Option<Address>,
    notifications: Vec<Notification>,
    stats: ClientStats,
}

impl<B: RenderBackend> FlipClient<B> {
    /// Subscribes to `source`, seeds state from one bulk fetch and
    /// materializes the chunks around the origin.
    ///
    /// The subscription is opened before the fetch so nothing published in
    /// between is lost; those updates replay on top of the snapshot.
    ///
    /// # Errors
    ///
    /// Invalid config, a refused subscription or a failed fetch.
    pub async fn connect<S: EntitySource>(
        source: &S,
        config: GameConfig,
        backend: B,
        local_player: Option<Address>,
    ) -> ClientResult<Self> {
        config.validate()?;
        let dims = config.dims()?;
        let palette = config.palette()?;
        let parser = RecordParser::new(dims.world_size(), config.teams.count);

        let (tx, feed) = unbounded();
        let callback: UpdateCallback = Box::new(move |event| {
            if tx.send(event).is_err() {
                tracing::trace!("feed receiver gone, dropping event");
            }
        });
        let subscription = source.subscribe(KeyPattern::models(&[ModelKind::Tile, ModelKind::User]), callback)?;

        let records = source.fetch_all().await?;
        let tile_capacity = (dims.world_size() as usize).pow(2);
        let mut state = ChainSyncedState::new(tile_capacity, 1_000);
        let seeded = state.seed(&parser, &records);
        tracing::info!(
            "bootstrap: {} of {} records seeded, {} tiles, {} users",
            seeded,
            records.len(),
            state.tiles().len(),
            state.user_count()
        );

        let mut chunks = ChunkManager::new(dims, config.render.clone(), config.animation.clone(), palette);
        chunks.set_local_player(local_player);
        chunks.update_camera(Vec3::ZERO, state.tiles());

        Ok(Self {
            parser,
            state,
            reconciler: TileReconciler::new(config.reconciler.debounce_window),
            chunks,
            backend,
            feed,
            subscription: Some(subscription),
            clock: 0.0,
            local_player,
            notifications: Vec::new(),
            stats: ClientStats::default(),
        })
    }

    /// Runs one frame of `dt` seconds.
    ///
    /// # Errors
    ///
    /// [`crate::ClientError::Render`] if the backend refuses an upload.
    pub fn frame(&mut self, dt: f32) -> ClientResult<FrameReport> {
        self.clock += f64::from(dt);
        self.drain_feed();

        let clock = self.clock;
        let chunks = &mut self.chunks;
        let flushed = match self.reconciler.poll(clock, self.state.tiles_mut(), |map| {
            chunks.on_entity_map_changed(map, clock);
            Ok::<(), Infallible>(())
        }) {
            Ok(report) => report.map(|r| r.tiles),
            Err(never) => match never {},
        };
        if let Some(tiles) = flushed {
            tracing::info!("flushed {} tiles at t={:.3}", tiles, clock);
        }

        self.chunks.advance(dt, clock);
        let uploaded = self.chunks.upload(&mut self.backend)?;
        self.stats.frames += 1;

        Ok(FrameReport { clock, flushed, uploaded })
    }

    fn drain_feed(&mut self) {
        while let Ok(event) = self.feed.try_recv() {
            self.stats.events_received += 1;
            match event {
                FeedEvent::Update { record, .. } => match self.parser.parse(&record) {
                    Ok(ParsedEntity::Tile(tile)) => self.reconciler.push(tile, self.clock),
                    Ok(ParsedEntity::User(user)) => {
                        tracing::debug!("user {} joined team {}", user.name, user.team.0);
                        self.state.apply_user(user);
                    }
                    Err(err) => {
                        self.stats.records_rejected += 1;
                        tracing::warn!("dropping feed record: {}", err);
                    }
                },
                FeedEvent::Disconnected(reason) => {
                    tracing::warn!("entity feed disconnected: {}", reason);
                    self.subscription = None;
                    self.notifications.push(Notification::Disconnected(reason));
                }
            }
        }
    }

    /// Moves the camera; recomputes visible chunks past the threshold.
    pub fn set_camera(&mut self, position: Vec3) -> Option<RecomputeSummary> {
        self.chunks.update_camera(position, self.state.tiles())
    }

    /// Moves the pointer's ground-plane hit, or clears it.
    pub fn set_pointer(&mut self, point: Option<(f32, f32)>) {
        self.chunks.set_pointer(point);
    }

    /// Clicks the ground at `(x, z)`. Unowned tiles go to `action`; owned
    /// or off-board clicks are ignored.
    ///
    /// Returns the tile submitted, if any.
    ///
    /// # Errors
    ///
    /// Passes through the action's error.
    pub fn click<A: FlipAction>(&mut self, x: f32, z: f32, action: &mut A) -> ClientResult<Option<Tile>> {
        let Some(tile) = self.chunks.click(x, z) else {
            self.stats.clicks_ignored += 1;
            return Ok(None);
        };
        action.flip(tile)?;
        self.stats.flips_requested += 1;
        Ok(Some(tile))
    }

    /// Drains pending notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Drains pending "+1" indicators.
    pub fn take_score_indicators(&mut self) -> Vec<ScoreIndicator> {
        self.chunks.take_score_indicators()
    }

    /// Cancels the subscription and any pending flush. Queued feed events
    /// are discarded. The board keeps its current state.
    pub fn unsubscribe(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        let dropped = self.feed.try_iter().count();
        let discarded = self.reconciler.cancel();
        tracing::info!("unsubscribed: {} buffered and {} queued updates discarded", discarded, dropped);
    }

    /// Whether the feed is live.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// Simulation clock, seconds since connect.
    #[inline]
    #[must_use]
    pub const fn clock(&self) -> f64 {
        self.clock
    }

    /// The local player.
    #[inline]
    #[must_use]
    pub const fn local_player(&self) -> Option<Address> {
        self.local_player
    }

    /// Synced chain state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &ChainSyncedState {
        &self.state
    }

    /// The reconciler.
    #[inline]
    #[must_use]
    pub fn reconciler(&self) -> &TileReconciler {
        &self.reconciler
    }

    /// Chunk manager.
    #[inline]
    #[must_use]
    pub fn chunks(&self) -> &ChunkManager {
        &self.chunks
    }

    /// Render backend.
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> ClientStats {
        self.stats
    }
}
