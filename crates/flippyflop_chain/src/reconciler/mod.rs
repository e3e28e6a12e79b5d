//! # Tile Reconciler
//!
//! Debounced bridge between the subscription feed and the entity map.
//!
//! ```text
//! update ─┐
//! update ─┼─▶ buffer (last write wins) ──[debounce]──▶ EntityMap ──▶ observer
//! update ─┘        first entry arms the deadline        one batch      once
//! ```
//!
//! The deadline is the only serialization point: at most one flush is
//! pending, and a burst inside the window lands as a single map update.
//! Time is the client's simulation clock in seconds, so tests drive it
//! directly.

use std::collections::HashMap;

use flippyflop_shared::{EntityMap, Tile, TileKey};

/// Flush counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerStats {
    /// Updates accepted into the buffer.
    pub updates_buffered: u64,
    /// Updates that replaced a buffered entry for the same key.
    pub updates_coalesced: u64,
    /// Flushes performed.
    pub flushes: u64,
    /// Tiles written to the map across all flushes.
    pub tiles_applied: u64,
    /// Flushes whose observer reported an error.
    pub failed_flushes: u64,
    /// Updates thrown away by [`TileReconciler::cancel`].
    pub updates_discarded: u64,
}

/// Summary of one flush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlushReport {
    /// Distinct tiles written.
    pub tiles: usize,
    /// Clock time the flush ran at.
    pub flushed_at: f64,
}

/// Coalescing, debounced tile update buffer.
#[derive(Debug)]
pub struct TileReconciler {
    buffer: HashMap<TileKey, Tile>,
    flush_at: Option<f64>,
    debounce: f64,
    stats: ReconcilerStats,
}

impl TileReconciler {
    /// Creates a reconciler with a `debounce` window in seconds.
    #[must_use]
    pub fn new(debounce: f64) -> Self {
        Self {
            buffer: HashMap::with_capacity(256),
            flush_at: None,
            debounce: debounce.max(0.0),
            stats: ReconcilerStats::default(),
        }
    }

    /// Buffers an update. The first entry after a flush arms the deadline;
    /// later ones ride along without pushing it back.
    pub fn push(&mut self, tile: Tile, now: f64) {
        if self.buffer.insert(tile.key(), tile).is_some() {
            self.stats.updates_coalesced += 1;
        }
        self.stats.updates_buffered += 1;
        if self.flush_at.is_none() {
            self.flush_at = Some(now + self.debounce);
        }
    }

    /// Buffered tiles awaiting the flush.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// When the pending flush fires, if one is armed.
    #[inline]
    #[must_use]
    pub const fn flush_deadline(&self) -> Option<f64> {
        self.flush_at
    }

    /// Counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> ReconcilerStats {
        self.stats
    }

    /// Flushes if the deadline has passed.
    ///
    /// Writes the whole buffer into `map`, disarms, then calls `on_flush`
    /// exactly once with the updated map. The buffer is already empty when
    /// `on_flush` runs, so a failing observer cannot wedge the reconciler.
    ///
    /// Returns `Ok(None)` when nothing was due.
    ///
    /// # Errors
    ///
    /// Passes through the observer's error.
    pub fn poll<F, E>(&mut self, now: f64, map: &mut EntityMap, on_flush: F) -> Result<Option<FlushReport>, E>
    where
        F: FnOnce(&EntityMap) -> Result<(), E>,
        E: std::fmt::Display,
    {
        match self.flush_at {
            Some(deadline) if now >= deadline => {}
            _ => return Ok(None),
        }

        self.flush_at = None;
        let tiles = self.buffer.len();
        map.extend(self.buffer.drain().map(|(_, tile)| tile));
        self.stats.flushes += 1;
        self.stats.tiles_applied += tiles as u64;

        if let Err(err) = on_flush(map) {
            self.stats.failed_flushes += 1;
            tracing::warn!("tile flush of {} tiles failed downstream: {}", tiles, err);
            return Err(err);
        }

        tracing::debug!("flushed {} tiles into entity map", tiles);
        Ok(Some(FlushReport { tiles, flushed_at: now }))
    }

    /// Drops the buffer and disarms the deadline. Returns how many tiles
    /// were discarded.
    pub fn cancel(&mut self) -> usize {
        let discarded = self.buffer.len();
        self.buffer.clear();
        self.flush_at = None;
        self.stats.updates_discarded += discarded as u64;
        discarded
    }
}

impl Default for TileReconciler {
    fn default() -> Self {
        Self::new(flippyflop_shared::constants::DEBOUNCE_WINDOW)
    }
}
