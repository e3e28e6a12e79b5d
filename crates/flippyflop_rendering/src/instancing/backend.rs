//! Boundary to the external 3D engine.
//!
//! The engine owns meshes, materials and draw submission; this crate only
//! hands it per-chunk instance slices.

use std::collections::HashMap;

use flippyflop_shared::WorldChunkCoord;

use super::instance_data::InstanceData;
use crate::error::RenderResult;

/// Receives per-chunk instance batches.
pub trait RenderBackend {
    /// Replaces the instances drawn for `chunk`.
    ///
    /// # Errors
    ///
    /// Backend-specific upload failure.
    fn upload(&mut self, chunk: WorldChunkCoord, instances: &[InstanceData]) -> RenderResult<()>;

    /// Stops drawing `chunk` and frees its buffers.
    fn retire(&mut self, chunk: WorldChunkCoord);
}

/// Backend that keeps the latest upload per chunk in memory.
///
/// Used by the headless client and tests.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    batches: HashMap<WorldChunkCoord, Vec<InstanceData>>,
    uploads: u64,
    bytes_uploaded: u64,
    retired: u64,
}

impl HeadlessBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest instances for `chunk`.
    #[must_use]
    pub fn batch(&self, chunk: WorldChunkCoord) -> Option<&[InstanceData]> {
        self.batches.get(&chunk).map(Vec::as_slice)
    }

    /// Chunks currently drawn.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.batches.len()
    }

    /// Total uploads received.
    #[must_use]
    pub const fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Total instance bytes received, as a GPU buffer write would see them.
    #[must_use]
    pub const fn bytes_uploaded(&self) -> u64 {
        self.bytes_uploaded
    }

    /// Total chunks retired.
    #[must_use]
    pub const fn retired(&self) -> u64 {
        self.retired
    }
}

impl RenderBackend for HeadlessBackend {
    fn upload(&mut self, chunk: WorldChunkCoord, instances: &[InstanceData]) -> RenderResult<()> {
        let batch = self.batches.entry(chunk).or_default();
        batch.clear();
        batch.extend_from_slice(instances);
        self.uploads += 1;
        self.bytes_uploaded += bytemuck::cast_slice::<InstanceData, u8>(instances).len() as u64;
        Ok(())
    }

    fn retire(&mut self, chunk: WorldChunkCoord) {
        if self.batches.remove(&chunk).is_some() {
            self.retired += 1;
        }
    }
}
