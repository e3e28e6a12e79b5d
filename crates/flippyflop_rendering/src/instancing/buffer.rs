//! Per-chunk instance batch.
//!
//! Fixed-size staging buffer, one slot per tile. The core writes every
//! slot once per frame and marks the batch dirty; a successful upload
//! clears the flag.

use super::instance_data::InstanceData;

/// Staging buffer for one chunk's tiles.
#[derive(Debug, Clone)]
pub struct InstanceBatch {
    /// Slot `i` holds the tile at local index `i`.
    instances: Vec<InstanceData>,
    dirty: bool,
    uploads: u64,
}

impl InstanceBatch {
    /// Creates a batch with `capacity` default slots, dirty so the first
    /// frame uploads it.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            instances: vec![InstanceData::default(); capacity],
            dirty: true,
            uploads: 0,
        }
    }

    /// Rewrites every slot from `instances`, in slot order. Extra items are
    /// ignored; returns how many slots were written.
    pub fn write_all(&mut self, instances: impl IntoIterator<Item = InstanceData>) -> usize {
        let mut written = 0;
        for (slot, instance) in self.instances.iter_mut().zip(instances) {
            *slot = instance;
            written += 1;
        }
        if written > 0 {
            self.dirty = true;
        }
        written
    }

    /// Whether the batch changed since the last upload.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Slot count.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True for a zero-slot batch.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Slots, in local index order.
    #[inline]
    #[must_use]
    pub fn instances(&self) -> &[InstanceData] {
        &self.instances
    }

    /// Records a successful upload of the current slots.
    #[inline]
    pub fn mark_clean(&mut self) {
        self.dirty = false;
        self.uploads += 1;
    }

    /// Times this batch has been uploaded.
    #[inline]
    #[must_use]
    pub const fn uploads(&self) -> u64 {
        self.uploads
    }
}
