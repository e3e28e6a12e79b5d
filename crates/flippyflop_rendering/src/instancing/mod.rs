//! Instanced tile rendering.
//!
//! Every active chunk owns one [`InstanceBatch`] with a slot per tile.
//! The chunk manager rewrites the batches each frame and pushes the dirty
//! ones through a [`RenderBackend`].

mod backend;
mod buffer;
mod instance_data;

pub use backend::{HeadlessBackend, RenderBackend};
pub use buffer::InstanceBatch;
pub use instance_data::InstanceData;
