//! Instance data structures for GPU upload.

use bytemuck::{Pod, Zeroable};

use crate::animation::TileState;
use crate::palette::Color;

/// Per-tile data sent to the GPU.
///
/// Consumed by the tile vertex shader: a column-major model matrix
/// followed by the tile color. 16-byte rows, no padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Column-major model matrix.
    pub transform: [[f32; 4]; 4],
    /// RGBA color.
    pub color: Color,
}

impl InstanceData {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Translation followed by a rotation of `angle` radians about X.
    #[must_use]
    pub fn from_parts(x: f32, y: f32, z: f32, angle: f32, color: Color) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            transform: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [x, y, z, 1.0],
            ],
            color,
        }
    }

    /// Instance for a tile's current animation state.
    #[inline]
    #[must_use]
    pub fn from_state(state: &TileState) -> Self {
        let p = state.position();
        Self::from_parts(p.x, p.y, p.z, state.rotation(), state.color())
    }

    /// Translation column.
    #[inline]
    #[must_use]
    pub const fn translation(&self) -> [f32; 3] {
        let t = self.transform[3];
        [t[0], t[1], t[2]]
    }
}

impl Default for InstanceData {
    fn default() -> Self {
        Self::from_parts(0.0, 0.0, 0.0, 0.0, [1.0; 4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_instance_data_size() {
        // Matrix (64) + color (16)
        assert_eq!(InstanceData::SIZE, 80);
        assert_eq!(std::mem::align_of::<InstanceData>(), 4);
    }

    #[test]
    fn test_flipped_tile_faces_down() {
        let instance = InstanceData::from_parts(1.0, 2.0, 3.0, PI, [1.0; 4]);
        assert_eq!(instance.translation(), [1.0, 2.0, 3.0]);
        // Local +Y maps to world -Y.
        assert!((instance.transform[1][1] + 1.0).abs() < 1e-6);
    }
}
