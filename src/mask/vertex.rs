//! Vertex type for light and shadow mask geometry

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// 2D vertex with position and color, laid out for direct buffer upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaskVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl MaskVertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    #[inline]
    pub fn at(p: Vec2, color: [f32; 4]) -> Self {
        Self::new(p.x, p.y, color)
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }
}

/// Raw bytes of a vertex slice
pub fn as_bytes(vertices: &[MaskVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Mask colors. Light is additive, shadows are subtracted.
pub mod colors {
    pub const PLAYER_LIGHT: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const GUARD_LIGHT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    /// Editor panorama of a patrolling guard
    pub const PATROL_LIGHT: [f32; 4] = [1.0, 1.0, 1.0, 0.5];
    pub const SHADOW: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const AMBIENT: [f32; 4] = [100.0 / 255.0, 100.0 / 255.0, 100.0 / 255.0, 1.0];
}
