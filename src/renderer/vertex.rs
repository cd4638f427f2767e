//! Vertex type handed to the presentation layer

use bytemuck::{Pod, Zeroable};

/// 2D vertex with position and color, laid out for direct buffer upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    /// Byte stride between consecutive vertices
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
    /// Byte offset of `color` within a vertex
    pub const COLOR_OFFSET: usize = std::mem::size_of::<[f32; 2]>();

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Reinterpret vertices as raw bytes for upload
pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Colors for hole elements
pub mod colors {
    pub const TERRAIN: [f32; 4] = [0.25, 0.55, 0.25, 1.0];
    pub const BALL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}
