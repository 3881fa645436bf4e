//! CPU-side geometry for the viewer's single polygon mesh.
//!
//! The mesh is fixed at startup: one vertex table shared by two index
//! lists, one assembling filled triangles for the body and one assembling
//! line segments for the edge overlay.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// A 2D mesh vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec2,
}

impl Vertex {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
        }
    }

    /// Vertex buffer layout: two tightly packed f32s at attribute location 0.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// The polygon rendered by the viewer: a shared vertex table plus one
/// index list per draw style.
///
/// Indices are u32 to match [`wgpu::IndexFormat::Uint32`].
#[derive(Debug, Clone)]
pub struct PolygonMesh {
    pub vertices: Vec<Vertex>,
    /// Triangle-list indices for the solid body.
    pub fill_indices: Vec<u32>,
    /// Line-list indices for the edge overlay.
    pub outline_indices: Vec<u32>,
}

impl PolygonMesh {
    /// The fixed demo shape: 16 vertices, 9 fill triangles, 20 outline
    /// segments.
    pub fn demo_shape() -> Self {
        let vertices = vec![
            Vertex::new(-0.4, 0.6),
            Vertex::new(-0.2, 0.6),
            Vertex::new(-0.05, 0.75),
            Vertex::new(0.25, 0.75),
            Vertex::new(0.1, 0.6),
            Vertex::new(-0.4, 0.4),
            Vertex::new(-0.20, 0.4),
            Vertex::new(0.20, 0.00),
            Vertex::new(-0.2, 0.15),
            Vertex::new(-0.35, 0.00),
            Vertex::new(-0.20, 0.00),
            Vertex::new(-0.20, -0.15),
            Vertex::new(0.00, -0.2),
            Vertex::new(0.2, -0.4),
            Vertex::new(-0.2, -0.4),
            Vertex::new(-0.2, -0.2),
        ];

        #[rustfmt::skip]
        let fill_indices = vec![
            0, 5, 6,
            0, 1, 6,
            1, 2, 4,
            3, 2, 4,
            6, 10, 7,
            8, 9, 11,
            10, 7, 13,
            12, 13, 14,
            14, 15, 12,
        ];

        #[rustfmt::skip]
        let outline_indices = vec![
            0, 1,
            0, 5,
            5, 6,
            1, 6,
            1, 2,
            2, 3,
            3, 4,
            1, 4,
            6, 7,
            7, 10,
            6, 10,
            8, 9,
            9, 11,
            10, 11,
            10, 13,
            13, 14,
            12, 14,
            14, 15,
            12, 15,
            7, 13,
        ];

        Self {
            vertices,
            fill_indices,
            outline_indices,
        }
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn fill_index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.fill_indices)
    }

    pub fn outline_index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.outline_indices)
    }

    /// Every index must reference an existing vertex.
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.vertices.len() as u32;
        self.fill_indices.iter().all(|&i| i < count)
            && self.outline_indices.iter().all(|&i| i < count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_shape_counts() {
        let mesh = PolygonMesh::demo_shape();
        assert_eq!(mesh.vertices.len(), 16);
        assert_eq!(mesh.fill_indices.len(), 27);
        assert_eq!(mesh.outline_indices.len(), 40);
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = PolygonMesh::demo_shape();
        assert!(mesh.indices_in_bounds());
    }

    #[test]
    fn test_out_of_bounds_index_detected() {
        let mut mesh = PolygonMesh::demo_shape();
        mesh.fill_indices[0] = mesh.vertices.len() as u32;
        assert!(!mesh.indices_in_bounds());
    }

    #[test]
    fn test_primitive_alignment() {
        let mesh = PolygonMesh::demo_shape();
        // Whole triangles and whole segments, no partial primitives.
        assert_eq!(mesh.fill_indices.len() % 3, 0);
        assert_eq!(mesh.outline_indices.len() % 2, 0);
    }

    #[test]
    fn test_byte_views() {
        let mesh = PolygonMesh::demo_shape();
        assert_eq!(
            mesh.vertex_bytes().len(),
            mesh.vertices.len() * std::mem::size_of::<Vertex>()
        );
        assert_eq!(mesh.fill_index_bytes().len(), 27 * 4);
        assert_eq!(mesh.outline_index_bytes().len(), 40 * 4);
    }

    #[test]
    fn test_vertex_layout() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 8);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 0);
    }
}
