//! Mesh descriptions consumed by the renderer
//!
//! Vertex data lives with the graphics backend; the core only needs what it
//! takes to cull and submit a mesh: its vertex count and local bounds.

use crate::scene::AABB;
use crate::foundation::math::Vec3;

/// Geometry registered with the renderer
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Debug name
    pub name: String,
    /// Number of vertices submitted per draw
    pub vertex_count: usize,
    /// Local-space bounding box
    pub bounding_box: AABB,
}

impl Mesh {
    /// Create a mesh description
    pub fn new(name: impl Into<String>, vertex_count: usize, bounding_box: AABB) -> Self {
        Self {
            name: name.into(),
            vertex_count,
            bounding_box,
        }
    }

    /// Unit cube centered on the origin (36 vertices, non-indexed)
    pub fn cube(name: impl Into<String>) -> Self {
        Self::new(
            name,
            36,
            AABB::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.5)),
        )
    }

    /// Unit quad in the XY plane (6 vertices)
    pub fn quad(name: impl Into<String>) -> Self {
        Self::new(
            name,
            6,
            AABB::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.0)),
        )
    }

    /// Whether the mesh has anything to draw
    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }
}
