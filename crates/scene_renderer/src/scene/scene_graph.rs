//! Scene graph primitives
//!
//! Bounding volumes, frustum planes and the owned node tree that prefabs are
//! built from. Each node exclusively owns its children; traversal passes the
//! accumulated parent transform down explicitly.

use std::collections::HashMap;
use std::rc::Rc;

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::resources::{MaterialHandle, MeshHandle};

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Axis-aligned box enclosing this box after an affine transform
    ///
    /// The center is transformed as a point; the half-size is transformed by
    /// the element-wise absolute value of the linear part, which gives the
    /// tightest axis-aligned fit of the rotated box.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let center = transform * Vec4::new(self.center().x, self.center().y, self.center().z, 1.0);
        let linear = transform.fixed_view::<3, 3>(0, 0).abs();
        let extents = linear * self.extents();
        Self::from_center_extents(center.xyz(), extents)
    }
}

/// Plane defined by normal and distance from origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (normalized, pointing into the frustum)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Plane from raw `ax + by + cz + d` coefficients, normalized
    fn from_coefficients(coefficients: Vec4) -> Self {
        let normal = coefficients.xyz();
        let length = normal.norm();
        if length <= f32::EPSILON {
            return Self { normal: Vec3::zeros(), distance: 0.0 };
        }
        Self {
            normal: normal / length,
            distance: coefficients.w / length,
        }
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

/// Frustum for visibility culling
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    /// Six planes defining the frustum (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for clip space with z in [-w, w].
    pub fn from_matrix(vp_matrix: &Mat4) -> Self {
        let row = |i: usize| -> Vec4 { vp_matrix.row(i).transpose() };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r3 + r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Check whether a box given by center and half-size overlaps the frustum
    pub fn intersects_box(&self, center: Vec3, half_size: Vec3) -> bool {
        self.planes.iter().all(|plane| {
            let radius = half_size.x * plane.normal.x.abs()
                + half_size.y * plane.normal.y.abs()
                + half_size.z * plane.normal.z.abs();
            plane.distance_to_point(center) >= -radius
        })
    }
}

/// A node of a prefab hierarchy
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Debug name
    pub name: String,
    /// Transform relative to the parent node
    pub local_transform: Mat4,
    /// Mesh drawn by this node
    pub mesh: Option<MeshHandle>,
    /// Material the mesh is drawn with
    pub material: Option<MaterialHandle>,
    /// Invisible nodes hide their whole subtree
    pub visible: bool,
    /// Child nodes, in draw-submission order
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create an empty visible node with identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local_transform: Mat4::identity(),
            mesh: None,
            material: None,
            visible: true,
            children: Vec::new(),
        }
    }

    /// Set the local transform
    #[must_use]
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.local_transform = transform;
        self
    }

    /// Attach a mesh and the material it is drawn with
    #[must_use]
    pub fn with_drawable(mut self, mesh: MeshHandle, material: MaterialHandle) -> Self {
        self.mesh = Some(mesh);
        self.material = Some(material);
        self
    }

    /// Set the visibility flag
    #[must_use]
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Append a child node
    #[must_use]
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child node in place
    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// The mesh+material pair, when both are present
    pub fn drawable(&self) -> Option<(MeshHandle, MaterialHandle)> {
        self.mesh.zip(self.material)
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

/// A reusable node hierarchy shared by any number of entities
#[derive(Debug, Clone)]
pub struct Prefab {
    /// Name the prefab is registered under
    pub name: String,
    /// Root of the hierarchy
    pub root: SceneNode,
}

impl Prefab {
    /// Create a prefab from a root node
    pub fn new(name: impl Into<String>, root: SceneNode) -> Self {
        Self { name: name.into(), root }
    }
}

/// Prefabs by name, as produced by an asset loader
#[derive(Debug, Default)]
pub struct PrefabLibrary {
    prefabs: HashMap<String, Rc<Prefab>>,
}

impl PrefabLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prefab under its name, returning the shared handle
    pub fn insert(&mut self, prefab: Prefab) -> Rc<Prefab> {
        log::debug!("Registered prefab '{}' ({} nodes)", prefab.name, prefab.root.node_count());
        let prefab = Rc::new(prefab);
        self.prefabs.insert(prefab.name.clone(), Rc::clone(&prefab));
        prefab
    }

    /// Look up a prefab by name
    pub fn get(&self, name: &str) -> Option<Rc<Prefab>> {
        self.prefabs.get(name).cloned()
    }

    /// Number of registered prefabs
    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    /// Whether the library is empty
    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}
