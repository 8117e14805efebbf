//! Shared mesh and material storage
//!
//! Scene nodes and render calls refer to meshes and materials through
//! generational handles. The registry owns the data; everything else only
//! borrows it for the duration of a frame.

use slotmap::SlotMap;

use crate::render::primitives::Mesh;
use crate::render::resources::Material;

slotmap::new_key_type! {
    /// Handle to a mesh stored in a [`ResourceRegistry`]
    pub struct MeshHandle;

    /// Handle to a material stored in a [`ResourceRegistry`]
    pub struct MaterialHandle;
}

/// Owner of every mesh and material the scene references
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    meshes: SlotMap<MeshHandle, Mesh>,
    materials: SlotMap<MaterialHandle, Material>,
}

impl ResourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a mesh and return its handle
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.insert(mesh)
    }

    /// Store a material and return its handle
    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.insert(material)
    }

    /// Look up a mesh
    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    /// Look up a material
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    /// Mutable access to a material
    pub fn material_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(handle)
    }

    /// Remove a mesh; handles to it stop resolving
    pub fn remove_mesh(&mut self, handle: MeshHandle) -> Option<Mesh> {
        self.meshes.remove(handle)
    }

    /// Remove a material; handles to it stop resolving
    pub fn remove_material(&mut self, handle: MaterialHandle) -> Option<Material> {
        self.materials.remove(handle)
    }

    /// Number of meshes stored
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Number of materials stored
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}
