//! Rendering resources
//!
//! Materials and the registry that owns meshes and materials.

pub mod material;
pub mod registry;

pub use material::{AlphaMode, Material, MaterialTextures, ResolvedTextures};
pub use registry::{MaterialHandle, MeshHandle, ResourceRegistry};
