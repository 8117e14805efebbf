//! # Scene Renderer
//!
//! Real-time scene renderer core: turns a scene graph into ordered render
//! calls and executes them through a forward or a deferred pipeline, with
//! per-light shadow maps and selectable multi-light strategies.
//!
//! ## Features
//!
//! - **Render-call collection**: depth-first traversal with frustum culling
//! - **Draw ordering**: opaque front to back, blended back to front
//! - **Forward pipeline**: single-pass, multi-pass or first-light lighting
//! - **Deferred pipeline**: G-buffer geometry pass and full-screen resolve
//! - **Shadow maps**: one depth-only pass per directional or spot light
//! - **Headless backend**: [`render::RecordingContext`] records every command
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_renderer::prelude::*;
//!
//! let mut resources = ResourceRegistry::new();
//! let mesh = resources.add_mesh(Mesh::cube("cube"));
//! let material = resources.add_material(Material::new());
//!
//! let mut library = PrefabLibrary::new();
//! let root = SceneNode::new("root").with_drawable(mesh, material);
//! let prefab = library.insert(Prefab::new("box", root));
//!
//! let mut scene = Scene::new();
//! scene.add_prefab(PrefabEntity::with_prefab("box", prefab, Mat4::identity()));
//! scene.main_camera.look_at(Vec3::new(0.0, 2.0, 8.0), Vec3::zeros(), Vec3::y());
//!
//! let mut context = RecordingContext::new(1280, 720);
//! let mut renderer = Renderer::new();
//! let stats = renderer.render_frame(&mut context, &mut scene, &resources)?;
//! assert_eq!(stats.drawn, 1);
//! # Ok::<(), scene_renderer::render::RenderError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core renderer modules
pub mod core;

pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for renderer users
pub mod prelude {
    pub use crate::{
        config::Config,
        core::RendererConfig,
        foundation::math::{Mat4, Mat4Ext, Vec3, Vec4},
        render::{
            AlphaMode, Camera, GraphicsContext, Material, MaterialHandle, Mesh, MeshHandle,
            MultiLightMode, PipelineMode, RecordingContext, RenderError, RenderMode, RenderResult,
            ResourceRegistry,
        },
        scene::{
            Entity, EntityDescription, FrameStats, LightEntity, LightType, Prefab, PrefabEntity,
            PrefabLibrary, RenderCall, Renderer, Scene, SceneNode,
        },
    };
}
