//! # Rendering System
//!
//! Backend-agnostic rendering layer: the graphics-context interface the
//! pipelines drive, the fixed-function state model, resources, off-screen
//! targets and the forward / deferred / shadow pipelines themselves.
//!
//! ## Architecture
//!
//! - **GraphicsContext**: the single mutable graphics state machine the core submits to
//! - **RenderState / StateScope**: fixed-function state as a value, restored on scope exit
//! - **Resources**: meshes and materials behind generational handles
//! - **Pipelines**: forward, deferred, shadow and multi-light passes
//! - **RecordingContext**: headless context used by tests and the viewer
//!
//! ## Current Limitations
//!
//! - **G-buffer size**: created once at window size, not recreated on resize
//! - **Point light shadows**: no cube-map path, point lights cast no shadows

use thiserror::Error;

pub mod context;
pub mod framebuffer;
pub mod pipeline;
pub mod primitives;
pub mod recording;
pub mod resources;
pub mod state;
pub mod uniforms;

pub use context::{
    Attachment, ClearFlags, GraphicsContext, Primitive, RenderTargetDesc, RenderTargetId,
    TextureHandle, Viewport,
};
pub use framebuffer::{GBuffer, ResourceSlot, ShadowMap};
pub use pipeline::{MultiLightMode, PipelineMode, RenderMode};
pub use primitives::{Camera, Mesh, Projection};
pub use recording::RecordingContext;
pub use resources::{
    AlphaMode, Material, MaterialHandle, MaterialTextures, MeshHandle, ResourceRegistry,
};
pub use state::{BlendFactor, BlendFunc, DepthFunc, RenderState, StateScope};
pub use uniforms::UniformValue;

/// High-level rendering error types
///
/// Only conditions the renderer cannot degrade around are reported as
/// errors. Missing meshes, materials, textures or shaders are logged and
/// skipped at the draw site instead.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Renderer initialization failed during setup
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// A rendering operation failed during execution
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Resource creation or management failed
    ///
    /// Occurs when the graphics context cannot allocate a render target or
    /// texture.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Renderer configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
