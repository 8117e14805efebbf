//! Off-screen render targets owned by the renderer
//!
//! Targets are created on first use and then live for the whole run. A
//! [`ResourceSlot`] makes the "not created yet" state explicit so creation
//! happens exactly once.

use crate::render::context::{
    Attachment, GraphicsContext, RenderTargetDesc, RenderTargetId, TextureHandle,
};
use crate::render::{RenderError, RenderResult};

/// Number of color targets in the G-buffer (albedo, normal, material)
pub const GBUFFER_COLOR_TARGETS: usize = 3;

/// Initialize-once storage for a lazily created resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResourceSlot<T> {
    /// Not created yet
    #[default]
    Uninitialized,
    /// Created and reusable
    Ready(T),
}

impl<T> ResourceSlot<T> {
    /// Return the resource, creating it with `create` if the slot is empty
    ///
    /// A failed creation leaves the slot uninitialized so a later frame can
    /// try again.
    pub fn ensure<F>(&mut self, create: F) -> RenderResult<&mut T>
    where
        F: FnOnce() -> RenderResult<T>,
    {
        if let Self::Uninitialized = self {
            *self = Self::Ready(create()?);
        }
        match self {
            Self::Ready(resource) => Ok(resource),
            Self::Uninitialized => {
                Err(RenderError::ResourceCreationFailed("slot left empty".to_string()))
            }
        }
    }

    /// The resource, if it has been created
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Ready(resource) => Some(resource),
            Self::Uninitialized => None,
        }
    }

    /// Whether the resource has been created
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Deferred-shading G-buffer: three color targets and one depth target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GBuffer {
    /// The multi-target render target
    pub target: RenderTargetId,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl GBuffer {
    /// Create a window-sized G-buffer
    pub fn create(context: &mut dyn GraphicsContext) -> RenderResult<Self> {
        let (width, height) = context.window_size();
        let target = context.create_render_target(&RenderTargetDesc {
            label: "gbuffers".to_string(),
            width,
            height,
            color_attachments: GBUFFER_COLOR_TARGETS,
            depth: true,
        })?;
        log::info!("Created G-buffer {width}x{height}");
        Ok(Self { target, width, height })
    }

    /// The four sampled targets: albedo, normal, material, depth
    ///
    /// Missing attachments resolve to the context's white texture.
    pub fn textures(&self, context: &dyn GraphicsContext) -> [TextureHandle; 4] {
        let white = context.white_texture();
        let fetch = |attachment| context.target_texture(self.target, attachment).unwrap_or(white);
        [
            fetch(Attachment::Color(0)),
            fetch(Attachment::Color(1)),
            fetch(Attachment::Color(2)),
            fetch(Attachment::Depth),
        ]
    }
}

/// Depth-only render target a light renders its shadow map into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowMap {
    /// The depth-only render target
    pub target: RenderTargetId,
    /// Square size in pixels
    pub size: u32,
}

impl ShadowMap {
    /// Create a square depth-only target
    pub fn create(context: &mut dyn GraphicsContext, label: &str, size: u32) -> RenderResult<Self> {
        let target = context.create_render_target(&RenderTargetDesc {
            label: format!("shadowmap:{label}"),
            width: size,
            height: size,
            color_attachments: 0,
            depth: true,
        })?;
        Ok(Self { target, size })
    }

    /// Depth texture to sample, if the context exposes one
    pub fn depth_texture(&self, context: &dyn GraphicsContext) -> Option<TextureHandle> {
        context.target_texture(self.target, Attachment::Depth)
    }
}
