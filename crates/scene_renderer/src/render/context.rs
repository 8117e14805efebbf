//! Graphics context abstraction
//!
//! The renderer core never talks to a graphics API directly. It drives a
//! [`GraphicsContext`]: one mutable state machine that owns shaders, render
//! targets and textures and accepts draw submissions in program order.
//! Resources created by the context are referred to through opaque handles.

use crate::foundation::math::Vec4;
use crate::render::state::RenderState;
use crate::render::uniforms::UniformValue;
use crate::render::{MeshHandle, RenderResult};

/// Handle to a texture owned by the graphics context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to an off-screen render target owned by the graphics context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetId(pub u64);

bitflags::bitflags! {
    /// Buffers affected by a clear
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        /// Color attachments
        const COLOR = 0b01;
        /// Depth attachment
        const DEPTH = 0b10;
    }
}

/// Primitive topology for mesh submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Independent triangles
    Triangles,
}

/// Render-target attachment that can be read back as a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// Color attachment by index
    Color(usize),
    /// Depth attachment
    Depth,
}

/// Pixel rectangle drawn into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Left edge
    pub x: u32,
    /// Bottom edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Viewport covering a whole `width` x `height` surface
    pub const fn full(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

/// Description of an off-screen render target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTargetDesc {
    /// Debug label
    pub label: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Number of color attachments (0 for depth-only targets)
    pub color_attachments: usize,
    /// Whether a depth attachment is created
    pub depth: bool,
}

/// The graphics state machine consumed by the renderer core
///
/// All calls are strictly ordered. Whatever is written to a render target
/// is visible to later passes once the target has been unbound.
pub trait GraphicsContext {
    /// Size of the display surface in pixels
    fn window_size(&self) -> (u32, u32);

    /// Clear the currently bound target
    fn clear(&mut self, flags: ClearFlags, color: Vec4);

    /// Apply a complete fixed-function state
    fn apply_state(&mut self, state: &RenderState);

    /// State most recently applied
    fn current_state(&self) -> RenderState;

    /// Restrict drawing to a rectangle of the bound target
    fn set_viewport(&mut self, viewport: Viewport);

    /// Create an off-screen render target
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> RenderResult<RenderTargetId>;

    /// Bind an off-screen target, or the display when `None`
    fn bind_render_target(&mut self, target: Option<RenderTargetId>);

    /// Read an attachment of a render target back as a texture
    fn target_texture(&self, target: RenderTargetId, attachment: Attachment)
        -> Option<TextureHandle>;

    /// 1x1 opaque white texture used wherever a texture is missing
    fn white_texture(&self) -> TextureHandle;

    /// Enable a shader variant by name; returns `false` if it does not exist
    fn enable_shader(&mut self, name: &str) -> bool;

    /// Disable the active shader
    fn disable_shader(&mut self);

    /// Set a uniform on the active shader
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    /// Bind a texture to a sampler uniform of the active shader
    fn set_texture(&mut self, name: &str, texture: TextureHandle, slot: u32);

    /// Submit a mesh for drawing with the active shader and state
    fn draw_mesh(&mut self, mesh: MeshHandle, vertex_count: usize, primitive: Primitive);

    /// Draw a quad covering the current viewport
    fn draw_fullscreen_quad(&mut self);
}
