//! Fixed-function render state
//!
//! The graphics context is one global state machine. Every pipeline stage
//! describes the state it needs as a [`RenderState`] value and applies it
//! through the context; [`StateScope`] puts the context back to
//! [`RenderState::BASELINE`] on every exit path of a drawing operation.

use std::ops::{Deref, DerefMut};

use crate::render::context::GraphicsContext;

/// Blend factor for source or destination color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    /// 0
    Zero,
    /// 1
    One,
    /// Source alpha
    SrcAlpha,
    /// 1 - source alpha
    OneMinusSrcAlpha,
}

/// Blend equation `src * src_factor + dst * dst_factor`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendFunc {
    /// Factor applied to the incoming fragment
    pub src: BlendFactor,
    /// Factor applied to the value already in the target
    pub dst: BlendFactor,
}

impl BlendFunc {
    /// Standard alpha compositing
    pub const ALPHA: Self = Self { src: BlendFactor::SrcAlpha, dst: BlendFactor::OneMinusSrcAlpha };
    /// Alpha-weighted additive accumulation
    pub const ADDITIVE_ALPHA: Self = Self { src: BlendFactor::SrcAlpha, dst: BlendFactor::One };
    /// Same-weighted additive accumulation
    pub const ADDITIVE: Self = Self { src: BlendFactor::One, dst: BlendFactor::One };
}

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    /// Pass when the fragment is closer
    Less,
    /// Pass when the fragment is closer or at the same depth
    LessEqual,
    /// Always pass
    Always,
}

/// Complete fixed-function state for one draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    /// Blending, `None` when disabled
    pub blend: Option<BlendFunc>,
    /// Depth testing enabled
    pub depth_test: bool,
    /// Depth writes enabled
    pub depth_write: bool,
    /// Depth comparison
    pub depth_func: DepthFunc,
    /// Back-face culling enabled
    pub cull_back_faces: bool,
    /// Color writes enabled
    pub color_write: bool,
}

impl RenderState {
    /// State every component returns the context to when it is done
    pub const BASELINE: Self = Self {
        blend: None,
        depth_test: true,
        depth_write: true,
        depth_func: DepthFunc::Less,
        cull_back_faces: true,
        color_write: true,
    };

    /// Depth-only state used by shadow passes
    pub const DEPTH_ONLY: Self = Self {
        color_write: false,
        ..Self::BASELINE
    };

    /// State for full-screen passes (no depth test, no culling)
    pub const FULLSCREEN: Self = Self {
        depth_test: false,
        depth_write: false,
        cull_back_faces: false,
        ..Self::BASELINE
    };

    /// Copy with blending set
    #[must_use]
    pub const fn with_blend(mut self, blend: Option<BlendFunc>) -> Self {
        self.blend = blend;
        self
    }

    /// Copy with face culling set
    #[must_use]
    pub const fn with_culling(mut self, cull_back_faces: bool) -> Self {
        self.cull_back_faces = cull_back_faces;
        self
    }

    /// Copy with depth function set
    #[must_use]
    pub const fn with_depth_func(mut self, depth_func: DepthFunc) -> Self {
        self.depth_func = depth_func;
        self
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::BASELINE
    }
}

/// Scoped access to the graphics context that restores the baseline state
/// when dropped.
///
/// Derefs to the context, so drawing code keeps issuing calls through the
/// scope while it is alive.
pub struct StateScope<'a> {
    context: &'a mut dyn GraphicsContext,
}

impl<'a> StateScope<'a> {
    /// Open a scope and apply `state`
    pub fn new(context: &'a mut dyn GraphicsContext, state: RenderState) -> Self {
        context.apply_state(&state);
        Self { context }
    }
}

impl<'a> Deref for StateScope<'a> {
    type Target = dyn GraphicsContext + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.context
    }
}

impl<'a> DerefMut for StateScope<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.context
    }
}

impl Drop for StateScope<'_> {
    fn drop(&mut self) {
        self.context.apply_state(&RenderState::BASELINE);
    }
}
