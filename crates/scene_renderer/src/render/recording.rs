//! Headless recording graphics context
//!
//! [`RecordingContext`] implements [`GraphicsContext`] without a GPU. It keeps
//! the same state machine a real backend keeps (bound target, active shader,
//! fixed-function state, viewport) and records every command in submission
//! order. Each draw is captured together with the state, shader, target,
//! uniforms and textures active at the time it was issued, which makes the
//! pipelines inspectable from tests and from the headless viewer.

use std::collections::{HashMap, HashSet};

use crate::foundation::math::Vec4;
use crate::render::context::{
    Attachment, ClearFlags, GraphicsContext, Primitive, RenderTargetDesc, RenderTargetId,
    TextureHandle, Viewport,
};
use crate::render::state::RenderState;
use crate::render::uniforms::UniformValue;
use crate::render::{MeshHandle, RenderError, RenderResult};

/// What a recorded draw submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    /// A mesh draw
    Mesh {
        /// Mesh submitted
        mesh: MeshHandle,
        /// Number of vertices submitted
        vertex_count: usize,
        /// Topology
        primitive: Primitive,
    },
    /// A full-screen quad
    FullscreenQuad,
}

/// A draw together with everything that was bound when it was issued
#[derive(Debug, Clone)]
pub struct RecordedDraw {
    /// What was drawn
    pub kind: DrawKind,
    /// Active shader name
    pub shader: String,
    /// Fixed-function state
    pub state: RenderState,
    /// Bound render target (`None` is the display)
    pub target: Option<RenderTargetId>,
    /// Active viewport
    pub viewport: Viewport,
    /// Uniforms set on the active shader since it was enabled
    pub uniforms: HashMap<String, UniformValue>,
    /// Textures bound on the active shader since it was enabled
    pub textures: HashMap<String, (TextureHandle, u32)>,
}

impl RecordedDraw {
    /// Uniform value by name
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    /// Texture bound to a sampler by name
    pub fn texture(&self, name: &str) -> Option<TextureHandle> {
        self.textures.get(name).map(|(texture, _)| *texture)
    }

    /// Mesh submitted by this draw, if it is a mesh draw
    pub fn mesh(&self) -> Option<MeshHandle> {
        match self.kind {
            DrawKind::Mesh { mesh, .. } => Some(mesh),
            DrawKind::FullscreenQuad => None,
        }
    }
}

/// One entry of the command stream
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Clear of the bound target
    Clear {
        /// Buffers cleared
        flags: ClearFlags,
        /// Clear color
        color: Vec4,
        /// Target cleared (`None` is the display)
        target: Option<RenderTargetId>,
    },
    /// Fixed-function state applied
    ApplyState(RenderState),
    /// Viewport changed
    Viewport(Viewport),
    /// Render target created
    CreateTarget(RenderTargetId),
    /// Render target bound (`None` is the display)
    BindTarget(Option<RenderTargetId>),
    /// Shader enabled
    EnableShader(String),
    /// Shader disabled
    DisableShader,
    /// Draw, indexing into [`RecordingContext::draws`]
    Draw(usize),
}

#[derive(Debug, Clone)]
struct TargetRecord {
    desc: RenderTargetDesc,
    color: Vec<TextureHandle>,
    depth: Option<TextureHandle>,
}

/// Graphics context that records instead of rendering
#[derive(Debug)]
pub struct RecordingContext {
    window_size: (u32, u32),
    state: RenderState,
    viewport: Viewport,
    bound_target: Option<RenderTargetId>,
    active_shader: Option<String>,
    uniforms: HashMap<String, UniformValue>,
    textures: HashMap<String, (TextureHandle, u32)>,
    unavailable_shaders: HashSet<String>,
    targets: HashMap<RenderTargetId, TargetRecord>,
    next_handle: u64,
    white_texture: TextureHandle,
    fail_target_creation: bool,
    commands: Vec<Command>,
    draws: Vec<RecordedDraw>,
}

impl RecordingContext {
    /// Create a context for a `width` x `height` display surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            window_size: (width, height),
            state: RenderState::BASELINE,
            viewport: Viewport::full(width, height),
            bound_target: None,
            active_shader: None,
            uniforms: HashMap::new(),
            textures: HashMap::new(),
            unavailable_shaders: HashSet::new(),
            targets: HashMap::new(),
            next_handle: 2,
            white_texture: TextureHandle(1),
            fail_target_creation: false,
            commands: Vec::new(),
            draws: Vec::new(),
        }
    }

    /// Make a shader variant unavailable, as if it failed to compile
    #[must_use]
    pub fn without_shader(mut self, name: &str) -> Self {
        self.unavailable_shaders.insert(name.to_string());
        self
    }

    /// Make every render-target creation fail
    #[must_use]
    pub fn failing_target_creation(mut self) -> Self {
        self.fail_target_creation = true;
        self
    }

    /// Full command stream since creation or the last [`Self::reset`]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// All draws since creation or the last [`Self::reset`]
    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    /// Draws issued while a given target was bound
    pub fn draws_into(&self, target: Option<RenderTargetId>) -> Vec<&RecordedDraw> {
        self.draws.iter().filter(|draw| draw.target == target).collect()
    }

    /// Number of render targets created so far
    pub fn render_target_count(&self) -> usize {
        self.targets.len()
    }

    /// Description of a created render target
    pub fn render_target_desc(&self, target: RenderTargetId) -> Option<&RenderTargetDesc> {
        self.targets.get(&target).map(|record| &record.desc)
    }

    /// Currently bound target
    pub fn bound_target(&self) -> Option<RenderTargetId> {
        self.bound_target
    }

    /// Currently active shader
    pub fn active_shader(&self) -> Option<&str> {
        self.active_shader.as_deref()
    }

    /// Forget recorded commands and draws, keeping resources and state
    pub fn reset(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    fn allocate_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn record_draw(&mut self, kind: DrawKind) {
        let Some(shader) = self.active_shader.clone() else {
            log::warn!("Draw submitted without an active shader, ignored");
            return;
        };
        let index = self.draws.len();
        self.draws.push(RecordedDraw {
            kind,
            shader,
            state: self.state,
            target: self.bound_target,
            viewport: self.viewport,
            uniforms: self.uniforms.clone(),
            textures: self.textures.clone(),
        });
        self.commands.push(Command::Draw(index));
    }
}

impl GraphicsContext for RecordingContext {
    fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    fn clear(&mut self, flags: ClearFlags, color: Vec4) {
        self.commands.push(Command::Clear { flags, color, target: self.bound_target });
    }

    fn apply_state(&mut self, state: &RenderState) {
        self.state = *state;
        self.commands.push(Command::ApplyState(*state));
    }

    fn current_state(&self) -> RenderState {
        self.state
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.commands.push(Command::Viewport(viewport));
    }

    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> RenderResult<RenderTargetId> {
        if self.fail_target_creation {
            return Err(RenderError::ResourceCreationFailed(format!(
                "render target '{}' ({}x{})",
                desc.label, desc.width, desc.height
            )));
        }

        let id = RenderTargetId(self.allocate_handle());
        let color = (0..desc.color_attachments)
            .map(|_| TextureHandle(self.allocate_handle()))
            .collect();
        let depth = desc.depth.then(|| TextureHandle(self.allocate_handle()));
        self.targets.insert(id, TargetRecord { desc: desc.clone(), color, depth });
        self.commands.push(Command::CreateTarget(id));
        log::debug!("Created render target '{}' {:?}", desc.label, id);
        Ok(id)
    }

    fn bind_render_target(&mut self, target: Option<RenderTargetId>) {
        self.bound_target = target;
        self.viewport = match target.and_then(|id| self.targets.get(&id)) {
            Some(record) => Viewport::full(record.desc.width, record.desc.height),
            None => Viewport::full(self.window_size.0, self.window_size.1),
        };
        self.commands.push(Command::BindTarget(target));
    }

    fn target_texture(
        &self,
        target: RenderTargetId,
        attachment: Attachment,
    ) -> Option<TextureHandle> {
        let record = self.targets.get(&target)?;
        match attachment {
            Attachment::Color(index) => record.color.get(index).copied(),
            Attachment::Depth => record.depth,
        }
    }

    fn white_texture(&self) -> TextureHandle {
        self.white_texture
    }

    fn enable_shader(&mut self, name: &str) -> bool {
        if self.unavailable_shaders.contains(name) {
            return false;
        }
        self.active_shader = Some(name.to_string());
        self.uniforms.clear();
        self.textures.clear();
        self.commands.push(Command::EnableShader(name.to_string()));
        true
    }

    fn disable_shader(&mut self) {
        self.active_shader = None;
        self.commands.push(Command::DisableShader);
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if self.active_shader.is_none() {
            log::warn!("Uniform '{name}' set without an active shader, ignored");
            return;
        }
        self.uniforms.insert(name.to_string(), value);
    }

    fn set_texture(&mut self, name: &str, texture: TextureHandle, slot: u32) {
        if self.active_shader.is_none() {
            log::warn!("Texture '{name}' bound without an active shader, ignored");
            return;
        }
        self.textures.insert(name.to_string(), (texture, slot));
    }

    fn draw_mesh(&mut self, mesh: MeshHandle, vertex_count: usize, primitive: Primitive) {
        self.record_draw(DrawKind::Mesh { mesh, vertex_count, primitive });
    }

    fn draw_fullscreen_quad(&mut self) {
        self.record_draw(DrawKind::FullscreenQuad);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_captures_bound_state() {
        let mut context = RecordingContext::new(800, 600);
        assert!(context.enable_shader("mesh"));
        context.set_uniform("u_value", UniformValue::Float(2.0));
        context.draw_fullscreen_quad();

        let draw = &context.draws()[0];
        assert_eq!(draw.shader, "mesh");
        assert_eq!(draw.state, RenderState::BASELINE);
        assert_eq!(draw.uniform("u_value"), Some(&UniformValue::Float(2.0)));
        assert_eq!(draw.viewport, Viewport::full(800, 600));
    }

    #[test]
    fn test_uniforms_reset_when_shader_changes() {
        let mut context = RecordingContext::new(800, 600);
        context.enable_shader("a");
        context.set_uniform("u_value", UniformValue::Int(1));
        context.enable_shader("b");
        context.draw_fullscreen_quad();
        assert!(context.draws()[0].uniform("u_value").is_none());
    }

    #[test]
    fn test_unavailable_shader() {
        let mut context = RecordingContext::new(800, 600).without_shader("deferred");
        assert!(!context.enable_shader("deferred"));
        assert!(context.active_shader().is_none());
        context.draw_fullscreen_quad();
        assert!(context.draws().is_empty());
    }

    #[test]
    fn test_render_target_attachments() {
        let mut context = RecordingContext::new(800, 600);
        let desc = RenderTargetDesc {
            label: "gbuffers".to_string(),
            width: 800,
            height: 600,
            color_attachments: 3,
            depth: true,
        };
        let target = context.create_render_target(&desc).unwrap();
        assert!(context.target_texture(target, Attachment::Color(2)).is_some());
        assert!(context.target_texture(target, Attachment::Color(3)).is_none());
        assert!(context.target_texture(target, Attachment::Depth).is_some());
        let white = Some(context.white_texture());
        assert_ne!(context.target_texture(target, Attachment::Depth), white);

        context.bind_render_target(Some(target));
        assert_eq!(context.bound_target(), Some(target));
        context.bind_render_target(None);
        assert_eq!(context.bound_target(), None);
    }

    #[test]
    fn test_failing_target_creation() {
        let mut context = RecordingContext::new(800, 600).failing_target_creation();
        let desc = RenderTargetDesc {
            label: "shadow".to_string(),
            width: 1,
            height: 1,
            color_attachments: 0,
            depth: true,
        };
        assert!(context.create_render_target(&desc).is_err());
        assert_eq!(context.render_target_count(), 0);
    }
}
