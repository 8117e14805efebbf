//! Deferred pipeline
//!
//! Two passes per frame:
//!
//! 1. **Geometry**: opaque and masked calls write albedo, normal, material
//!    and depth into the G-buffer with the `gbuffers` shader.
//! 2. **Resolve**: the display is cleared and a full-screen `deferred` pass
//!    samples the four G-buffer targets, reconstructs world positions from
//!    depth and the inverse view-projection, and applies ambient light.
//!
//! Blended calls cannot be resolved from a G-buffer and are skipped (and
//! counted). Per-light accumulation into the resolve is available through
//! [`DeferredOptions::direct_lighting`] as an additive `deferred_light` pass
//! per light. It is a partial implementation: every light shades the whole
//! screen with the forward light uniforms, and it is off by default.
//!
//! The G-buffer is created on first use at window size and never resized.

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};
use crate::render::context::{ClearFlags, GraphicsContext, Primitive, TextureHandle, Viewport};
use crate::render::framebuffer::{GBuffer, ResourceSlot};
use crate::render::pipeline::forward::{draw_texture_quad, set_object_uniforms};
use crate::render::pipeline::shaders;
use crate::render::primitives::Camera;
use crate::render::resources::ResourceRegistry;
use crate::render::state::{BlendFunc, RenderState, StateScope};
use crate::render::RenderResult;
use crate::scene::light::LightEntity;
use crate::scene::render_queue::RenderCall;
use crate::scene::world::Scene;

/// Switches of the deferred pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeferredOptions {
    /// Show the four G-buffer targets in screen quadrants instead of the resolve
    pub show_gbuffers: bool,
    /// Add one additive full-screen pass per light after the ambient resolve
    pub direct_lighting: bool,
    /// Color the G-buffer color targets are cleared to
    pub gbuffer_clear_color: Vec4,
}

impl Default for DeferredOptions {
    fn default() -> Self {
        Self {
            show_gbuffers: false,
            direct_lighting: false,
            gbuffer_clear_color: Vec4::zeros(),
        }
    }
}

/// Counters of one deferred frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeferredStats {
    /// Calls written into the G-buffer
    pub drawn: usize,
    /// Blended calls left out of the G-buffer
    pub skipped_translucent: usize,
    /// Additive per-light resolve passes
    pub light_passes: usize,
}

/// Inputs of one deferred frame
#[derive(Debug, Clone, Copy)]
pub struct DeferredPass<'a> {
    /// Camera the frame is seen from
    pub camera: &'a Camera,
    /// Meshes and materials the calls refer to
    pub resources: &'a ResourceRegistry,
    /// Lights for the optional per-light passes
    pub lights: &'a [LightEntity],
    /// Display clear color
    pub background_color: Vec3,
    /// Ambient term applied by the resolve
    pub ambient_light: Vec3,
    /// Pipeline switches
    pub options: DeferredOptions,
}

impl<'a> DeferredPass<'a> {
    /// Deferred frame of `scene` as seen from `camera`
    pub fn new(
        scene: &'a Scene,
        camera: &'a Camera,
        resources: &'a ResourceRegistry,
        options: DeferredOptions,
    ) -> Self {
        Self {
            camera,
            resources,
            lights: &scene.lights,
            background_color: scene.background_color,
            ambient_light: scene.ambient_light,
            options,
        }
    }

    /// Run the geometry and resolve passes over `calls`
    ///
    /// Creates the G-buffer in `gbuffer` on first use; fails only if that
    /// creation fails.
    pub fn render(
        &self,
        context: &mut dyn GraphicsContext,
        calls: &[RenderCall],
        gbuffer: &mut ResourceSlot<GBuffer>,
    ) -> RenderResult<DeferredStats> {
        let gbuffer = *gbuffer.ensure(|| GBuffer::create(&mut *context))?;

        let mut stats = self.geometry_pass(context, &gbuffer, calls);
        if stats.skipped_translucent > 0 {
            log::debug!(
                "{} blended calls not drawn by the deferred pipeline",
                stats.skipped_translucent
            );
        }

        let background = self.background_color;
        context.apply_state(&RenderState::BASELINE);
        context.clear(
            ClearFlags::COLOR | ClearFlags::DEPTH,
            Vec4::new(background.x, background.y, background.z, 1.0),
        );

        if self.options.show_gbuffers {
            self.render_gbuffer_views(context, &gbuffer);
        } else if self.resolve(context, &gbuffer) && self.options.direct_lighting {
            stats.light_passes = self.accumulate_lights(context, &gbuffer);
        }

        context.apply_state(&RenderState::BASELINE);
        Ok(stats)
    }

    fn geometry_pass(
        &self,
        context: &mut dyn GraphicsContext,
        gbuffer: &GBuffer,
        calls: &[RenderCall],
    ) -> DeferredStats {
        let mut stats = DeferredStats::default();
        context.bind_render_target(Some(gbuffer.target));
        {
            let mut scope = StateScope::new(context, RenderState::BASELINE);
            scope.clear(ClearFlags::COLOR | ClearFlags::DEPTH, self.options.gbuffer_clear_color);

            if scope.enable_shader(shaders::GBUFFERS) {
                for call in calls {
                    if call.is_blended() {
                        stats.skipped_translucent += 1;
                        continue;
                    }
                    let mesh = self.resources.mesh(call.mesh).filter(|mesh| !mesh.is_empty());
                    let material = self.resources.material(call.material);
                    let (Some(mesh), Some(material)) = (mesh, material) else {
                        continue;
                    };

                    scope.apply_state(&RenderState::BASELINE.with_culling(!material.two_sided));
                    set_object_uniforms(
                        &mut *scope,
                        self.camera,
                        &call.model,
                        material,
                        self.ambient_light,
                    );
                    scope.draw_mesh(call.mesh, mesh.vertex_count, Primitive::Triangles);
                    stats.drawn += 1;
                }
                scope.disable_shader();
            } else {
                log::warn!("Shader '{}' not available, G-buffer left empty", shaders::GBUFFERS);
            }
        }
        context.bind_render_target(None);
        stats
    }

    fn resolve(&self, context: &mut dyn GraphicsContext, gbuffer: &GBuffer) -> bool {
        let textures = gbuffer.textures(&*context);
        let mut scope = StateScope::new(context, RenderState::FULLSCREEN);
        if !scope.enable_shader(shaders::DEFERRED) {
            log::warn!("Shader '{}' not available, deferred resolve skipped", shaders::DEFERRED);
            return false;
        }
        self.bind_gbuffer(&mut *scope, gbuffer, textures);
        scope.set_uniform("u_ambient_light", self.ambient_light.into());
        scope.draw_fullscreen_quad();
        scope.disable_shader();
        true
    }

    fn accumulate_lights(&self, context: &mut dyn GraphicsContext, gbuffer: &GBuffer) -> usize {
        if self.lights.is_empty() {
            return 0;
        }
        let textures = gbuffer.textures(&*context);
        let additive = RenderState::FULLSCREEN.with_blend(Some(BlendFunc::ADDITIVE));
        let mut scope = StateScope::new(context, additive);
        if !scope.enable_shader(shaders::DEFERRED_LIGHT) {
            log::warn!(
                "Shader '{}' not available, direct lighting skipped",
                shaders::DEFERRED_LIGHT
            );
            return 0;
        }
        self.bind_gbuffer(&mut *scope, gbuffer, textures);
        for light in self.lights {
            light.set_uniforms(&mut *scope);
            scope.draw_fullscreen_quad();
        }
        scope.disable_shader();
        self.lights.len()
    }

    fn bind_gbuffer(
        &self,
        context: &mut dyn GraphicsContext,
        gbuffer: &GBuffer,
        textures: [TextureHandle; 4],
    ) {
        let [color, normal, extra, depth] = textures;
        context.set_texture("u_color_texture", color, 0);
        context.set_texture("u_normal_texture", normal, 1);
        context.set_texture("u_extra_texture", extra, 2);
        context.set_texture("u_depth_texture", depth, 3);

        let inverse = self.camera.get_inverse_view_projection_matrix().unwrap_or_else(|| {
            log::warn!("Camera view-projection is not invertible, using identity");
            Mat4::identity()
        });
        context.set_uniform("u_inverse_viewprojection", inverse.into());
        context.set_uniform(
            "u_iRes",
            Vec2::new(1.0 / gbuffer.width.max(1) as f32, 1.0 / gbuffer.height.max(1) as f32).into(),
        );
        context.set_uniform("u_camera_position", self.camera.eye.into());
    }

    /// Albedo top-left, normal top-right, material bottom-left, linearized
    /// depth bottom-right
    fn render_gbuffer_views(&self, context: &mut dyn GraphicsContext, gbuffer: &GBuffer) {
        let [color, normal, extra, depth] = gbuffer.textures(&*context);
        let (width, height) = context.window_size();
        let (half_width, half_height) = (width / 2, height / 2);
        let quadrant = |x, y| Viewport { x, y, width: half_width, height: half_height };

        draw_texture_quad(context, color, quadrant(0, half_height), None);
        draw_texture_quad(context, normal, quadrant(half_width, half_height), None);
        draw_texture_quad(context, extra, quadrant(0, 0), None);
        draw_texture_quad(
            context,
            depth,
            quadrant(half_width, 0),
            Some(Vec2::new(self.camera.near, self.camera.far)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::context::Attachment;
    use crate::render::primitives::Mesh;
    use crate::render::recording::{DrawKind, RecordingContext};
    use crate::render::resources::{AlphaMode, Material};
    use crate::render::uniforms::UniformValue;
    use crate::scene::light::LightType;

    struct Fixture {
        resources: ResourceRegistry,
        scene: Scene,
        camera: Camera,
        calls: Vec<RenderCall>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut camera = Camera::perspective(Vec3::zeros(), 60.0, 4.0 / 3.0, 0.1, 100.0);
            camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros(), Vec3::y());
            let mut fixture = Self {
                resources: ResourceRegistry::new(),
                scene: Scene::new(),
                camera,
                calls: Vec::new(),
            };
            fixture.push(AlphaMode::Opaque, 8.0);
            fixture.push(AlphaMode::Mask(0.5), 9.0);
            fixture.push(AlphaMode::Blend, 5.0);
            fixture
        }

        fn push(&mut self, alpha_mode: AlphaMode, distance: f32) {
            let call = RenderCall {
                model: Mat4::identity(),
                mesh: self.resources.add_mesh(Mesh::cube("cube")),
                material: self.resources.add_material(Material::new().with_alpha_mode(alpha_mode)),
                alpha_mode,
                distance_to_camera: distance,
            };
            self.calls.push(call);
        }

        fn pass(&self, options: DeferredOptions) -> DeferredPass<'_> {
            DeferredPass::new(&self.scene, &self.camera, &self.resources, options)
        }
    }

    #[test]
    fn test_geometry_pass_excludes_blend() {
        let fixture = Fixture::new();
        let mut context = RecordingContext::new(800, 600);
        let mut slot = ResourceSlot::Uninitialized;

        let stats = fixture
            .pass(DeferredOptions::default())
            .render(&mut context, &fixture.calls, &mut slot)
            .unwrap();
        assert_eq!(stats.drawn, 2);
        assert_eq!(stats.skipped_translucent, 1);

        let gbuffer = slot.get().copied().unwrap();
        let geometry = context.draws_into(Some(gbuffer.target));
        assert_eq!(geometry.len(), 2);
        assert!(geometry.iter().all(|draw| draw.shader == "gbuffers"));
        assert!(geometry.iter().all(|draw| draw.mesh() != Some(fixture.calls[2].mesh)));
    }

    #[test]
    fn test_resolve_samples_gbuffer() {
        let fixture = Fixture::new();
        let mut context = RecordingContext::new(800, 600);
        let mut slot = ResourceSlot::Uninitialized;
        fixture
            .pass(DeferredOptions::default())
            .render(&mut context, &fixture.calls, &mut slot)
            .unwrap();
        let gbuffer = slot.get().copied().unwrap();

        let resolve = context.draws_into(None);
        assert_eq!(resolve.len(), 1);
        let draw = resolve[0];
        assert_eq!(draw.shader, "deferred");
        assert_eq!(draw.kind, DrawKind::FullscreenQuad);
        assert_eq!(
            draw.texture("u_normal_texture"),
            context.target_texture(gbuffer.target, Attachment::Color(1))
        );
        assert_eq!(
            draw.texture("u_depth_texture"),
            context.target_texture(gbuffer.target, Attachment::Depth)
        );
        let inverse_resolution = Vec2::new(1.0 / 800.0, 1.0 / 600.0);
        assert_eq!(draw.uniform("u_iRes"), Some(&UniformValue::Vec2(inverse_resolution)));
        assert_eq!(
            draw.uniform("u_ambient_light"),
            Some(&UniformValue::Vec3(fixture.scene.ambient_light))
        );
        assert!(matches!(draw.uniform("u_inverse_viewprojection"), Some(UniformValue::Mat4(_))));
        assert_eq!(context.current_state(), RenderState::BASELINE);
        assert_eq!(context.bound_target(), None);
    }

    #[test]
    fn test_gbuffer_created_once() {
        let fixture = Fixture::new();
        let mut context = RecordingContext::new(800, 600);
        let mut slot = ResourceSlot::Uninitialized;
        let pass = fixture.pass(DeferredOptions::default());
        pass.render(&mut context, &fixture.calls, &mut slot).unwrap();
        let first = slot.get().copied();
        pass.render(&mut context, &fixture.calls, &mut slot).unwrap();
        assert_eq!(slot.get().copied(), first);
        assert_eq!(context.render_target_count(), 1);
    }

    #[test]
    fn test_gbuffer_quadrants() {
        let fixture = Fixture::new();
        let mut context = RecordingContext::new(800, 600);
        let mut slot = ResourceSlot::Uninitialized;
        let options = DeferredOptions { show_gbuffers: true, ..Default::default() };
        fixture.pass(options).render(&mut context, &fixture.calls, &mut slot).unwrap();

        let views = context.draws_into(None);
        assert_eq!(views.len(), 4);
        let viewports: Vec<_> =
            views.iter().map(|draw| (draw.viewport.x, draw.viewport.y)).collect();
        assert_eq!(viewports, vec![(0, 300), (400, 300), (0, 0), (400, 0)]);
        assert_eq!(views[3].shader, "depth");
        assert_eq!(
            views[3].uniform("u_camera_nearfar"),
            Some(&UniformValue::Vec2(Vec2::new(0.1, 100.0)))
        );
        assert!(views.iter().all(|draw| draw.shader != "deferred"));
    }

    #[test]
    fn test_direct_lighting_adds_one_pass_per_light() {
        let mut fixture = Fixture::new();
        fixture.scene.add_light(LightEntity::new("a", LightType::Directional));
        fixture.scene.add_light(LightEntity::new("b", LightType::Spot));
        let mut context = RecordingContext::new(800, 600);
        let mut slot = ResourceSlot::Uninitialized;

        let options = DeferredOptions { direct_lighting: true, ..Default::default() };
        let stats = fixture.pass(options).render(&mut context, &fixture.calls, &mut slot).unwrap();
        assert_eq!(stats.light_passes, 2);

        let light_draws: Vec<_> =
            context.draws().iter().filter(|draw| draw.shader == "deferred_light").collect();
        assert_eq!(light_draws.len(), 2);
        assert!(light_draws.iter().all(|draw| draw.state.blend == Some(BlendFunc::ADDITIVE)));
    }

    #[test]
    fn test_creation_failure_is_reported() {
        let fixture = Fixture::new();
        let mut context = RecordingContext::new(800, 600).failing_target_creation();
        let mut slot = ResourceSlot::Uninitialized;
        let pass = fixture.pass(DeferredOptions::default());
        let result = pass.render(&mut context, &fixture.calls, &mut slot);
        assert!(result.is_err());
        assert!(!slot.is_ready());
    }
}
