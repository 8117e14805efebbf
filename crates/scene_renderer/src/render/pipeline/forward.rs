//! Forward pipeline
//!
//! Clears the display and shades every render call directly into it, in
//! queue order. Each draw runs inside a [`StateScope`] so blending and
//! culling chosen for one material never leak into the next draw.

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};
use crate::render::context::{ClearFlags, GraphicsContext, Primitive, TextureHandle, Viewport};
use crate::render::pipeline::lighting::{LightingStrategy, LitDraw};
use crate::render::pipeline::{shaders, RenderMode};
use crate::render::primitives::{Camera, Mesh};
use crate::render::resources::{Material, ResourceRegistry};
use crate::render::state::{BlendFunc, RenderState, StateScope};
use crate::scene::light::LightEntity;
use crate::scene::render_queue::RenderCall;
use crate::scene::world::Scene;

/// Inputs of one forward pass
#[derive(Debug, Clone, Copy)]
pub struct ForwardPass<'a> {
    /// Camera the frame is seen from
    pub camera: &'a Camera,
    /// Meshes and materials the calls refer to
    pub resources: &'a ResourceRegistry,
    /// Lights applied to lit draws
    pub lights: &'a [LightEntity],
    /// Display clear color
    pub background_color: Vec3,
    /// Ambient term of lit draws
    pub ambient_light: Vec3,
    /// Lit output or one of the debug views
    pub render_mode: RenderMode,
}

impl<'a> ForwardPass<'a> {
    /// Lit pass over `scene` as seen from `camera`
    pub fn new(scene: &'a Scene, camera: &'a Camera, resources: &'a ResourceRegistry) -> Self {
        Self {
            camera,
            resources,
            lights: &scene.lights,
            background_color: scene.background_color,
            ambient_light: scene.ambient_light,
            render_mode: RenderMode::Lit,
        }
    }

    /// Same pass with a different render mode
    #[must_use]
    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = render_mode;
        self
    }

    /// Clear the display and draw `calls` in order
    ///
    /// Returns the number of calls that were drawn.
    pub fn render(
        &self,
        context: &mut dyn GraphicsContext,
        calls: &[RenderCall],
        lighting: &mut LightingStrategy,
    ) -> usize {
        context.bind_render_target(None);
        context.apply_state(&RenderState::BASELINE);
        let background = self.background_color;
        context.clear(
            ClearFlags::COLOR | ClearFlags::DEPTH,
            Vec4::new(background.x, background.y, background.z, 1.0),
        );

        let mut drawn = 0;
        for call in calls {
            if self.render_call(context, call, lighting) {
                drawn += 1;
            }
        }

        context.apply_state(&RenderState::BASELINE);
        drawn
    }

    /// Draw one call; `false` when it was skipped
    pub fn render_call(
        &self,
        context: &mut dyn GraphicsContext,
        call: &RenderCall,
        lighting: &mut LightingStrategy,
    ) -> bool {
        let Some(mesh) = self.resources.mesh(call.mesh) else {
            log::debug!("Render call mesh no longer exists, skipped");
            return false;
        };
        let Some(material) = self.resources.material(call.material) else {
            log::debug!("Render call material no longer exists, skipped");
            return false;
        };
        self.render_mesh_with_material(context, &call.model, mesh, material, call, lighting)
    }

    fn render_mesh_with_material(
        &self,
        context: &mut dyn GraphicsContext,
        model: &Mat4,
        mesh: &Mesh,
        material: &Material,
        call: &RenderCall,
        lighting: &mut LightingStrategy,
    ) -> bool {
        if mesh.is_empty() {
            return false;
        }

        let blended = material.alpha_mode.is_blended();
        let state = RenderState::BASELINE
            .with_blend(blended.then_some(BlendFunc::ALPHA))
            .with_culling(!material.two_sided);
        let shader = self.render_mode.shader_override().unwrap_or(lighting.shader_name());

        let mut scope = StateScope::new(context, state);
        if !scope.enable_shader(shader) {
            log::warn!("Shader '{shader}' not available, draw skipped");
            return false;
        }

        set_object_uniforms(&mut *scope, self.camera, model, material, self.ambient_light);

        match self.render_mode {
            RenderMode::Lit => {
                let draw =
                    LitDraw { mesh: call.mesh, vertex_count: mesh.vertex_count, state, blended };
                lighting.apply(&mut *scope, self.lights, &draw);
            }
            _ => scope.draw_mesh(call.mesh, mesh.vertex_count, Primitive::Triangles),
        }

        scope.disable_shader();
        true
    }
}

/// Per-object transform and material uniforms shared by the forward and
/// G-buffer passes
pub fn set_object_uniforms(
    context: &mut dyn GraphicsContext,
    camera: &Camera,
    model: &Mat4,
    material: &Material,
    ambient_light: Vec3,
) {
    context.set_uniform("u_viewprojection", camera.get_view_projection_matrix().into());
    context.set_uniform("u_camera_position", camera.eye.into());
    context.set_uniform("u_model", (*model).into());

    let textures = material.textures.resolve(context.white_texture());
    context.set_uniform("u_color", material.color.into());
    context.set_uniform("u_has_emissive_light", textures.has_emissive.into());
    for (slot, (name, texture)) in textures.bindings().into_iter().enumerate() {
        context.set_texture(name, texture, slot as u32);
    }

    context.set_uniform("u_emissive_factor", material.emissive_factor.into());
    context.set_uniform("u_alpha_cutoff", material.alpha_mode.alpha_cutoff().into());
    context.set_uniform("u_ambient_light", ambient_light.into());
}

/// Draw `texture` as a quad covering `viewport`, then restore the full
/// viewport. Depth textures pass the camera range to linearize with.
pub(crate) fn draw_texture_quad(
    context: &mut dyn GraphicsContext,
    texture: TextureHandle,
    viewport: Viewport,
    near_far: Option<Vec2>,
) -> bool {
    let shader = if near_far.is_some() { shaders::DEPTH } else { shaders::SCREEN };
    let (width, height) = context.window_size();

    let mut scope = StateScope::new(context, RenderState::FULLSCREEN);
    if !scope.enable_shader(shader) {
        log::warn!("Shader '{shader}' not available, texture view skipped");
        return false;
    }
    if let Some(near_far) = near_far {
        scope.set_uniform("u_camera_nearfar", near_far.into());
    }
    scope.set_texture("u_texture", texture, 0);
    scope.set_viewport(viewport);
    scope.draw_fullscreen_quad();
    scope.disable_shader();
    scope.set_viewport(Viewport::full(width, height));
    true
}

/// Show a light's shadow map in the lower-left quarter of the display
///
/// Returns `false` when the light has no shadow map yet.
pub fn render_shadow_map_view(context: &mut dyn GraphicsContext, light: &LightEntity) -> bool {
    let depth = light.shadow_map().and_then(|shadow_map| shadow_map.depth_texture(&*context));
    let Some(texture) = depth else {
        log::debug!("Light '{}' has no shadow map to show", light.common.name);
        return false;
    };
    let (width, height) = context.window_size();
    let camera = &light.shadow_camera;
    draw_texture_quad(
        context,
        texture,
        Viewport { x: 0, y: 0, width: width / 2, height: height / 2 },
        Some(Vec2::new(camera.near, camera.far)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4Ext;
    use crate::render::recording::RecordingContext;
    use crate::render::resources::{AlphaMode, MaterialTextures};
    use crate::render::uniforms::UniformValue;
    use crate::render::pipeline::MultiLightMode;
    use crate::scene::light::LightType;

    struct Fixture {
        resources: ResourceRegistry,
        scene: Scene,
        camera: Camera,
    }

    impl Fixture {
        fn new() -> Self {
            let mut camera = Camera::perspective(Vec3::zeros(), 60.0, 4.0 / 3.0, 0.1, 100.0);
            camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros(), Vec3::y());
            let mut scene = Scene::new();
            scene.background_color = Vec3::new(0.2, 0.3, 0.4);
            Self { resources: ResourceRegistry::new(), scene, camera }
        }

        fn call(&mut self, material: Material) -> RenderCall {
            let alpha_mode = material.alpha_mode;
            RenderCall {
                model: Mat4::new_translation(&Vec3::new(1.0, 0.0, 0.0)),
                mesh: self.resources.add_mesh(Mesh::cube("cube")),
                material: self.resources.add_material(material),
                alpha_mode,
                distance_to_camera: 10.0,
            }
        }
    }

    #[test]
    fn test_opaque_draw_uniforms_and_state() {
        let mut fixture = Fixture::new();
        let call = fixture.call(Material::new().with_color(1.0, 0.0, 0.0, 1.0));
        let mut context = RecordingContext::new(800, 600);
        let mut lighting = LightingStrategy::new(MultiLightMode::NoMultiLight);

        let pass = ForwardPass::new(&fixture.scene, &fixture.camera, &fixture.resources);
        assert_eq!(pass.render(&mut context, &[call], &mut lighting), 1);

        let draw = &context.draws()[0];
        assert_eq!(draw.shader, "light");
        assert_eq!(draw.state.blend, None);
        assert!(draw.state.cull_back_faces);
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(draw.uniform("u_color"), Some(&UniformValue::Vec4(red)));
        assert_eq!(draw.uniform("u_has_emissive_light"), Some(&UniformValue::Bool(false)));
        assert_eq!(draw.uniform("u_alpha_cutoff"), Some(&UniformValue::Float(0.0)));
        assert_eq!(draw.texture("u_color_texture"), Some(context.white_texture()));
        assert_eq!(draw.textures.get("u_occlusion_texture").map(|(_, slot)| *slot), Some(4));
        match draw.uniform("u_model") {
            Some(UniformValue::Mat4(model)) => {
                assert_eq!(model.translation(), Vec3::new(1.0, 0.0, 0.0));
            }
            other => panic!("unexpected u_model {other:?}"),
        }
        assert_eq!(context.current_state(), RenderState::BASELINE);
    }

    #[test]
    fn test_clear_uses_background() {
        let fixture = Fixture::new();
        let mut context = RecordingContext::new(800, 600);
        let pass = ForwardPass::new(&fixture.scene, &fixture.camera, &fixture.resources);
        pass.render(&mut context, &[], &mut LightingStrategy::default());

        let clear = context.commands().iter().find_map(|command| match command {
            crate::render::recording::Command::Clear { flags, color, target } => {
                Some((*flags, *color, *target))
            }
            _ => None,
        });
        assert_eq!(
            clear,
            Some((ClearFlags::COLOR | ClearFlags::DEPTH, Vec4::new(0.2, 0.3, 0.4, 1.0), None))
        );
    }

    #[test]
    fn test_blend_two_sided_material_state() {
        let mut fixture = Fixture::new();
        let material = Material::new().with_alpha_mode(AlphaMode::Blend).with_two_sided(true);
        let call = fixture.call(material);
        let mut context = RecordingContext::new(800, 600);
        let pass = ForwardPass::new(&fixture.scene, &fixture.camera, &fixture.resources);
        pass.render(&mut context, &[call], &mut LightingStrategy::default());

        let draw = &context.draws()[0];
        assert_eq!(draw.state.blend, Some(BlendFunc::ALPHA));
        assert!(!draw.state.cull_back_faces);
        assert_eq!(context.current_state().blend, None);
    }

    #[test]
    fn test_mask_cutoff_and_emissive_texture() {
        let mut fixture = Fixture::new();
        let textures = MaterialTextures { emissive: Some(TextureHandle(77)), ..Default::default() };
        let material =
            Material::new().with_alpha_mode(AlphaMode::Mask(0.4)).with_textures(textures);
        let call = fixture.call(material);
        let mut context = RecordingContext::new(800, 600);
        let pass = ForwardPass::new(&fixture.scene, &fixture.camera, &fixture.resources);
        pass.render(&mut context, &[call], &mut LightingStrategy::default());

        let draw = &context.draws()[0];
        assert_eq!(draw.uniform("u_alpha_cutoff"), Some(&UniformValue::Float(0.4)));
        assert_eq!(draw.uniform("u_has_emissive_light"), Some(&UniformValue::Bool(true)));
        assert_eq!(draw.texture("u_emissive_texture"), Some(TextureHandle(77)));
    }

    #[test]
    fn test_missing_shader_and_stale_handles_are_skipped() {
        let mut fixture = Fixture::new();
        let call = fixture.call(Material::new());
        let stale = fixture.call(Material::new());
        fixture.resources.remove_material(stale.material);

        let mut context = RecordingContext::new(800, 600).without_shader("singlepass");
        let pass = ForwardPass::new(&fixture.scene, &fixture.camera, &fixture.resources);
        assert_eq!(pass.render(&mut context, &[call, stale], &mut LightingStrategy::default()), 0);
        assert!(context.draws().is_empty());
        assert_eq!(context.current_state(), RenderState::BASELINE);
    }

    #[test]
    fn test_debug_render_mode_draws_once_unlit() {
        let mut fixture = Fixture::new();
        fixture.scene.add_light(LightEntity::new("a", LightType::Point));
        fixture.scene.add_light(LightEntity::new("b", LightType::Point));
        let call = fixture.call(Material::new());
        let mut context = RecordingContext::new(800, 600);
        let mut lighting = LightingStrategy::new(MultiLightMode::MultiPass);

        let pass = ForwardPass::new(&fixture.scene, &fixture.camera, &fixture.resources)
            .with_render_mode(RenderMode::Normal);
        pass.render(&mut context, &[call], &mut lighting);
        assert_eq!(context.draws().len(), 1);
        assert_eq!(context.draws()[0].shader, "normal");
        assert!(context.draws()[0].uniform("u_light_color").is_none());
    }

    #[test]
    fn test_shadow_map_view_quarter_viewport() {
        let mut context = RecordingContext::new(800, 600);
        let white = Vec3::new(1.0, 1.0, 1.0);
        let mut light =
            LightEntity::directional("sun", Vec3::new(0.0, 10.0, 0.0), Vec3::zeros(), white, 1.0);
        assert!(!render_shadow_map_view(&mut context, &light));

        let shadow_map = light.ensure_shadow_map(&mut context, 256).unwrap();
        assert!(render_shadow_map_view(&mut context, &light));

        let draw = &context.draws()[0];
        assert_eq!(draw.shader, "depth");
        assert_eq!(draw.viewport, Viewport { x: 0, y: 0, width: 400, height: 300 });
        assert_eq!(draw.texture("u_texture"), shadow_map.depth_texture(&context));
        assert_eq!(
            draw.uniform("u_camera_nearfar"),
            Some(&UniformValue::Vec2(Vec2::new(light.shadow_camera.near, light.shadow_camera.far)))
        );
        assert!(!draw.state.depth_test);
        assert_eq!(context.current_state(), RenderState::BASELINE);
    }
}
