//! Multi-light strategies
//!
//! A lit forward draw is finished by a [`LightingStrategy`]: the material
//! and object uniforms are already uploaded and the shader named by
//! [`MultiLightMode::shader_name`] is active. The strategy uploads light
//! uniforms and issues one or more draws of the mesh.

use crate::foundation::math::Vec3;
use crate::render::context::{GraphicsContext, Primitive};
use crate::render::pipeline::MultiLightMode;
use crate::render::resources::MeshHandle;
use crate::render::state::{BlendFunc, DepthFunc, RenderState};
use crate::render::uniforms::UniformValue;
use crate::scene::light::{LightEntity, SHADOW_MAP_SLOT};

/// Most lights the single-pass shader resolves
pub const MAX_LIGHTS: usize = 5;

/// One mesh draw to light
#[derive(Debug, Clone, Copy)]
pub struct LitDraw {
    /// Mesh to submit
    pub mesh: MeshHandle,
    /// Vertices to submit
    pub vertex_count: usize,
    /// State the material was set up with
    pub state: RenderState,
    /// Whether the material blends
    pub blended: bool,
}

/// Multi-light mode together with its per-mode bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightingStrategy {
    mode: MultiLightMode,
    truncation_reported: bool,
}

impl LightingStrategy {
    /// Strategy for `mode`
    pub fn new(mode: MultiLightMode) -> Self {
        Self { mode, truncation_reported: false }
    }

    /// Active mode
    pub fn mode(&self) -> MultiLightMode {
        self.mode
    }

    /// Shader lit draws use
    pub fn shader_name(&self) -> &'static str {
        self.mode.shader_name()
    }

    /// Switch to `mode`
    pub fn set_mode(&mut self, mode: MultiLightMode) {
        self.mode = mode;
    }

    /// Advance to the next mode and return it
    pub fn cycle(&mut self) -> MultiLightMode {
        self.mode = self.mode.next();
        log::info!("Multi-light mode {:?}, shader '{}'", self.mode, self.shader_name());
        self.mode
    }

    /// Upload light uniforms and draw; returns the number of draws issued
    ///
    /// With no lights every mode still draws once, without any light
    /// contribution.
    pub fn apply(
        &mut self,
        context: &mut dyn GraphicsContext,
        lights: &[LightEntity],
        draw: &LitDraw,
    ) -> usize {
        match self.mode {
            MultiLightMode::SinglePass => self.apply_single_pass(context, lights, draw),
            MultiLightMode::MultiPass => apply_multi_pass(context, lights, draw),
            MultiLightMode::NoMultiLight => apply_first_light(context, lights, draw),
        }
    }

    fn apply_single_pass(
        &mut self,
        context: &mut dyn GraphicsContext,
        lights: &[LightEntity],
        draw: &LitDraw,
    ) -> usize {
        if lights.len() > MAX_LIGHTS && !self.truncation_reported {
            log::warn!(
                "Scene has {} lights, single-pass lighting uses the first {}",
                lights.len(),
                MAX_LIGHTS
            );
            self.truncation_reported = true;
        }

        let used = &lights[..lights.len().min(MAX_LIGHTS)];
        PackedLights::pack(used).upload(context);
        submit(context, draw);
        1
    }
}

fn apply_multi_pass(
    context: &mut dyn GraphicsContext,
    lights: &[LightEntity],
    draw: &LitDraw,
) -> usize {
    let base = draw.state.with_depth_func(DepthFunc::LessEqual);

    if lights.is_empty() {
        context.apply_state(&base);
        set_no_light_uniforms(context);
        submit(context, draw);
    }

    for (index, light) in lights.iter().enumerate() {
        let blend = if draw.blended {
            Some(BlendFunc::ADDITIVE)
        } else if index == 0 {
            None
        } else {
            Some(BlendFunc::ADDITIVE_ALPHA)
        };
        context.apply_state(&base.with_blend(blend));

        if index > 0 {
            context.set_uniform("u_emissive_factor", Vec3::zeros().into());
            context.set_uniform("u_ambient_light", Vec3::zeros().into());
        }
        light.set_uniforms(context);
        submit(context, draw);
    }

    context.apply_state(&draw.state.with_blend(None).with_depth_func(DepthFunc::Less));
    lights.len().max(1)
}

fn apply_first_light(
    context: &mut dyn GraphicsContext,
    lights: &[LightEntity],
    draw: &LitDraw,
) -> usize {
    match lights.first() {
        Some(light) => light.set_uniforms(context),
        None => set_no_light_uniforms(context),
    }
    submit(context, draw);
    1
}

fn submit(context: &mut dyn GraphicsContext, draw: &LitDraw) {
    context.draw_mesh(draw.mesh, draw.vertex_count, Primitive::Triangles);
}

/// Uniforms of a light that contributes nothing
fn set_no_light_uniforms(context: &mut dyn GraphicsContext) {
    context.set_uniform("u_light_color", Vec3::zeros().into());
    context.set_uniform("u_intensity", 0.0_f32.into());
    context.set_uniform("u_cast_shadows", false.into());
    let white = context.white_texture();
    context.set_texture("u_shadowmap", white, SHADOW_MAP_SLOT);
}

/// Parallel light arrays for the single-pass shader
#[derive(Debug, Default)]
struct PackedLights {
    colors: Vec<[f32; 3]>,
    positions: Vec<[f32; 3]>,
    directions: Vec<[f32; 3]>,
    types: Vec<i32>,
    max_distances: Vec<f32>,
    cone_angles: Vec<f32>,
    intensities: Vec<f32>,
}

impl PackedLights {
    fn pack(lights: &[LightEntity]) -> Self {
        let mut packed = Self::default();
        for light in lights {
            packed.colors.push(light.color.into());
            packed.positions.push(light.position().into());
            packed.directions.push(light.direction().into());
            packed.types.push(light.light_type.as_uniform());
            packed.max_distances.push(light.max_distance);
            packed.cone_angles.push(light.cone_angle);
            packed.intensities.push(light.intensity);
        }
        packed
    }

    fn upload(self, context: &mut dyn GraphicsContext) {
        let count = self.types.len() as i32;
        context.set_uniform("u_light_color", flatten(&self.colors));
        context.set_uniform("u_light_position", flatten(&self.positions));
        context.set_uniform("u_light_direction", flatten(&self.directions));
        context.set_uniform("u_light_type", UniformValue::IntArray(self.types));
        context.set_uniform("u_max_distance", UniformValue::FloatArray(self.max_distances));
        context.set_uniform("u_cone_angle", UniformValue::FloatArray(self.cone_angles));
        context.set_uniform("u_light_intensity", UniformValue::FloatArray(self.intensities));
        context.set_uniform("u_num_lights", count.into());
    }
}

fn flatten(vectors: &[[f32; 3]]) -> UniformValue {
    UniformValue::Vec3Array(bytemuck::cast_slice::<[f32; 3], f32>(vectors).to_vec())
}
