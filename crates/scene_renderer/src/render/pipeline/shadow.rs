//! Shadow-map pass
//!
//! Before the main pass every shadow-casting light re-derives its shadow
//! camera from its current type, range, cone and area, then renders the
//! scene as seen from that camera into its own depth-only target. Only depth
//! is written; blended calls are left out. Point lights have no shadow
//! projection and are skipped.

use crate::foundation::math::Vec4;
use crate::render::context::{ClearFlags, GraphicsContext, Primitive};
use crate::render::framebuffer::ShadowMap;
use crate::render::pipeline::shaders;
use crate::render::primitives::Camera;
use crate::render::resources::ResourceRegistry;
use crate::render::state::{RenderState, StateScope};
use crate::render::RenderResult;
use crate::scene::collector::RenderCallCollector;
use crate::scene::render_queue::{sort_calls, RenderCall};
use crate::scene::world::Scene;

/// Renders the shadow maps of all lights, reusing one call list
#[derive(Debug, Default)]
pub struct ShadowRenderer {
    collector: RenderCallCollector,
    calls: Vec<RenderCall>,
    map_size: Option<u32>,
}

impl ShadowRenderer {
    /// Shadow renderer with square maps of `map_size` pixels, or sized to
    /// the larger window dimension when `None`
    pub fn new(map_size: Option<u32>) -> Self {
        Self { map_size, ..Self::default() }
    }

    /// Calls drawn into the last shadow map
    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    /// Render one shadow map per shadow-casting light
    ///
    /// Returns how many shadow maps were rendered. Fails only if a shadow
    /// map target cannot be created.
    pub fn render(
        &mut self,
        context: &mut dyn GraphicsContext,
        scene: &mut Scene,
        resources: &ResourceRegistry,
    ) -> RenderResult<usize> {
        let size = self.map_size.unwrap_or_else(|| {
            let (width, height) = context.window_size();
            width.max(height)
        });

        let mut rendered = 0;
        for index in 0..scene.lights.len() {
            let light = &mut scene.lights[index];
            if !light.light_type.casts_shadows() {
                log::trace!("Light '{}' is a point light, no shadow map", light.common.name);
                continue;
            }

            // Projection tracks the current type, range, cone and area
            light.configure_shadow_camera();
            let camera = light.shadow_camera.clone();
            let shadow_map = light.ensure_shadow_map(context, size)?;

            self.collector.collect(scene, &camera, resources, &mut self.calls);
            sort_calls(&mut self.calls);
            render_depth_pass(context, &shadow_map, &camera, &self.calls, resources);
            rendered += 1;
        }
        Ok(rendered)
    }
}

/// Draw the non-blended `calls` depth-only into `shadow_map`
///
/// Leaves the display bound and the baseline state applied. Returns the
/// number of calls drawn.
pub fn render_depth_pass(
    context: &mut dyn GraphicsContext,
    shadow_map: &ShadowMap,
    camera: &Camera,
    calls: &[RenderCall],
    resources: &ResourceRegistry,
) -> usize {
    context.bind_render_target(Some(shadow_map.target));

    let drawn = {
        let mut scope = StateScope::new(context, RenderState::DEPTH_ONLY);
        scope.clear(ClearFlags::DEPTH, Vec4::zeros());

        if scope.enable_shader(shaders::MESH) {
            scope.set_uniform("u_viewprojection", camera.get_view_projection_matrix().into());
            scope.set_uniform("u_camera_position", camera.eye.into());

            let mut drawn = 0;
            for call in calls.iter().filter(|call| !call.is_blended()) {
                let Some(mesh) = resources.mesh(call.mesh).filter(|mesh| !mesh.is_empty()) else {
                    continue;
                };
                scope.set_uniform("u_model", call.model.into());
                scope.draw_mesh(call.mesh, mesh.vertex_count, Primitive::Triangles);
                drawn += 1;
            }
            scope.disable_shader();
            drawn
        } else {
            log::warn!("Shader '{}' not available, shadow map left empty", shaders::MESH);
            0
        }
    };

    context.bind_render_target(None);
    drawn
}
