//! # Renderer
//!
//! Frame orchestration: collect and sort the render calls of a scene, render
//! every light's shadow map, then run the forward or the deferred pipeline.
//!
//! ```text
//! collect + sort (main camera)
//!      ↓
//! shadow maps (one collect + sort + depth pass per light)
//!      ↓
//! forward  ─or─  deferred (G-buffer + resolve)
//!      ↓
//! optional debug view (shadow map / G-buffer quadrants)
//! ```
//!
//! The renderer owns the per-frame buffers and the G-buffer; scenes and
//! resources are borrowed for the duration of a frame.

use crate::core::config::RendererConfig;
use crate::foundation::math::Vec4;
use crate::render::framebuffer::{GBuffer, ResourceSlot};
use crate::render::pipeline::deferred::{DeferredOptions, DeferredPass};
use crate::render::pipeline::forward::{render_shadow_map_view, ForwardPass};
use crate::render::pipeline::lighting::LightingStrategy;
use crate::render::pipeline::shadow::ShadowRenderer;
use crate::render::pipeline::{MultiLightMode, PipelineMode, RenderMode};
use crate::render::primitives::Camera;
use crate::render::resources::ResourceRegistry;
use crate::render::{GraphicsContext, RenderError, RenderResult, RenderState};
use crate::scene::collector::RenderCallCollector;
use crate::scene::render_queue::{RenderCall, RenderQueue};
use crate::scene::world::Scene;

/// Counters of one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Render calls collected for the main camera
    pub collected: usize,
    /// Calls frustum-culled for the main camera
    pub culled: usize,
    /// Calls drawn by the main pipeline
    pub drawn: usize,
    /// Blended calls the deferred pipeline left out
    pub skipped_translucent: usize,
    /// Shadow maps rendered
    pub shadow_maps: usize,
}

/// Frame-level renderer
#[derive(Debug)]
pub struct Renderer {
    pipeline_mode: PipelineMode,
    render_mode: RenderMode,
    lighting: LightingStrategy,
    show_shadow_map: bool,
    selected_light: usize,
    deferred_options: DeferredOptions,
    collector: RenderCallCollector,
    queue: RenderQueue,
    shadows: ShadowRenderer,
    gbuffer: ResourceSlot<GBuffer>,
    frame_count: u64,
}

impl Renderer {
    /// Forward renderer with single-pass lighting
    pub fn new() -> Self {
        Self {
            pipeline_mode: PipelineMode::Forward,
            render_mode: RenderMode::Lit,
            lighting: LightingStrategy::new(MultiLightMode::SinglePass),
            show_shadow_map: false,
            selected_light: 0,
            deferred_options: DeferredOptions::default(),
            collector: RenderCallCollector::new(),
            queue: RenderQueue::new(),
            shadows: ShadowRenderer::new(None),
            gbuffer: ResourceSlot::Uninitialized,
            frame_count: 0,
        }
    }

    /// Renderer built from a validated configuration
    pub fn from_config(config: &RendererConfig) -> RenderResult<Self> {
        config
            .validate()
            .map_err(|e| RenderError::InvalidConfiguration(e.to_string()))?;

        let [r, g, b, a] = config.gbuffer_clear_color;
        let mut renderer = Self::new();
        renderer.pipeline_mode = config.pipeline_mode;
        renderer.render_mode = config.render_mode;
        renderer.lighting = LightingStrategy::new(config.multi_light_mode);
        renderer.show_shadow_map = config.show_shadow_map;
        renderer.selected_light = config.selected_light;
        renderer.deferred_options = DeferredOptions {
            show_gbuffers: config.show_gbuffers,
            direct_lighting: config.deferred_direct_lighting,
            gbuffer_clear_color: Vec4::new(r, g, b, a),
        };
        renderer.shadows = ShadowRenderer::new(config.shadow_map_size);

        log::info!(
            "Renderer configured: {:?} pipeline, {:?} lighting, {:?} output",
            renderer.pipeline_mode,
            config.multi_light_mode,
            renderer.render_mode
        );
        Ok(renderer)
    }

    /// Render `scene` from its main camera
    pub fn render_frame(
        &mut self,
        context: &mut dyn GraphicsContext,
        scene: &mut Scene,
        resources: &ResourceRegistry,
    ) -> RenderResult<FrameStats> {
        let camera = scene.main_camera.clone();
        self.render_scene(context, scene, &camera, resources)
    }

    /// Render `scene` from `camera`
    ///
    /// Lights are mutable because their shadow cameras follow them and their
    /// shadow maps are created on first use. Fails only when an off-screen
    /// target cannot be created.
    pub fn render_scene(
        &mut self,
        context: &mut dyn GraphicsContext,
        scene: &mut Scene,
        camera: &Camera,
        resources: &ResourceRegistry,
    ) -> RenderResult<FrameStats> {
        let mut stats = FrameStats {
            collected: self.collector.collect(scene, camera, resources, self.queue.calls_mut()),
            culled: self.collector.stats().culled,
            ..FrameStats::default()
        };
        self.queue.sort();

        stats.shadow_maps = self.shadows.render(context, scene, resources)?;

        let scene: &Scene = scene;
        match self.pipeline_mode {
            PipelineMode::Forward => {
                let pass =
                    ForwardPass::new(scene, camera, resources).with_render_mode(self.render_mode);
                stats.drawn = pass.render(context, self.queue.calls(), &mut self.lighting);

                if self.show_shadow_map {
                    match scene.lights.get(self.selected_light) {
                        Some(light) => {
                            render_shadow_map_view(context, light);
                        }
                        None => {
                            log::debug!(
                                "No light {} to show the shadow map of",
                                self.selected_light
                            );
                        }
                    }
                }
            }
            PipelineMode::Deferred => {
                let pass = DeferredPass::new(scene, camera, resources, self.deferred_options);
                let deferred = pass.render(context, self.queue.calls(), &mut self.gbuffer)?;
                stats.drawn = deferred.drawn;
                stats.skipped_translucent = deferred.skipped_translucent;
            }
        }

        context.bind_render_target(None);
        context.apply_state(&RenderState::BASELINE);

        self.frame_count += 1;
        log::trace!("Frame {}: {:?}", self.frame_count, stats);
        Ok(stats)
    }

    /// Advance the multi-light mode; the lit shader changes with it
    pub fn change_multi_light_rendering(&mut self) -> MultiLightMode {
        self.lighting.cycle()
    }

    /// Active multi-light mode
    pub fn multi_light_mode(&self) -> MultiLightMode {
        self.lighting.mode()
    }

    /// Shader lit forward draws use
    pub fn shader_name(&self) -> &'static str {
        self.lighting.shader_name()
    }

    /// Active pipeline
    pub fn pipeline_mode(&self) -> PipelineMode {
        self.pipeline_mode
    }

    /// Select the pipeline for the following frames
    pub fn set_pipeline_mode(&mut self, pipeline_mode: PipelineMode) {
        self.pipeline_mode = pipeline_mode;
    }

    /// Switch between forward and deferred
    pub fn toggle_pipeline_mode(&mut self) -> PipelineMode {
        self.pipeline_mode = self.pipeline_mode.toggled();
        log::info!("Pipeline {:?}", self.pipeline_mode);
        self.pipeline_mode
    }

    /// Active render mode
    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// Select the forward output
    pub fn set_render_mode(&mut self, render_mode: RenderMode) {
        self.render_mode = render_mode;
    }

    /// Toggle the G-buffer quadrant view
    pub fn set_show_gbuffers(&mut self, show: bool) {
        self.deferred_options.show_gbuffers = show;
    }

    /// Toggle the shadow-map view
    pub fn set_show_shadow_map(&mut self, show: bool) {
        self.show_shadow_map = show;
    }

    /// Choose the light whose shadow map is shown
    pub fn select_light(&mut self, index: usize) {
        self.selected_light = index;
    }

    /// Toggle the additive per-light deferred passes
    pub fn set_deferred_direct_lighting(&mut self, enabled: bool) {
        self.deferred_options.direct_lighting = enabled;
    }

    /// Render calls of the last frame, in draw order
    pub fn render_calls(&self) -> &[RenderCall] {
        self.queue.calls()
    }

    /// The G-buffer, once the deferred pipeline has created it
    pub fn gbuffer(&self) -> Option<&GBuffer> {
        self.gbuffer.get()
    }

    /// Frames rendered so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
