//! # Renderer Configuration
//!
//! Settings the [`Renderer`](crate::scene::Renderer) is built from. Every
//! field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```toml
//! pipeline_mode = "Deferred"
//! show_gbuffers = true
//! shadow_map_size = 2048
//! ```

use serde::{Deserialize, Serialize};

use crate::render::pipeline::{MultiLightMode, PipelineMode, RenderMode};

pub use crate::config::{Config, ConfigError};

/// Largest accepted shadow-map edge in pixels
pub const MAX_SHADOW_MAP_SIZE: u32 = 16384;

/// # Renderer Configuration
///
/// Pipeline selection, multi-light strategy and debug views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Forward or deferred pipeline
    pub pipeline_mode: PipelineMode,
    /// Initial multi-light strategy
    pub multi_light_mode: MultiLightMode,
    /// Lit output or a debug view
    pub render_mode: RenderMode,
    /// Show the G-buffer targets in quadrants (deferred only)
    pub show_gbuffers: bool,
    /// Show the selected light's shadow map (forward only)
    pub show_shadow_map: bool,
    /// Light whose shadow map is shown
    pub selected_light: usize,
    /// Additive per-light passes after the deferred resolve
    pub deferred_direct_lighting: bool,
    /// Fixed shadow-map edge in pixels; sized from the window when absent
    pub shadow_map_size: Option<u32>,
    /// Clear color of the G-buffer color targets (RGBA)
    pub gbuffer_clear_color: [f32; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            pipeline_mode: PipelineMode::Forward,
            multi_light_mode: MultiLightMode::SinglePass,
            render_mode: RenderMode::Lit,
            show_gbuffers: false,
            show_shadow_map: false,
            selected_light: 0,
            deferred_direct_lighting: false,
            shadow_map_size: None,
            gbuffer_clear_color: [0.0; 4],
        }
    }
}

impl Config for RendererConfig {}

impl RendererConfig {
    /// Set the pipeline
    pub fn with_pipeline_mode(mut self, pipeline_mode: PipelineMode) -> Self {
        self.pipeline_mode = pipeline_mode;
        self
    }

    /// Set the initial multi-light strategy
    pub fn with_multi_light_mode(mut self, multi_light_mode: MultiLightMode) -> Self {
        self.multi_light_mode = multi_light_mode;
        self
    }

    /// Use a fixed shadow-map size
    pub fn with_shadow_map_size(mut self, size: u32) -> Self {
        self.shadow_map_size = Some(size);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(size) = self.shadow_map_size {
            if size == 0 {
                return Err(ConfigError::Validation(
                    "Shadow map size must be at least 1".to_string(),
                ));
            }
            if size > MAX_SHADOW_MAP_SIZE {
                return Err(ConfigError::Validation(format!(
                    "Shadow map size {size} exceeds {MAX_SHADOW_MAP_SIZE}"
                )));
            }
        }

        if self
            .gbuffer_clear_color
            .iter()
            .any(|channel| !channel.is_finite() || !(0.0..=1.0).contains(channel))
        {
            return Err(ConfigError::Validation(format!(
                "G-buffer clear color {:?} must have channels in [0, 1]",
                self.gbuffer_clear_color
            )));
        }

        Ok(())
    }
}
