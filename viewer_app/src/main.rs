//! Headless scene viewer
//!
//! Renders the demo scene for a number of frames against the recording
//! graphics context, cycling pipelines and multi-light strategies the way
//! the interactive key bindings would, and logs what every frame did.
//!
//! Usage: `scene_viewer [config.toml|config.ron]`

mod demo_scene;

use scene_renderer::config::{Config, ConfigError};
use scene_renderer::foundation::logging;
use scene_renderer::prelude::*;
use serde::{Deserialize, Serialize};

use demo_scene::DemoScene;

const DEFAULT_CONFIG_PATH: &str = "scene_viewer.toml";

/// Viewer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ApplicationConfig {
    /// Log filter used when `RUST_LOG` is not set
    log_level: String,
    /// Display width in pixels
    window_width: u32,
    /// Display height in pixels
    window_height: u32,
    /// Frames to render
    frames: u32,
    /// Frames between pipeline or lighting-mode switches; 0 never switches
    switch_interval: u32,
    /// Renderer settings
    renderer: RendererConfig,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window_width: 1280,
            window_height: 720,
            frames: 12,
            switch_interval: 2,
            renderer: RendererConfig::default(),
        }
    }
}

impl Config for ApplicationConfig {}

#[derive(Debug, thiserror::Error)]
enum ViewerError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("rendering: {0}")]
    Render(#[from] RenderError),
}

fn run(config: &ApplicationConfig) -> Result<(), ViewerError> {
    config.renderer.validate()?;

    let DemoScene { mut scene, resources } =
        DemoScene::build(config.window_width, config.window_height);
    let mut context = RecordingContext::new(config.window_width, config.window_height);
    let mut renderer = Renderer::from_config(&config.renderer)?;

    for frame in 0..config.frames {
        if config.switch_interval > 0 && frame > 0 && frame % config.switch_interval == 0 {
            // Alternate between the two key bindings: lighting mode, then pipeline
            if (frame / config.switch_interval) % 2 == 1 {
                renderer.change_multi_light_rendering();
            } else {
                renderer.toggle_pipeline_mode();
            }
        }

        let bulb = scene.lights.iter_mut().find(|light| light.light_type == LightType::Point);
        if let Some(bulb) = bulb {
            let phase = frame as f32 * 0.3;
            bulb.change_position(Vec3::new(phase.cos(), 0.0, phase.sin()) * 0.5);
        }

        context.reset();
        let stats = renderer.render_frame(&mut context, &mut scene, &resources)?;
        log::info!(
            "frame {frame:>3} | {:?} {:<12} | collected {:>2} culled {:>2} drawn {:>2} \
             skipped {:>2} shadows {} | {} draws",
            renderer.pipeline_mode(),
            renderer.shader_name(),
            stats.collected,
            stats.culled,
            stats.drawn,
            stats.skipped_translucent,
            stats.shadow_maps,
            context.draws().len()
        );
    }

    log::info!(
        "Rendered {} frames, {} render targets created",
        renderer.frame_count(),
        context.render_target_count()
    );
    Ok(())
}

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = match ApplicationConfig::load_or_default(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            std::process::exit(1);
        }
    };

    logging::init_with_level(&config.log_level);
    log::info!("Starting scene viewer ({}x{})", config.window_width, config.window_height);

    if let Err(e) = run(&config) {
        log::error!("Scene viewer failed: {e}");
        std::process::exit(1);
    }
}
