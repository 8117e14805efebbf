//! # Render Pipelines
//!
//! Passes the renderer runs every frame, all driving a [`GraphicsContext`]
//! in strict program order:
//!
//! - **shadow**: one depth-only pass per shadow-casting light
//! - **forward**: every render call shaded straight into the display
//! - **deferred**: surface attributes into the G-buffer, then a full-screen resolve
//! - **lighting**: how lights are applied to a forward draw
//!
//! Every pass leaves the context at [`RenderState::BASELINE`] with no
//! render target bound, so whatever runs next starts from a known state.
//!
//! [`GraphicsContext`]: crate::render::GraphicsContext
//! [`RenderState::BASELINE`]: crate::render::RenderState::BASELINE

use serde::{Deserialize, Serialize};

pub mod deferred;
pub mod forward;
pub mod lighting;
pub mod shadow;

pub use deferred::{DeferredOptions, DeferredStats};
pub use forward::ForwardPass;
pub use lighting::{LightingStrategy, MAX_LIGHTS};

/// Shader names the pipelines look up
pub mod shaders {
    /// Plain transform shader used for depth-only passes
    pub const MESH: &str = "mesh";
    /// Linearized depth visualization
    pub const DEPTH: &str = "depth";
    /// Textured full-screen quad
    pub const SCREEN: &str = "screen";
    /// Deferred geometry pass
    pub const GBUFFERS: &str = "gbuffers";
    /// Deferred resolve pass
    pub const DEFERRED: &str = "deferred";
    /// Additive per-light deferred pass
    pub const DEFERRED_LIGHT: &str = "deferred_light";
    /// All lights in one invocation
    pub const SINGLEPASS: &str = "singlepass";
    /// One light per invocation
    pub const LIGHT: &str = "light";
}

/// Which pipeline renders the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PipelineMode {
    /// Shade every render call directly into the display
    #[default]
    Forward,
    /// Write a G-buffer, then resolve lighting in a full-screen pass
    Deferred,
}

impl PipelineMode {
    /// The other pipeline
    pub fn toggled(self) -> Self {
        match self {
            Self::Forward => Self::Deferred,
            Self::Deferred => Self::Forward,
        }
    }
}

/// How lights are applied to a forward draw
///
/// The mode also selects the shader every lit draw uses; see
/// [`MultiLightMode::shader_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MultiLightMode {
    /// All lights packed into uniform arrays, one draw
    #[default]
    SinglePass,
    /// One additive draw per light
    MultiPass,
    /// Only the first light, one draw
    NoMultiLight,
}

impl MultiLightMode {
    /// Next mode in the cycle single-pass → multi-pass → no-multi-light
    pub fn next(self) -> Self {
        match self {
            Self::SinglePass => Self::MultiPass,
            Self::MultiPass => Self::NoMultiLight,
            Self::NoMultiLight => Self::SinglePass,
        }
    }

    /// Shader variant lit draws use in this mode
    pub fn shader_name(self) -> &'static str {
        match self {
            Self::SinglePass => shaders::SINGLEPASS,
            Self::MultiPass | Self::NoMultiLight => shaders::LIGHT,
        }
    }
}

/// What the forward pipeline outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// Full lighting through the active multi-light strategy
    #[default]
    Lit,
    /// Base color texture only
    Texture,
    /// Surface normals
    Normal,
    /// Occlusion channel
    Occlusion,
    /// Texture coordinates
    Uvs,
}

impl RenderMode {
    /// Unlit debug shader replacing the lit variant, if any
    pub fn shader_override(self) -> Option<&'static str> {
        match self {
            Self::Lit => None,
            Self::Texture => Some("texture"),
            Self::Normal => Some("normal"),
            Self::Occlusion => Some("occlusion"),
            Self::Uvs => Some("uvs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_light_mode_cycles_with_period_three() {
        let modes =
            [MultiLightMode::SinglePass, MultiLightMode::MultiPass, MultiLightMode::NoMultiLight];
        for start in modes {
            assert_eq!(start.next().next().next(), start);
            assert_ne!(start.next(), start);
        }
    }

    #[test]
    fn test_shader_names_follow_mode() {
        assert_eq!(MultiLightMode::SinglePass.shader_name(), "singlepass");
        assert_eq!(MultiLightMode::MultiPass.shader_name(), "light");
        assert_eq!(MultiLightMode::NoMultiLight.shader_name(), "light");
    }

    #[test]
    fn test_pipeline_toggle() {
        assert_eq!(PipelineMode::Forward.toggled(), PipelineMode::Deferred);
        assert_eq!(PipelineMode::Forward.toggled().toggled(), PipelineMode::Forward);
    }

    #[test]
    fn test_only_lit_mode_uses_lighting() {
        assert!(RenderMode::Lit.shader_override().is_none());
        assert_eq!(RenderMode::Normal.shader_override(), Some("normal"));
    }
}
