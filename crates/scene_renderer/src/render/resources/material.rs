//! Material definitions
//!
//! A material carries the alpha handling that decides draw order and blend
//! state, plus the PBR factors and texture channels uploaded per draw.

use crate::foundation::math::{Vec3, Vec4};
use crate::render::context::TextureHandle;

/// Alpha handling modes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    /// No transparency
    #[default]
    Opaque,
    /// Alpha testing with cutoff value
    Mask(f32),
    /// Alpha blending
    Blend,
}

impl AlphaMode {
    /// Whether geometry with this mode is alpha blended
    pub fn is_blended(self) -> bool {
        matches!(self, Self::Blend)
    }

    /// Transparency class used for ordering (blend sorts last)
    pub fn sort_class(self) -> u8 {
        match self {
            Self::Opaque => 0,
            Self::Mask(_) => 1,
            Self::Blend => 2,
        }
    }

    /// Cutoff uploaded to shaders; zero unless the mode is `Mask`
    pub fn alpha_cutoff(self) -> f32 {
        match self {
            Self::Mask(cutoff) => cutoff,
            _ => 0.0,
        }
    }
}

/// Optional texture channels of a material
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialTextures {
    /// Albedo / base color texture
    pub color: Option<TextureHandle>,
    /// Emissive texture
    pub emissive: Option<TextureHandle>,
    /// Metallic (B) / roughness (G) texture
    pub metallic_roughness: Option<TextureHandle>,
    /// Tangent-space normal map
    pub normal: Option<TextureHandle>,
    /// Ambient occlusion texture
    pub occlusion: Option<TextureHandle>,
}

/// Texture channels with every missing channel replaced by a fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTextures {
    /// Albedo / base color texture
    pub color: TextureHandle,
    /// Emissive texture
    pub emissive: TextureHandle,
    /// Metallic-roughness texture
    pub metallic_roughness: TextureHandle,
    /// Normal map
    pub normal: TextureHandle,
    /// Occlusion texture
    pub occlusion: TextureHandle,
    /// Whether the material supplied its own emissive texture
    pub has_emissive: bool,
}

impl ResolvedTextures {
    /// Channels paired with their sampler names, in binding-slot order
    pub fn bindings(&self) -> [(&'static str, TextureHandle); 5] {
        [
            ("u_color_texture", self.color),
            ("u_emissive_texture", self.emissive),
            ("u_metallic_roughness_texture", self.metallic_roughness),
            ("u_normal_texture", self.normal),
            ("u_occlusion_texture", self.occlusion),
        ]
    }
}

impl MaterialTextures {
    /// Replace every missing channel with `fallback`
    pub fn resolve(&self, fallback: TextureHandle) -> ResolvedTextures {
        ResolvedTextures {
            color: self.color.unwrap_or(fallback),
            emissive: self.emissive.unwrap_or(fallback),
            metallic_roughness: self.metallic_roughness.unwrap_or(fallback),
            normal: self.normal.unwrap_or(fallback),
            occlusion: self.occlusion.unwrap_or(fallback),
            has_emissive: self.emissive.is_some(),
        }
    }
}

/// Surface description referenced by scene nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Optional name for debugging
    pub name: Option<String>,
    /// Alpha handling
    pub alpha_mode: AlphaMode,
    /// Render both faces of every triangle
    pub two_sided: bool,
    /// Base color (RGBA)
    pub color: Vec4,
    /// Emissive factor (RGB)
    pub emissive_factor: Vec3,
    /// Texture channels
    pub textures: MaterialTextures,
}

impl Material {
    /// Create an opaque white material
    pub fn new() -> Self {
        Self {
            name: None,
            alpha_mode: AlphaMode::Opaque,
            two_sided: false,
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            emissive_factor: Vec3::zeros(),
            textures: MaterialTextures::default(),
        }
    }

    /// Set the material name for debugging
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the alpha mode
    #[must_use]
    pub fn with_alpha_mode(mut self, alpha_mode: AlphaMode) -> Self {
        self.alpha_mode = alpha_mode;
        self
    }

    /// Set the two-sided flag
    #[must_use]
    pub fn with_two_sided(mut self, two_sided: bool) -> Self {
        self.two_sided = two_sided;
        self
    }

    /// Set the base color
    #[must_use]
    pub fn with_color(mut self, r: f32, g: f32, b: f32, a: f32) -> Self {
        self.color = Vec4::new(r, g, b, a);
        self
    }

    /// Set the emissive factor
    #[must_use]
    pub fn with_emissive(mut self, emissive: Vec3) -> Self {
        self.emissive_factor = emissive;
        self
    }

    /// Set the texture channels
    #[must_use]
    pub fn with_textures(mut self, textures: MaterialTextures) -> Self {
        self.textures = textures;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}
