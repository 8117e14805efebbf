//! Scene lights and their shadow-casting cameras
//!
//! Every light owns a camera that renders the scene from the light's point
//! of view and a depth-only target that camera renders into. The camera's
//! projection follows the light type; its view is re-derived from the
//! light's model transform before every shadow pass.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::context::GraphicsContext;
use crate::render::framebuffer::{ResourceSlot, ShadowMap};
use crate::render::primitives::Camera;
use crate::render::RenderResult;
use crate::scene::entity::{EntityCommon, EntityDescription};

/// Texture slot the shadow map is bound to
pub const SHADOW_MAP_SLOT: u32 = 8;

/// Default depth bias applied when sampling the shadow map
pub const DEFAULT_SHADOW_BIAS: f32 = 0.0001;

/// Light types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LightType {
    /// Directional light (like sunlight)
    Directional,
    /// Point light (like a lightbulb)
    Point,
    /// Spot light (like a flashlight)
    Spot,
}

impl LightType {
    /// Parse the scene-description name (`"DIRECTIONAL"`, `"POINT"`, `"SPOT"`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DIRECTIONAL" => Some(Self::Directional),
            "POINT" => Some(Self::Point),
            "SPOT" => Some(Self::Spot),
            _ => None,
        }
    }

    /// Integer id shaders switch on
    pub fn as_uniform(self) -> i32 {
        match self {
            Self::Directional => 0,
            Self::Point => 1,
            Self::Spot => 2,
        }
    }

    /// Whether a shadow camera can be configured for this type
    ///
    /// Point lights would need a cube map and are not supported.
    pub fn casts_shadows(self) -> bool {
        !matches!(self, Self::Point)
    }
}

/// A light placed in the scene
#[derive(Debug, Clone)]
pub struct LightEntity {
    /// Name, model transform and visibility
    pub common: EntityCommon,
    /// Light type
    pub light_type: LightType,
    /// Light color, each channel in [0, 1]
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Distance beyond which the light has no effect
    pub max_distance: f32,
    /// Spot cone angle in radians
    pub cone_angle: f32,
    /// Spot falloff exponent
    pub cone_exp: f32,
    /// Side length of the area a directional light's shadow covers
    pub area_size: f32,
    /// Depth bias applied when sampling the shadow map
    pub shadow_bias: f32,
    /// Camera the shadow map is rendered from
    pub shadow_camera: Camera,
    shadow_map: ResourceSlot<ShadowMap>,
}

impl LightEntity {
    /// Create a light of the given type with neutral parameters
    pub fn new(name: impl Into<String>, light_type: LightType) -> Self {
        let mut light = Self {
            common: EntityCommon::new(name),
            light_type,
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            max_distance: 100.0,
            cone_angle: utils::deg_to_rad(45.0),
            cone_exp: 1.0,
            area_size: 100.0,
            shadow_bias: DEFAULT_SHADOW_BIAS,
            shadow_camera: Camera::default(),
            shadow_map: ResourceSlot::Uninitialized,
        };
        light.configure_shadow_camera();
        light
    }

    /// Create a directional light at `position` shining towards `target`
    pub fn directional(
        name: impl Into<String>,
        position: Vec3,
        target: Vec3,
        color: Vec3,
        intensity: f32,
    ) -> Self {
        let mut light = Self::new(name, LightType::Directional);
        light.color = color;
        light.intensity = intensity;
        light.place(position, target);
        light
    }

    /// Create a point light
    pub fn point(
        name: impl Into<String>,
        position: Vec3,
        color: Vec3,
        intensity: f32,
        max_distance: f32,
    ) -> Self {
        let mut light = Self::new(name, LightType::Point);
        light.color = color;
        light.intensity = intensity;
        light.max_distance = max_distance;
        light.place(position, position - Vec3::y());
        light
    }

    /// Create a spot light; `cone_degrees` is the full cone angle in degrees
    pub fn spot(
        name: impl Into<String>,
        position: Vec3,
        target: Vec3,
        color: Vec3,
        intensity: f32,
        max_distance: f32,
        cone_degrees: f32,
        cone_exp: f32,
    ) -> Self {
        let mut light = Self::new(name, LightType::Spot);
        light.color = color;
        light.intensity = intensity;
        light.max_distance = max_distance;
        light.cone_angle = utils::deg_to_rad(cone_degrees);
        light.cone_exp = cone_exp;
        light.place(position, target);
        light
    }

    /// Set the shadow-covered area of a directional light
    #[must_use]
    pub fn with_area_size(mut self, area_size: f32) -> Self {
        self.area_size = area_size;
        self.configure_shadow_camera();
        self
    }

    /// Set the falloff distance
    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self.configure_shadow_camera();
        self
    }

    fn place(&mut self, position: Vec3, target: Vec3) {
        self.common.model = Mat4::new_translation(&position);
        self.common.model.set_front_and_orthonormalize(target - position);
        self.configure_shadow_camera();
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.common.model.translation()
    }

    /// World-space direction the light points along
    pub fn direction(&self) -> Vec3 {
        self.common.model.front_vector()
    }

    /// Add `delta` to the color, clamping every channel to [0, 1]
    pub fn change_color(&mut self, delta: Vec3) {
        self.color = utils::saturate(self.color + delta);
    }

    /// Move the light by a world-space offset
    pub fn change_position(&mut self, delta: Vec3) {
        self.common.model = Mat4::new_translation(&delta) * self.common.model;
        self.update_shadow_camera_view();
    }

    /// Apply the light fields of a scene description
    ///
    /// Unknown light type names are logged and leave the type unchanged.
    pub fn configure(&mut self, description: &EntityDescription) {
        if let Some(color) = description.color {
            self.color = utils::vec3(color);
        }
        if let Some(intensity) = description.intensity {
            self.intensity = intensity;
        }
        if let Some(name) = description.light_type.as_deref() {
            match LightType::from_name(name) {
                Some(light_type) => self.light_type = light_type,
                None => log::warn!("Light '{}': type {name} not supported", self.common.name),
            }
        }
        if let Some(target) = description.target {
            let front = utils::vec3(target) - self.position();
            self.common.model.set_front_and_orthonormalize(front);
        }
        if let Some(max_distance) = description.max_dist {
            self.max_distance = max_distance;
        }
        if let Some(cone_angle) = description.cone_angle {
            self.cone_angle = utils::deg_to_rad(cone_angle);
        }
        if let Some(cone_exp) = description.cone_exp {
            self.cone_exp = cone_exp;
        }
        if let Some(shadow_bias) = description.shadow_bias {
            self.shadow_bias = shadow_bias;
        }
        if let Some(area_size) = description.area_size {
            self.area_size = area_size;
        }

        self.configure_shadow_camera();
    }

    /// Derive the shadow camera projection from the light type, then its view
    ///
    /// Directional lights get an orthographic box of `area_size` across,
    /// spanning `-max_distance..max_distance` along the light direction. Spot
    /// lights get a square perspective frustum as wide as the cone. Point
    /// lights keep whatever projection the camera had.
    pub fn configure_shadow_camera(&mut self) {
        match self.light_type {
            LightType::Directional => {
                let half = self.area_size / 2.0;
                let range = self.max_distance;
                self.shadow_camera.set_orthographic(-half, half, -half, half, -range, range);
            }
            LightType::Spot => {
                self.shadow_camera.set_perspective(self.cone_angle, 1.0, 1.0, self.max_distance);
            }
            LightType::Point => {
                log::debug!("Light '{}': point lights have no shadow projection", self.common.name);
            }
        }
        self.update_shadow_camera_view();
    }

    /// Point the shadow camera from the light position along its direction
    pub fn update_shadow_camera_view(&mut self) {
        let position = self.position();
        let front = self.direction();
        // +Y is degenerate as an up hint for lights pointing straight up or down
        let up = if front.normalize().y.abs() > 0.999 { Vec3::z() } else { Vec3::y() };
        self.shadow_camera.look_at(position, position + front, up);
    }

    /// The shadow map, if one has been created
    pub fn shadow_map(&self) -> Option<&ShadowMap> {
        self.shadow_map.get()
    }

    /// Return the shadow map, creating a `size` x `size` target on first use
    pub fn ensure_shadow_map(
        &mut self,
        context: &mut dyn GraphicsContext,
        size: u32,
    ) -> RenderResult<ShadowMap> {
        let label = self.common.name.clone();
        self.shadow_map
            .ensure(|| ShadowMap::create(&mut *context, &label, size))
            .map(|shadow_map| *shadow_map)
    }

    /// Upload this light's uniforms to the active shader
    ///
    /// Lights without a shadow map bind the white texture and clear
    /// `u_cast_shadows`.
    pub fn set_uniforms(&self, context: &mut dyn GraphicsContext) {
        context.set_uniform("u_light_color", self.color.into());
        context.set_uniform("u_light_position", self.position().into());
        context.set_uniform("u_light_type", self.light_type.as_uniform().into());
        context.set_uniform("u_light_direction", self.direction().into());
        context.set_uniform("u_max_distance", self.max_distance.into());
        context.set_uniform("u_cone_angle", self.cone_angle.into());
        context.set_uniform("u_intensity", self.intensity.into());
        context.set_uniform("u_cone_exp", self.cone_exp.into());

        let shadow_viewproj = self.shadow_camera.get_view_projection_matrix();
        context.set_uniform("u_shadow_viewproj", shadow_viewproj.into());
        context.set_uniform("u_shadow_bias", self.shadow_bias.into());
        let shadow_texture = self
            .shadow_map()
            .filter(|_| self.light_type.casts_shadows())
            .and_then(|shadow_map| shadow_map.depth_texture(&*context));
        context.set_uniform("u_cast_shadows", shadow_texture.is_some().into());
        let texture = shadow_texture.unwrap_or_else(|| context.white_texture());
        context.set_texture("u_shadowmap", texture, SHADOW_MAP_SLOT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::primitives::Projection;
    use crate::render::recording::RecordingContext;
    use crate::render::uniforms::UniformValue;
    use approx::assert_relative_eq;

    #[test]
    fn test_directional_shadow_projection_matches_area_and_range() {
        let mut light = LightEntity::new("sun", LightType::Directional);
        let description = EntityDescription {
            light_type: Some("DIRECTIONAL".to_string()),
            area_size: Some(40.0),
            max_dist: Some(75.0),
            ..Default::default()
        };
        light.configure(&description);

        assert_eq!(
            light.shadow_camera.projection,
            Projection::Orthographic { left: -20.0, right: 20.0, bottom: -20.0, top: 20.0 }
        );
        assert_relative_eq!(light.shadow_camera.near, -75.0);
        assert_relative_eq!(light.shadow_camera.far, 75.0);
    }

    #[test]
    fn test_spot_shadow_projection_uses_cone() {
        let light = LightEntity::spot(
            "spot",
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 1.0),
            2.0,
            30.0,
            60.0,
            4.0,
        );
        match light.shadow_camera.projection {
            Projection::Perspective { fov, aspect } => {
                assert_relative_eq!(fov, utils::deg_to_rad(60.0));
                assert_relative_eq!(aspect, 1.0);
            }
            Projection::Orthographic { .. } => {
                panic!("spot light must use a perspective shadow camera")
            }
        }
        assert_relative_eq!(light.shadow_camera.near, 1.0);
        assert_relative_eq!(light.shadow_camera.far, 30.0);
    }

    #[test]
    fn test_point_light_keeps_projection() {
        let mut light =
            LightEntity::point("bulb", Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), 1.0, 10.0);
        let before = light.shadow_camera.projection;
        light.max_distance = 99.0;
        light.configure_shadow_camera();
        assert_eq!(light.shadow_camera.projection, before);
        assert!(!light.light_type.casts_shadows());
    }

    #[test]
    fn test_shadow_view_follows_light() {
        let mut light = LightEntity::directional(
            "sun",
            Vec3::new(0.0, 10.0, 10.0),
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 1.0),
            1.0,
        );
        assert_relative_eq!(light.shadow_camera.eye, Vec3::new(0.0, 10.0, 10.0), epsilon = 1e-5);

        light.change_position(Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(light.shadow_camera.eye, Vec3::new(5.0, 10.0, 10.0), epsilon = 1e-5);
        let front = light.direction().normalize();
        assert_relative_eq!(light.shadow_camera.front(), front, epsilon = 1e-5);
    }

    #[test]
    fn test_straight_down_light_has_valid_view() {
        let white = Vec3::new(1.0, 1.0, 1.0);
        let light =
            LightEntity::directional("sun", Vec3::new(0.0, 10.0, 0.0), Vec3::zeros(), white, 1.0);
        let view = light.shadow_camera.get_view_matrix();
        assert!(view.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_change_color_clamps() {
        let mut light = LightEntity::new("l", LightType::Point);
        light.color = Vec3::new(0.9, 0.1, 0.5);
        light.change_color(Vec3::new(0.5, -0.5, 0.1));
        assert_relative_eq!(light.color, Vec3::new(1.0, 0.0, 0.6), epsilon = 1e-6);
    }

    #[test]
    fn test_configure_reads_degrees_and_keeps_unknown_type() {
        let mut light = LightEntity::new("l", LightType::Spot);
        let description = EntityDescription {
            light_type: Some("AREA".to_string()),
            cone_angle: Some(90.0),
            shadow_bias: Some(0.01),
            ..Default::default()
        };
        light.configure(&description);
        assert_eq!(light.light_type, LightType::Spot);
        assert_relative_eq!(light.cone_angle, std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(light.shadow_bias, 0.01);
    }

    #[test]
    fn test_uniforms_without_shadow_map_bind_white() {
        let mut context = RecordingContext::new(64, 64);
        let light = LightEntity::new("l", LightType::Spot);
        context.enable_shader("light");
        light.set_uniforms(&mut context);
        context.draw_fullscreen_quad();

        let draw = &context.draws()[0];
        assert_eq!(draw.texture("u_shadowmap"), Some(context.white_texture()));
        assert_eq!(draw.uniform("u_cast_shadows"), Some(&UniformValue::Bool(false)));
        assert_eq!(draw.uniform("u_light_type"), Some(&UniformValue::Int(2)));
    }

    #[test]
    fn test_uniforms_with_shadow_map() {
        let mut context = RecordingContext::new(64, 64);
        let mut light = LightEntity::new("l", LightType::Directional);
        let shadow_map = light.ensure_shadow_map(&mut context, 256).unwrap();
        // Second call reuses the target
        assert_eq!(light.ensure_shadow_map(&mut context, 256).unwrap(), shadow_map);
        assert_eq!(context.render_target_count(), 1);

        context.enable_shader("light");
        light.set_uniforms(&mut context);
        context.draw_fullscreen_quad();
        let draw = &context.draws()[0];
        assert_eq!(draw.texture("u_shadowmap"), shadow_map.depth_texture(&context));
        assert_eq!(draw.textures.get("u_shadowmap").map(|(_, slot)| *slot), Some(SHADOW_MAP_SLOT));
        assert_eq!(draw.uniform("u_cast_shadows"), Some(&UniformValue::Bool(true)));
    }
}
