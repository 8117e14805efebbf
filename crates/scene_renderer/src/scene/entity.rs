//! Scene entities
//!
//! An entity is either a placed prefab or a light. Both share a name, a
//! model transform and a visibility flag, and both can be configured from an
//! [`EntityDescription`] and listed in a debug menu through [`MenuUi`].

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Mat4, Mat4Ext, Quat, Vec3};
use crate::scene::light::{LightEntity, LightType};
use crate::scene::scene_graph::{Prefab, PrefabLibrary, SceneNode};

/// Data every entity carries
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCommon {
    /// Display name
    pub name: String,
    /// Entity-to-world transform
    pub model: Mat4,
    /// Invisible entities are not collected for drawing
    pub visible: bool,
}

impl EntityCommon {
    /// Visible entity at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: Mat4::identity(),
            visible: true,
        }
    }

    fn render_in_menu(&mut self, ui: &mut dyn MenuUi) {
        ui.text(&format!("Name: {}", self.name));
        ui.checkbox("Visible", &mut self.visible);
        ui.matrix("Model", &mut self.model);
    }
}

/// A prefab instance placed in the scene
#[derive(Debug, Clone)]
pub struct PrefabEntity {
    /// Name, model transform and visibility
    pub common: EntityCommon,
    /// Name of the prefab this entity instantiates
    pub filename: Option<String>,
    /// The shared prefab, `None` until configured or when it failed to resolve
    pub prefab: Option<Rc<Prefab>>,
}

impl PrefabEntity {
    /// Entity without a prefab yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: EntityCommon::new(name),
            filename: None,
            prefab: None,
        }
    }

    /// Entity instantiating `prefab` at `model`
    pub fn with_prefab(name: impl Into<String>, prefab: Rc<Prefab>, model: Mat4) -> Self {
        let mut entity = Self::new(name);
        entity.filename = Some(prefab.name.clone());
        entity.prefab = Some(prefab);
        entity.common.model = model;
        entity
    }

    /// Resolve the prefab named by the description
    pub fn configure(&mut self, description: &EntityDescription, library: &PrefabLibrary) {
        let Some(filename) = description.filename.as_deref() else {
            return;
        };
        self.filename = Some(filename.to_string());
        self.prefab = library.get(filename);
        if self.prefab.is_none() {
            log::warn!("Entity '{}': prefab {filename} not found", self.common.name);
        }
    }
}

/// Kind tag of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A placed prefab
    Prefab,
    /// A light
    Light,
}

impl EntityKind {
    /// Parse the scene-description type name (`"PREFAB"`, `"LIGHT"`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PREFAB" => Some(Self::Prefab),
            "LIGHT" => Some(Self::Light),
            _ => None,
        }
    }
}

/// Something placed in a scene
#[derive(Debug, Clone)]
pub enum Entity {
    /// A placed prefab
    Prefab(PrefabEntity),
    /// A light
    Light(LightEntity),
}

impl Entity {
    /// Build and configure an entity from its description
    ///
    /// Returns `None` for unknown entity types.
    pub fn from_description(
        description: &EntityDescription,
        library: &PrefabLibrary,
    ) -> Option<Self> {
        let Some(kind) = EntityKind::from_name(&description.entity_type) else {
            log::warn!("Entity type unknown: {}", description.entity_type);
            return None;
        };
        let name = description.name.clone().unwrap_or_default();
        let mut entity = match kind {
            EntityKind::Prefab => Self::Prefab(PrefabEntity::new(name)),
            EntityKind::Light => Self::Light(LightEntity::new(name, LightType::Directional)),
        };
        description.apply_transform(&mut entity.common_mut().model);
        entity.configure(description, library);
        Some(entity)
    }

    /// Kind tag
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Prefab(_) => EntityKind::Prefab,
            Self::Light(_) => EntityKind::Light,
        }
    }

    /// Shared entity data
    pub fn common(&self) -> &EntityCommon {
        match self {
            Self::Prefab(prefab) => &prefab.common,
            Self::Light(light) => &light.common,
        }
    }

    /// Mutable shared entity data
    pub fn common_mut(&mut self) -> &mut EntityCommon {
        match self {
            Self::Prefab(prefab) => &mut prefab.common,
            Self::Light(light) => &mut light.common,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.common().name
    }

    /// Apply the variant-specific fields of a description
    pub fn configure(&mut self, description: &EntityDescription, library: &PrefabLibrary) {
        match self {
            Self::Prefab(prefab) => prefab.configure(description, library),
            Self::Light(light) => light.configure(description),
        }
    }

    /// List the entity's editable fields in a debug menu
    pub fn render_in_menu(&mut self, ui: &mut dyn MenuUi) {
        match self {
            Self::Prefab(prefab) => {
                prefab.common.render_in_menu(ui);
                ui.text(&format!("filename: {}", prefab.filename.as_deref().unwrap_or("")));
                if let Some(prefab) = &prefab.prefab {
                    if ui.tree_node("Prefab Info") {
                        node_in_menu(&prefab.root, ui);
                        ui.tree_pop();
                    }
                }
            }
            Self::Light(light) => {
                light.common.render_in_menu(ui);
                ui.text(&format!("Type: {:?}", light.light_type));
                if ui.color_edit("Color", &mut light.color) {
                    light.color = utils::saturate(light.color);
                }
                ui.slider_float("Intensity", &mut light.intensity, 0.0, 10.0);
                ui.slider_float("Shadow bias", &mut light.shadow_bias, 0.0, 0.1);
                if ui.slider_float("Max distance", &mut light.max_distance, 0.0, 1000.0) {
                    light.configure_shadow_camera();
                }
            }
        }
    }
}

fn node_in_menu(node: &SceneNode, ui: &mut dyn MenuUi) {
    if ui.tree_node(&node.name) {
        ui.text(&format!("visible: {}", node.visible));
        ui.text(&format!("drawable: {}", node.drawable().is_some()));
        for child in &node.children {
            node_in_menu(child, ui);
        }
        ui.tree_pop();
    }
}

/// Widgets a debug menu offers to entities
///
/// Editing widgets return `true` when the value was changed.
pub trait MenuUi {
    /// Plain text line
    fn text(&mut self, text: &str);
    /// Boolean toggle
    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool;
    /// Transform editor
    fn matrix(&mut self, label: &str, value: &mut Mat4) -> bool;
    /// RGB color editor
    fn color_edit(&mut self, label: &str, value: &mut Vec3) -> bool;
    /// Bounded scalar editor
    fn slider_float(&mut self, label: &str, value: &mut f32, min: f32, max: f32) -> bool;
    /// Collapsible section; children are emitted only when it returns `true`
    fn tree_node(&mut self, label: &str) -> bool;
    /// Close the section opened by the last successful [`MenuUi::tree_node`]
    fn tree_pop(&mut self);
}

/// [`MenuUi`] that writes an indented, read-only outline
#[derive(Debug, Default)]
pub struct TextMenu {
    lines: Vec<String>,
    depth: usize,
}

impl TextMenu {
    /// Empty outline
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines emitted so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn push(&mut self, line: String) {
        self.lines.push(format!("{}{line}", "  ".repeat(self.depth)));
    }
}

impl MenuUi for TextMenu {
    fn text(&mut self, text: &str) {
        self.push(text.to_string());
    }

    fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        self.push(format!("{label}: {value}"));
        false
    }

    fn matrix(&mut self, label: &str, value: &mut Mat4) -> bool {
        let t = value.translation();
        self.push(format!("{label}: translation ({:.2}, {:.2}, {:.2})", t.x, t.y, t.z));
        false
    }

    fn color_edit(&mut self, label: &str, value: &mut Vec3) -> bool {
        self.push(format!("{label}: ({:.2}, {:.2}, {:.2})", value.x, value.y, value.z));
        false
    }

    fn slider_float(&mut self, label: &str, value: &mut f32, _min: f32, _max: f32) -> bool {
        self.push(format!("{label}: {value:.4}"));
        false
    }

    fn tree_node(&mut self, label: &str) -> bool {
        self.push(format!("+ {label}"));
        self.depth += 1;
        true
    }

    fn tree_pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Declarative description of one entity, as a scene loader produces it
///
/// Every field is optional; absent fields leave the entity's defaults alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDescription {
    /// `"PREFAB"` or `"LIGHT"`
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Display name
    pub name: Option<String>,
    /// Translation; resets the model transform
    pub position: Option<[f32; 3]>,
    /// Rotation about +Y in degrees
    pub angle: Option<f32>,
    /// Rotation quaternion `[x, y, z, w]`, applied in world space
    pub rotation: Option<[f32; 4]>,
    /// Point the entity's front vector aims at
    pub target: Option<[f32; 3]>,
    /// Non-uniform scale
    pub scale: Option<[f32; 3]>,
    /// Prefab name (prefab entities)
    pub filename: Option<String>,
    /// Light color
    pub color: Option<[f32; 3]>,
    /// Light intensity
    pub intensity: Option<f32>,
    /// `"DIRECTIONAL"`, `"POINT"` or `"SPOT"`
    pub light_type: Option<String>,
    /// Light falloff distance
    pub max_dist: Option<f32>,
    /// Spot cone angle in degrees
    pub cone_angle: Option<f32>,
    /// Spot falloff exponent
    pub cone_exp: Option<f32>,
    /// Shadow map depth bias
    pub shadow_bias: Option<f32>,
    /// Directional shadow area size
    pub area_size: Option<f32>,
}

impl EntityDescription {
    /// Description of a prefab entity
    pub fn prefab(name: &str, filename: &str) -> Self {
        Self {
            entity_type: "PREFAB".to_string(),
            name: Some(name.to_string()),
            filename: Some(filename.to_string()),
            ..Self::default()
        }
    }

    /// Description of a light entity
    pub fn light(name: &str, light_type: &str) -> Self {
        Self {
            entity_type: "LIGHT".to_string(),
            name: Some(name.to_string()),
            light_type: Some(light_type.to_string()),
            ..Self::default()
        }
    }

    /// Build the model transform: translate, rotate about Y, pre-multiply
    /// the quaternion, aim at the target, then scale
    pub fn apply_transform(&self, model: &mut Mat4) {
        if let Some(position) = self.position {
            *model = Mat4::new_translation(&utils::vec3(position));
        }
        if let Some(angle) = self.angle {
            *model *= Mat4::rotation_y(utils::deg_to_rad(angle));
        }
        if let Some([x, y, z, w]) = self.rotation {
            let rotation = Quat::from_quaternion(nalgebra::Quaternion::new(w, x, y, z));
            *model = rotation.to_homogeneous() * *model;
        }
        if let Some(target) = self.target {
            let front = utils::vec3(target) - model.translation();
            model.set_front_and_orthonormalize(front);
        }
        if let Some(scale) = self.scale {
            *model *= Mat4::new_nonuniform_scaling(&utils::vec3(scale));
        }
    }
}
