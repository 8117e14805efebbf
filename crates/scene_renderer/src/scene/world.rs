//! The scene: everything one frame renders

use crate::foundation::math::{utils, Vec3};
use crate::render::primitives::Camera;
use crate::scene::entity::{Entity, EntityDescription, PrefabEntity};
use crate::scene::light::LightEntity;
use crate::scene::scene_graph::PrefabLibrary;

/// Entities, lights and global lighting parameters
#[derive(Debug, Clone)]
pub struct Scene {
    /// Color the display is cleared to
    pub background_color: Vec3,
    /// Ambient light added to every lit surface, each channel in [0, 1]
    pub ambient_light: Vec3,
    /// Camera the frame is rendered from
    pub main_camera: Camera,
    /// Non-light entities
    pub entities: Vec<Entity>,
    /// Lights, in the order they are applied
    pub lights: Vec<LightEntity>,
}

impl Scene {
    /// Empty scene with a black background and dim ambient light
    pub fn new() -> Self {
        Self {
            background_color: Vec3::zeros(),
            ambient_light: Vec3::new(0.1, 0.1, 0.1),
            main_camera: Camera::default(),
            entities: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// Add an entity; lights go to the light list
    pub fn add_entity(&mut self, entity: Entity) {
        match entity {
            Entity::Light(light) => self.lights.push(light),
            other => self.entities.push(other),
        }
    }

    /// Add a prefab entity
    pub fn add_prefab(&mut self, prefab: PrefabEntity) {
        self.entities.push(Entity::Prefab(prefab));
    }

    /// Add a light
    pub fn add_light(&mut self, light: LightEntity) {
        self.lights.push(light);
    }

    /// Build entities from descriptions and add them, returning how many were
    /// accepted. Unknown entity types are skipped.
    pub fn add_descriptions(
        &mut self,
        descriptions: &[EntityDescription],
        library: &PrefabLibrary,
    ) -> usize {
        let before = self.entities.len() + self.lights.len();
        for description in descriptions {
            if let Some(entity) = Entity::from_description(description, library) {
                log::debug!("Added entity '{}'", entity.name());
                self.add_entity(entity);
            }
        }
        self.entities.len() + self.lights.len() - before
    }

    /// Remove every entity and light
    pub fn clear(&mut self) {
        self.entities.clear();
        self.lights.clear();
    }

    /// Add `delta` to the ambient light, clamping every channel to [0, 1]
    pub fn change_ambient_light(&mut self, delta: Vec3) {
        self.ambient_light = utils::saturate(self.ambient_light + delta);
    }

    /// Prefab entities, in insertion order
    pub fn prefab_entities(&self) -> impl Iterator<Item = &PrefabEntity> {
        self.entities.iter().filter_map(|entity| match entity {
            Entity::Prefab(prefab) => Some(prefab),
            Entity::Light(_) => None,
        })
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
