//! # Render-call Collector
//!
//! Walks the prefab hierarchies of a scene depth-first and emits one
//! [`RenderCall`] for every visible node that carries a mesh and a material
//! and whose world bounding box overlaps the camera frustum.
//!
//! The output list is cleared before traversal, so it never carries calls
//! over from a previous frame. Nodes whose mesh or material no longer
//! resolves are skipped.

use crate::foundation::math::{Mat4, Vec3};
use crate::render::primitives::Camera;
use crate::render::resources::ResourceRegistry;
use crate::scene::render_queue::RenderCall;
use crate::scene::scene_graph::{Frustum, SceneNode};
use crate::scene::world::Scene;

/// Counters from the last collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    /// Visible nodes carrying a mesh and a material
    pub candidates: usize,
    /// Candidates rejected by the frustum test
    pub culled: usize,
    /// Candidates whose mesh or material did not resolve
    pub unresolved: usize,
}

/// Per-frame traversal of the scene graph
#[derive(Debug, Default)]
pub struct RenderCallCollector {
    stats: CollectionStats,
}

struct Traversal<'a> {
    frustum: Frustum,
    eye: Vec3,
    resources: &'a ResourceRegistry,
    stats: CollectionStats,
}

impl RenderCallCollector {
    /// Create a collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters from the last call to [`Self::collect`]
    pub fn stats(&self) -> CollectionStats {
        self.stats
    }

    /// Refill `calls` with the render calls of `scene` as seen from `camera`
    ///
    /// Returns the number of calls emitted.
    pub fn collect(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        resources: &ResourceRegistry,
        calls: &mut Vec<RenderCall>,
    ) -> usize {
        calls.clear();

        let mut traversal = Traversal {
            frustum: camera.frustum(),
            eye: camera.eye,
            resources,
            stats: CollectionStats::default(),
        };

        for entity in scene.prefab_entities() {
            if !entity.common.visible {
                continue;
            }
            let Some(prefab) = &entity.prefab else {
                log::trace!("Entity '{}' has no prefab, skipped", entity.common.name);
                continue;
            };
            traversal.visit(&prefab.root, &entity.common.model, calls);
        }

        self.stats = traversal.stats;
        log::trace!(
            "Collected {} render calls ({} culled, {} unresolved)",
            calls.len(),
            self.stats.culled,
            self.stats.unresolved
        );
        calls.len()
    }
}

impl Traversal<'_> {
    fn visit(&mut self, node: &SceneNode, parent: &Mat4, calls: &mut Vec<RenderCall>) {
        if !node.visible {
            return;
        }

        let world = parent * node.local_transform;

        if let Some((mesh_handle, material_handle)) = node.drawable() {
            self.stats.candidates += 1;
            let mesh = self.resources.mesh(mesh_handle).filter(|mesh| !mesh.is_empty());
            match (mesh, self.resources.material(material_handle)) {
                (Some(mesh), Some(material)) => {
                    let bounds = mesh.bounding_box.transformed(&world);
                    let center = bounds.center();
                    if self.frustum.intersects_box(center, bounds.extents()) {
                        calls.push(RenderCall {
                            model: world,
                            mesh: mesh_handle,
                            material: material_handle,
                            alpha_mode: material.alpha_mode,
                            distance_to_camera: (center - self.eye).norm(),
                        });
                    } else {
                        self.stats.culled += 1;
                    }
                }
                _ => {
                    self.stats.unresolved += 1;
                    log::debug!("Node '{}' has an unresolved mesh or material, skipped", node.name);
                }
            }
        }

        for child in &node.children {
            self.visit(child, &world, calls);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4Ext;
    use crate::render::primitives::Mesh;
    use crate::render::resources::{AlphaMode, Material};
    use crate::scene::entity::PrefabEntity;
    use crate::scene::scene_graph::{Prefab, PrefabLibrary};
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        let mut camera = Camera::perspective(Vec3::zeros(), 60.0, 1.0, 0.1, 100.0);
        camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros(), Vec3::y());
        camera
    }

    fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::new_translation(&Vec3::new(x, y, z))
    }

    #[test]
    fn test_nested_transforms_accumulate() {
        let mut resources = ResourceRegistry::new();
        let mesh = resources.add_mesh(Mesh::cube("cube"));
        let material = resources.add_material(Material::new());

        let root = SceneNode::new("root")
            .with_transform(translation(1.0, 0.0, 0.0))
            .with_child(
                SceneNode::new("child")
                    .with_transform(translation(0.0, 2.0, 0.0))
                    .with_drawable(mesh, material),
            );
        let mut library = PrefabLibrary::new();
        let prefab = library.insert(Prefab::new("p", root));

        let mut scene = Scene::new();
        scene.add_prefab(PrefabEntity::with_prefab("e", prefab, translation(0.0, 0.0, -3.0)));

        let mut calls = Vec::new();
        let count = RenderCallCollector::new().collect(&scene, &camera(), &resources, &mut calls);
        assert_eq!(count, 1);
        assert_relative_eq!(calls[0].model.translation(), Vec3::new(1.0, 2.0, -3.0));
        assert_relative_eq!(
            calls[0].distance_to_camera,
            (Vec3::new(1.0, 2.0, -3.0) - Vec3::new(0.0, 0.0, 10.0)).norm(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_invisible_subtree_is_pruned() {
        let mut resources = ResourceRegistry::new();
        let mesh = resources.add_mesh(Mesh::cube("cube"));
        let material = resources.add_material(Material::new());

        let root = SceneNode::new("root")
            .with_drawable(mesh, material)
            .with_child(
                SceneNode::new("hidden")
                    .with_visibility(false)
                    .with_drawable(mesh, material)
                    .with_child(SceneNode::new("grandchild").with_drawable(mesh, material)),
            );
        let mut library = PrefabLibrary::new();
        let prefab = library.insert(Prefab::new("p", root));
        let mut scene = Scene::new();
        scene.add_prefab(PrefabEntity::with_prefab("e", prefab, Mat4::identity()));

        let mut calls = Vec::new();
        let mut collector = RenderCallCollector::new();
        assert_eq!(collector.collect(&scene, &camera(), &resources, &mut calls), 1);
        assert_eq!(collector.stats().candidates, 1);
    }

    #[test]
    fn test_out_of_frustum_nodes_are_culled() {
        let mut resources = ResourceRegistry::new();
        let mesh = resources.add_mesh(Mesh::cube("cube"));
        let material = resources.add_material(Material::new().with_alpha_mode(AlphaMode::Blend));

        let root = SceneNode::new("root")
            .with_child(SceneNode::new("front").with_drawable(mesh, material))
            .with_child(
                SceneNode::new("behind")
                    .with_transform(translation(0.0, 0.0, 20.0))
                    .with_drawable(mesh, material),
            );
        let mut library = PrefabLibrary::new();
        let prefab = library.insert(Prefab::new("p", root));
        let mut scene = Scene::new();
        scene.add_prefab(PrefabEntity::with_prefab("e", prefab, Mat4::identity()));

        let mut calls = Vec::new();
        let mut collector = RenderCallCollector::new();
        collector.collect(&scene, &camera(), &resources, &mut calls);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].alpha_mode, AlphaMode::Blend);
        assert_eq!(collector.stats().culled, 1);
    }

    #[test]
    fn test_unresolved_handles_and_missing_prefabs_are_skipped() {
        let mut resources = ResourceRegistry::new();
        let mesh = resources.add_mesh(Mesh::cube("cube"));
        let material = resources.add_material(Material::new());
        let stale = resources.add_mesh(Mesh::cube("gone"));
        resources.remove_mesh(stale);

        let root = SceneNode::new("root")
            .with_drawable(stale, material)
            .with_child(SceneNode::new("ok").with_drawable(mesh, material));
        let mut library = PrefabLibrary::new();
        let prefab = library.insert(Prefab::new("p", root));
        let mut scene = Scene::new();
        scene.add_prefab(PrefabEntity::with_prefab("e", prefab, Mat4::identity()));
        scene.add_prefab(PrefabEntity::new("no prefab"));

        let mut calls = Vec::new();
        let mut collector = RenderCallCollector::new();
        collector.collect(&scene, &camera(), &resources, &mut calls);
        assert_eq!(calls.len(), 1);
        assert_eq!(collector.stats().unresolved, 1);
    }

    #[test]
    fn test_output_is_cleared_between_frames() {
        let mut resources = ResourceRegistry::new();
        let mesh = resources.add_mesh(Mesh::cube("cube"));
        let material = resources.add_material(Material::new());
        let mut library = PrefabLibrary::new();
        let root = SceneNode::new("root").with_drawable(mesh, material);
        let prefab = library.insert(Prefab::new("p", root));
        let mut scene = Scene::new();
        scene.add_prefab(PrefabEntity::with_prefab("e", prefab, Mat4::identity()));

        let mut calls = Vec::new();
        let mut collector = RenderCallCollector::new();
        collector.collect(&scene, &camera(), &resources, &mut calls);
        let first: Vec<_> = calls.iter().map(|c| (c.mesh, c.material)).collect();
        collector.collect(&scene, &camera(), &resources, &mut calls);
        let second: Vec<_> = calls.iter().map(|c| (c.mesh, c.material)).collect();
        assert_eq!(first, second);
        assert_eq!(calls.len(), 1);

        if let Some(entity) = scene.entities.first_mut() {
            entity.common_mut().visible = false;
        }
        collector.collect(&scene, &camera(), &resources, &mut calls);
        assert!(calls.is_empty());
    }
}
