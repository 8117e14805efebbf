//! Demo scene built in code
//!
//! A floor, a ring of cubes, a pair of glass panes and one light of each
//! type, described the way a scene file would describe them.

use std::f32::consts::FRAC_1_SQRT_2;

use scene_renderer::prelude::*;

/// Scene, resources and prefabs of the demo
pub struct DemoScene {
    /// Entities and lights
    pub scene: Scene,
    /// Meshes and materials the prefabs refer to
    pub resources: ResourceRegistry,
}

impl DemoScene {
    /// Build the demo for a `width` x `height` display
    pub fn build(width: u32, height: u32) -> Self {
        let mut resources = ResourceRegistry::new();
        let cube = resources.add_mesh(Mesh::cube("cube"));
        let quad = resources.add_mesh(Mesh::quad("quad"));

        let stone = resources
            .add_material(Material::new().with_name("stone").with_color(0.6, 0.6, 0.55, 1.0));
        let lamp = resources.add_material(
            Material::new().with_name("lamp").with_emissive(Vec3::new(1.0, 0.8, 0.4)),
        );
        let foliage = resources.add_material(
            Material::new()
                .with_name("foliage")
                .with_alpha_mode(AlphaMode::Mask(0.5))
                .with_two_sided(true),
        );
        let glass = resources.add_material(
            Material::new()
                .with_name("glass")
                .with_alpha_mode(AlphaMode::Blend)
                .with_two_sided(true)
                .with_color(0.4, 0.7, 1.0, 0.35),
        );

        let mut library = PrefabLibrary::new();

        let floor = SceneNode::new("floor")
            .with_transform(Mat4::new_nonuniform_scaling(&Vec3::new(40.0, 40.0, 1.0)))
            .with_drawable(quad, stone);
        library.insert(Prefab::new("floor.gltf", floor));

        let mut ring = SceneNode::new("ring");
        for i in 0..8 {
            let angle = i as f32 * std::f32::consts::TAU / 8.0;
            let offset = Vec3::new(angle.cos() * 6.0, 0.5, angle.sin() * 6.0);
            let material = if i % 4 == 0 { lamp } else { stone };
            ring.add_child(
                SceneNode::new(format!("pillar{i}"))
                    .with_transform(Mat4::new_translation(&offset))
                    .with_drawable(cube, material)
                    .with_child(
                        SceneNode::new(format!("leaves{i}"))
                            .with_transform(Mat4::new_translation(&Vec3::new(0.0, 1.0, 0.0)))
                            .with_drawable(quad, foliage),
                    ),
            );
        }
        library.insert(Prefab::new("ring.gltf", ring));

        let panes = SceneNode::new("panes")
            .with_child(SceneNode::new("front").with_drawable(quad, glass))
            .with_child(
                SceneNode::new("back")
                    .with_transform(Mat4::new_translation(&Vec3::new(0.0, 0.0, -1.5)))
                    .with_drawable(quad, glass),
            );
        library.insert(Prefab::new("panes.gltf", panes));

        let mut scene = Scene::new();
        scene.background_color = Vec3::new(0.05, 0.07, 0.1);
        let aspect = width as f32 / height.max(1) as f32;
        scene.main_camera = Camera::perspective(Vec3::zeros(), 60.0, aspect, 0.1, 500.0);
        scene.main_camera.look_at(Vec3::new(0.0, 6.0, 16.0), Vec3::zeros(), Vec3::y());

        let added = scene.add_descriptions(&descriptions(), &library);
        log::info!(
            "Demo scene: {added} entities ({} lights), {} meshes, {} materials",
            scene.lights.len(),
            resources.mesh_count(),
            resources.material_count()
        );

        Self { scene, resources }
    }
}

fn descriptions() -> Vec<EntityDescription> {
    let floor = EntityDescription {
        position: Some([0.0, 0.0, 0.0]),
        rotation: Some([-FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2]),
        ..EntityDescription::prefab("floor", "floor.gltf")
    };
    let ring =
        EntityDescription { angle: Some(22.5), ..EntityDescription::prefab("ring", "ring.gltf") };
    let panes = EntityDescription {
        position: Some([0.0, 1.5, 3.0]),
        scale: Some([3.0, 3.0, 1.0]),
        ..EntityDescription::prefab("panes", "panes.gltf")
    };

    let sun = EntityDescription {
        position: Some([20.0, 30.0, 10.0]),
        target: Some([0.0, 0.0, 0.0]),
        color: Some([1.0, 0.95, 0.85]),
        intensity: Some(1.2),
        max_dist: Some(80.0),
        area_size: Some(50.0),
        ..EntityDescription::light("sun", "DIRECTIONAL")
    };
    let bulb = EntityDescription {
        position: Some([0.0, 3.0, 0.0]),
        color: Some([1.0, 0.6, 0.3]),
        intensity: Some(3.0),
        max_dist: Some(15.0),
        ..EntityDescription::light("bulb", "POINT")
    };
    let torch = EntityDescription {
        position: Some([-8.0, 8.0, 8.0]),
        target: Some([0.0, 0.0, 0.0]),
        color: Some([0.5, 0.7, 1.0]),
        intensity: Some(2.0),
        max_dist: Some(40.0),
        cone_angle: Some(35.0),
        cone_exp: Some(8.0),
        shadow_bias: Some(0.0005),
        ..EntityDescription::light("torch", "SPOT")
    };

    vec![floor, ring, panes, sun, bulb, torch]
}
